//! Post-processing for raw engine output.
//!
//! The engine emits HTML-escaped apostrophes and tokenizer spacing artifacts
//! (a stray space before possessive suffixes and sentence-final punctuation).
//! Both tables below are ordered: the suffix-specific patterns must run
//! before the bare `&#x27;` rewrite or the leading space would survive.

/// Applied to every response on the default path.
pub const ARTIFACT_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("&lt;unk&gt;", "<unk>"),
    (" &#x27;ve", "'ve"),
    (" ' ve", "'ve"),
    (" &#x27;m", "'m"),
    (" ' m", "'m"),
    (" &#x27;re", "'re"),
    (" ' re", "'re"),
    (" n&#x27;t", "n't"),
    (" &#x27;s", "'s"),
    (" ' s", "'s"),
    ("&#x27;", "'"),
    (" ,", ","),
    (" .", "."),
];

/// Translates unknown-token and sentence-boundary markers. Not applied on the
/// default path; reserved for requests that enable out-of-vocabulary
/// handling.
pub const OOV_MARKER_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&#x27;", "'"),
    (".", ". </s>"),
    ("?", ". </s>"),
    ("!", ". </s>"),
];

/// Cleans generation artifacts out of `raw`. Total over any input.
pub fn sanitize(raw: &str) -> String {
    apply_substitutions(raw, ARTIFACT_SUBSTITUTIONS)
}

/// Rewrites out-of-vocabulary and end-of-sentence markers. Kept as its own
/// transform so a future request flag can route through it.
pub fn expand_oov_markers(raw: &str) -> String {
    apply_substitutions(raw, OOV_MARKER_SUBSTITUTIONS)
}

fn apply_substitutions(text: &str, table: &[(&str, &str)]) -> String {
    let mut text = text.to_owned();
    for (pattern, replacement) in table {
        text = text.replace(pattern, replacement);
    }
    text
}
