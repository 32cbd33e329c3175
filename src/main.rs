use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_gen_service::{AppConfig, AuditLogger, GeneratorHandle, StoryEngine, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!(?config.listen_addr, "loading generation engine");

    let engine = build_engine(&config)?;
    let generator = Arc::new(GeneratorHandle::new(engine, config.generation_timeout));
    let audit = Arc::new(AuditLogger::new(config.log_dir.clone()));
    let router = build_router(config.clone(), generator, audit);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "story server ready");

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(feature = "tch-backend")]
fn build_engine(config: &AppConfig) -> anyhow::Result<Box<dyn StoryEngine>> {
    use story_gen_service::engine::gpt2::Gpt2Engine;

    let engine = Gpt2Engine::load(
        &config.generator_label,
        &config.model_path,
        &config.tokenizer_path,
        config.device,
    )?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "tch-backend"))]
fn build_engine(_config: &AppConfig) -> anyhow::Result<Box<dyn StoryEngine>> {
    anyhow::bail!("no generation backend compiled in; enable the tch-backend feature")
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn,axum::rejection=trace".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
