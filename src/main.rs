use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use streamscribe::config::Config;
use streamscribe::provider::{MockProvider, ProviderRegistry, WhisperHttpProvider};
use streamscribe::server::{create_router, AppState};
use streamscribe::session::PipelineShared;
use streamscribe::text::{DedupConfig, ResultDeduplicator};
use streamscribe::translate::{HttpTranslator, MockTranslator, TranslationService, Translator};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/streamscribe")?;

    info!("Streamscribe v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    info!(
        "HTTP server will bind to {}:{}",
        cfg.service.http.bind, cfg.service.http.port
    );

    let mut registry = ProviderRegistry::new(&cfg.recognition);
    // Deterministic offline provider; real deployments point
    // default_provider at a configured backend below
    registry.register(Arc::new(MockProvider::returning("mock transcript")));
    if let Some(whisper) = &cfg.recognition.whisper_http {
        registry.register(Arc::new(WhisperHttpProvider::new(whisper)));
    }

    let translator: Arc<dyn Translator> = match &cfg.translation.endpoint {
        Some(endpoint) => {
            info!("Using HTTP translator at {}", endpoint);
            Arc::new(HttpTranslator::new(
                endpoint.clone(),
                cfg.translation.api_key.clone(),
            ))
        }
        None => {
            info!("No translator endpoint configured, using identity mock");
            Arc::new(MockTranslator::new())
        }
    };

    let shared = Arc::new(PipelineShared {
        registry,
        translator: TranslationService::new(translator, &cfg.translation),
        dedup: ResultDeduplicator::new(DedupConfig::default()),
        audio: cfg.audio.clone(),
    });

    let state = AppState::new(shared);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    Ok(())
}
