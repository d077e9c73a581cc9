use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use offline_asr::application::services::TranscriptionService;
use offline_asr::infrastructure::audio::{CandleAccelerationProbe, SpeechEngineFactory};
use offline_asr::infrastructure::observability::{TracingConfig, init_tracing};
use offline_asr::infrastructure::storage::LocalUploadStore;
use offline_asr::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (settings, environment) = Settings::load().context("failed to load settings")?;

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;

    let tracing_config = TracingConfig::new(
        environment.as_str(),
        &settings.logging.level,
        settings.logging.enable_json,
    );
    init_tracing(&tracing_config, addr);

    let registry = Arc::new(SpeechEngineFactory::registry(&settings.backend_config()));
    let transcription_service = Arc::new(TranscriptionService::new(
        registry,
        Arc::new(CandleAccelerationProbe),
        settings.engine_defaults(),
    ));

    let upload_store = Arc::new(
        LocalUploadStore::new(settings.uploads.dir.clone())
            .context("failed to prepare upload directory")?,
    );

    tracing::info!(
        device = %settings.asr.device,
        whisper_model = %settings.asr.whisper.default_model,
        gigaam_model = %settings.asr.gigaam.default_model,
        uploads = %settings.uploads.dir.display(),
        "Engines registered, models load on first use"
    );

    let state = AppState {
        transcription_service,
        upload_store,
        max_upload_bytes: settings.uploads.max_bytes(),
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
