use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use clearclause::api::middleware::auth::HttpIdentityVerifier;
use clearclause::api::server::start_server;
use clearclause::api::types::AppState;
use clearclause::config::{self, PipelineConfig, ServerConfig};
use clearclause::pipeline::classify::GeminiClient;
use clearclause::pipeline::extraction::ChunkExtractor;
use clearclause::pipeline::processor::AnalysisPipeline;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let server_config = ServerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();

    if server_config.inference_api_key.is_empty() {
        tracing::warn!(
            "GEMINI_API_KEY is not set — classification calls will be rejected upstream"
        );
    }

    let inference = Arc::new(GeminiClient::new(
        &server_config.inference_base_url,
        &server_config.inference_api_key,
        &server_config.inference_model,
        pipeline_config.call_timeout,
    ));
    tracing::info!(model = inference.model(), "Inference client configured");

    let pipeline = AnalysisPipeline::new(
        ChunkExtractor::with_defaults(),
        inference,
        &pipeline_config,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        verifier: Arc::new(HttpIdentityVerifier::new(&server_config.auth_base_url)),
    };

    let mut server = start_server(state, server_config.bind_addr)
        .await
        .expect("API server binds");
    tracing::info!(addr = %server.addr, "ClearClause listening");

    tokio::signal::ctrl_c()
        .await
        .expect("ctrl-c handler installs");
    tracing::info!("Shutdown requested");
    server.shutdown();
}
