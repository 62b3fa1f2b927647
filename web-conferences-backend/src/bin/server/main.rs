use web_conferences_backend::error::AppError;
use web_conferences_backend::run_server;
use web_conferences_backend::telemetry::setup_tracing;
use web_conferences_config::get_config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // avoid putting more code here as this is outside of all spans
    setup_tracing();
    let config = get_config()?;
    run_server(&config).await
}
