use alert_triage::config::RuntimeConfig;
use alert_triage::runtime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the invocation response.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = RuntimeConfig::from_env()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        token = %config.token_path.display(),
        db = %config.db_path.display(),
        "Alert triage starting"
    );

    let handler = runtime::build_handler(&config).await?;
    let response = handler.handle().await;

    println!("{}", response.to_json());
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
