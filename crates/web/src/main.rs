use anyhow::Result;
use clap::Parser;
use tracing::info;
use usina_core::tracing::{config::InstrumentationConfig, init::init_tracing};
use usina_web::Settings;

/// UsinaSoft - production control web front-end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize instrumentation
    let instrumentation_config = InstrumentationConfig {
        service_name: "usina-web".to_string(),
        ..InstrumentationConfig::from_env()
    };
    init_tracing(&instrumentation_config)?;

    if let Some(config_path) = &cli.config {
        info!("Loading configuration from: {}", config_path);
    }
    let settings = Settings::load(cli.config.as_deref())?;

    usina_web::serve(settings).await
}
