use advisor_core::client::GeminiClient;
use advisor_core::props::{keys, FilePropertyStore, PropertyStore};
use advisor_server::config::AppConfig;
use advisor_server::http_server;
use advisor_server::service::AdvisorService;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "advisor-daemon", about = "Standards advisor HTTP daemon")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP server address
    #[arg(long)]
    http_addr: Option<SocketAddr>,

    /// Full Gemini generateContent endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to the property store file
    #[arg(long)]
    properties: Option<PathBuf>,

    /// Seed the stored Gemini API key before starting
    #[arg(short = 'k', long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let args = Args::parse();

    // Load config from file or use defaults
    let mut config = match &args.config {
        Some(path) => {
            let cfg = AppConfig::load_from_file(path)?;
            info!("Loaded configuration from {}", path.display());
            cfg
        }
        None => AppConfig::default(),
    };

    // Update config from CLI args
    if let Some(addr) = args.http_addr {
        config.http_addr = addr;
    }
    if let Some(endpoint) = args.endpoint {
        config.gemini_endpoint = endpoint;
    }
    if let Some(properties) = args.properties {
        config.properties_path = Some(properties);
    }

    let properties_path = config.resolved_properties_path()?;
    info!("Using property store at {}", properties_path.display());
    let props: Arc<dyn PropertyStore> = Arc::new(FilePropertyStore::new(properties_path));

    if let Some(api_key) = args.api_key {
        props
            .set(keys::GEMINI_API_KEY, &api_key)
            .map_err(|e| anyhow::anyhow!("Failed to store API key: {}", e))?;
        info!("Stored Gemini API key");
    }

    let client = GeminiClient::new(config.gemini_endpoint.clone(), props.clone());
    info!(model = %client.model_name(), "Initialized Gemini client");

    let service = AdvisorService::new(client, props);

    http_server::run_server(service, config.http_addr).await
}
