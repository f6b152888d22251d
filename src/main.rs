use std::sync::Arc;

use agri_bff::config::{AppConfig, StoreBackend};
use agri_bff::seed;
use agri_bff::store::{MemoryStore, PostgresStore, Store};
use agri_bff::translate::{EchoTranslator, GoogleTranslator, Translator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    println!("Agri BFF: marketplace and farm operations API");

    // Load configuration
    let config = AppConfig::load()?;
    println!(
        "Configuration loaded: server={}:{} backend={:?}",
        config.server.host, config.server.port, config.database.backend
    );

    let translator: Arc<dyn Translator> = if config.translate.api_key.is_some() {
        Arc::new(GoogleTranslator::new(&config.translate)?)
    } else {
        log::warn!("No translation API key configured, translations will echo their input");
        Arc::new(EchoTranslator)
    };

    match config.database.backend {
        StoreBackend::Memory => {
            println!("Using in-memory document store");
            start(Arc::new(MemoryStore::new()), translator, config).await
        }
        StoreBackend::Postgres => {
            println!("Connecting to PostgreSQL...");
            let database_url = config.database_url();
            let max_connections = config.database.max_connections.unwrap_or(20);
            let postgres_store = PostgresStore::new(&database_url, max_connections).await?;

            println!("Running database migrations...");
            postgres_store.migrate().await?;
            println!("Database ready");

            start(Arc::new(postgres_store), translator, config).await
        }
    }
}

async fn start<S: Store + 'static>(
    store: Arc<S>,
    translator: Arc<dyn Translator>,
    config: AppConfig,
) -> anyhow::Result<()> {
    // Load seed data for demonstration (optional)
    if config.load_seed_data {
        println!("Loading seed data...");
        seed::load_seed_data(store.as_ref()).await?;
        println!("Seed data loaded successfully");
    }

    agri_bff::run_server(store, translator, config).await
}
