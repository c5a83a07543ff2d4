use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use shoprag::config::AppConfig;
use shoprag::database::Database;
use shoprag::embeddings::EmbeddingService;
use shoprag::models::NewProduct;
use shoprag::models::Product;
use shoprag::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "shoprag")]
#[command(about = "ShopRAG CLI for serving the chat API and managing the product catalog")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Disable CORS even when the config enables it
        #[arg(long)]
        no_cors: bool,
    },
    /// Load products into the catalog and build embeddings for them
    Seed {
        /// JSON file with an array of products; falls back to the
        /// built-in sample catalog when omitted and the catalog is empty
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Rebuild embeddings for products that already have one
        #[arg(long)]
        refresh: bool,
    },
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        shoprag::logging::init_logging_with_level("debug")?;
    } else {
        shoprag::logging::init_logging()?;
    }

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve {
            host,
            port,
            no_cors,
        } => {
            let host = host.unwrap_or_else(|| config.server_host().to_string());
            let port = port.unwrap_or(config.server_port());
            let cors = !no_cors && config.cors_enabled();

            println!("🚀 Starting ShopRAG API Server");
            println!("==============================\n");
            println!("📍 Host: {host}");
            println!("🔌 Port: {port}");
            println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
            println!();

            shoprag::api::serve_api(&config, host, port, cors).await?;
        }
        Commands::Seed { file, refresh } => {
            handle_seed_command(&config, file, refresh).await?;
        }
        Commands::Config => {
            handle_config_command(&config);
        }
    }

    Ok(())
}

async fn handle_seed_command(
    config: &AppConfig,
    file: Option<PathBuf>,
    refresh: bool,
) -> Result<()> {
    let database = Database::from_config(config).await?;

    if !database.is_schema_initialized().await? {
        println!("📦 Initializing database schema");
        database.init_schema(config.embedding_dimension()).await?;
    }

    // Load catalog entries
    let new_products: Vec<NewProduct> = match file {
        Some(path) => {
            println!("📄 Loading products from {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        }
        None => {
            if database.count_products().await? > 0 {
                Vec::new()
            } else {
                println!("📄 Catalog is empty, loading the built-in sample catalog");
                sample_catalog()
            }
        }
    };

    if !new_products.is_empty() {
        println!("🌱 Inserting {} products", new_products.len());
        for product in &new_products {
            database.create_product(product).await?;
        }
    }

    // Build embeddings
    let pending: Vec<Product> = if refresh {
        database.all_products().await?
    } else {
        database.products_missing_embeddings().await?
    };

    if pending.is_empty() {
        println!("✅ All products already have embeddings");
        return Ok(());
    }

    println!(
        "🧠 Generating embeddings for {} products ({} dims, model {})",
        pending.len(),
        config.embedding_dimension(),
        config.embedding_model()
    );

    let embedding_service = EmbeddingService::new(config)?;
    let mut embedded = 0usize;

    for chunk in pending.chunks(32) {
        let texts: Vec<String> = chunk.iter().map(Product::document_text).collect();
        let embeddings = embedding_service.embed_batch(&texts).await?;

        for (product, embedding) in chunk.iter().zip(embeddings) {
            database
                .upsert_product_embedding(product.id, &product.document_text(), embedding)
                .await?;
        }

        embedded += chunk.len();
        println!("  ... {embedded}/{} embedded", pending.len());
    }

    let total = database.count_product_embeddings().await?;
    println!("✅ Seed complete: {total} product embeddings in the index");

    Ok(())
}

fn handle_config_command(config: &AppConfig) {
    println!("📋 ShopRAG Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", mask_database_url(config.database_url()));
    println!("  Max connections: {}", config.max_connections());
    println!("  Min connections: {}", config.min_connections());
    println!("  Connection timeout: {}s", config.connection_timeout());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Model: {}", config.embedding_model());
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  Temperature: {}", config.llm_temperature());
    println!();

    println!("🌐 Server:");
    println!("  Host: {}", config.server_host());
    println!("  Port: {}", config.server_port());
    println!("  CORS: {}", config.cors_enabled());
    println!();

    println!("💬 Chat:");
    println!("  History limit: {}", config.history_limit());
    println!("  Business type: {}", config.business_type());
    println!(
        "  Token expiry: {} minutes",
        config.token_expiry_minutes()
    );
}

fn mask_database_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            format!(
                "{}://{}@{}:{}",
                parsed.scheme(),
                parsed.username(),
                host,
                parsed.port().unwrap_or(5432)
            )
        } else {
            "***masked***".to_string()
        }
    } else {
        "***invalid***".to_string()
    }
}

fn sample_catalog() -> Vec<NewProduct> {
    let sample = [
        (
            "Wireless Sensor",
            "Acme",
            "long battery life, 100m range, IP67 housing",
            19.99,
            42,
        ),
        (
            "Smart Thermostat",
            "Acme",
            "learning schedule, remote control via app",
            89.50,
            15,
        ),
        (
            "Door Contact Sensor",
            "Orbit",
            "magnetic, instant alerts, two-year battery",
            12.00,
            120,
        ),
        (
            "Indoor Camera",
            "Orbit",
            "1080p, night vision, motion zones",
            59.90,
            33,
        ),
        (
            "Motion Detector",
            "Helios",
            "pet immune up to 20kg, wide angle lens",
            24.75,
            58,
        ),
        (
            "Smart Plug",
            "Helios",
            "energy metering, scheduling, compact design",
            14.25,
            200,
        ),
        (
            "Water Leak Sensor",
            "Acme",
            "audible alarm, app notifications",
            17.40,
            76,
        ),
        (
            "Outdoor Siren",
            "Orbit",
            "110dB, solar powered, tamper protection",
            45.00,
            21,
        ),
    ];

    sample
        .into_iter()
        .map(|(name, brand, features, price, quantity)| NewProduct {
            name: name.to_string(),
            brand: brand.to_string(),
            features: Some(features.to_string()),
            price,
            quantity,
        })
        .collect()
}
