use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;

use carbontrail::cache::CacheDatabase;
use carbontrail::factors::{
    CarbonFactorResolver, ClimatiqClient, EstimationTier, LookupOptions, OpenFoodFactsClient,
    PersistentProductStore, ProductDatabase,
};
use carbontrail::geocoding::{GoogleMapsClient, PersistentGeocodingCache};
use carbontrail::travel::{
    InMemoryTransportFactors, PersistentTravelLog, TravelReport, TripPricer, TripRequest,
};
use carbontrail::{CarbonTrailConfig, FactorKey, TransportMode, telemetry};

/// Carbon-emission estimates for trips and products
#[derive(Parser, Debug)]
#[command(name = "carbontrail", author, version, about)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and price a trip
    Trip {
        #[arg(long, value_name = "ADDRESS")]
        from: String,

        #[arg(long, value_name = "ADDRESS")]
        to: String,

        /// Transport mode, e.g. bus, subway, car, plane
        #[arg(long)]
        mode: TransportMode,

        /// Compute without recording the trip
        #[arg(long)]
        preview: bool,
    },

    /// Resolve the carbon factor of a product or dish
    #[command(group(ArgGroup::new("target").required(true).args(["barcode", "label"])))]
    Factor {
        /// May be given several times
        #[arg(long)]
        barcode: Vec<String>,

        #[arg(long)]
        label: Option<String>,

        /// Ignore the stored record and resolve again
        #[arg(long)]
        refresh: bool,

        /// Store the default factor for unknown keys without asking remote sources
        #[arg(long)]
        use_default: bool,
    },

    /// Summarise recorded trips
    Stats {
        /// Only trips recorded at or after this time (RFC 3339)
        #[arg(long, value_name = "TIME")]
        since: Option<DateTime<Utc>>,

        /// Only trips recorded before this time (RFC 3339)
        #[arg(long, value_name = "TIME")]
        until: Option<DateTime<Utc>>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = CarbonTrailConfig::load_from_path(cli.config)?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    telemetry::init(&config.logging);

    let cache_dir = config.cache_dir();
    info!(cache_dir = %cache_dir.display(), "Opening cache database");
    let database = CacheDatabase::open(&cache_dir)?;

    match cli.command {
        Command::Trip {
            from,
            to,
            mode,
            preview,
        } => run_trip(&config, &database, TripRequest::new(from, to, mode), preview).await,
        Command::Factor {
            barcode,
            label,
            refresh,
            use_default,
        } => {
            let keys: Vec<FactorKey> = match label {
                Some(text) => vec![FactorKey::label(&text)],
                None => barcode.iter().map(|code| FactorKey::barcode(code)).collect(),
            };
            if keys.is_empty() {
                anyhow::bail!("either --barcode or --label is required");
            }
            let options = LookupOptions {
                force_refresh: refresh,
                use_default,
            };
            run_factor(&config, &database, &keys, options).await
        }
        Command::Stats { since, until } => run_stats(&database, since, until).await,
    }
}

async fn run_trip(
    config: &CarbonTrailConfig,
    database: &CacheDatabase,
    request: TripRequest,
    preview: bool,
) -> Result<ExitCode> {
    let provider = GoogleMapsClient::new(&config.geocoding)?;
    let cache = PersistentGeocodingCache::new(
        database.keyspace("geocode")?,
        config.cache.geocode_ttl_hours,
    );
    let pricer = TripPricer::new(
        Arc::new(provider),
        Arc::new(cache),
        Arc::new(InMemoryTransportFactors::with_defaults()),
    )
    .with_recorder(Arc::new(PersistentTravelLog::new(
        database.keyspace("travel")?,
    )));

    let outcome = if preview {
        pricer.preview_trip(&request).await
    } else {
        pricer.price_trip(&request).await
    };

    match outcome {
        Ok(estimate) => {
            println!("{}", serde_json::to_string_pretty(&estimate)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Trip rejected: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_factor(
    config: &CarbonTrailConfig,
    database: &CacheDatabase,
    keys: &[FactorKey],
    options: LookupOptions,
) -> Result<ExitCode> {
    let store = Arc::new(PersistentProductStore::new(database.keyspace("products")?));
    let products: Arc<dyn ProductDatabase> =
        Arc::new(OpenFoodFactsClient::new(&config.product_database)?);

    let estimation = if config.estimation.api_key.is_some() {
        let client = ClimatiqClient::new(&config.estimation)?;
        Some(EstimationTier::new(
            Arc::new(client),
            config.estimation.activity_id.clone(),
            config.estimation.region.clone(),
        ))
    } else {
        info!("No estimation API key configured, skipping the estimation tier");
        None
    };

    let resolver = CarbonFactorResolver::standard(store, Some(products), estimation);
    if let [key] = keys {
        let record = resolver.lookup_with(key, options).await;
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let records = resolver.lookup_all(keys, options).await;
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_stats(
    database: &CacheDatabase,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<ExitCode> {
    let logs = PersistentTravelLog::new(database.keyspace("travel")?)
        .entries()
        .await?;
    let report = TravelReport::between(&logs, since, until);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}
