use clap::Parser;
use miette::{IntoDiagnostic, Result};
use promarket::application::discovery::{DiscoveryEngine, GeoFilter, SearchRequest};
use promarket::domain::ports::ProfileStoreBox;
use promarket::domain::profile::{PageRequest, SearchFilters, SortOptions};
use promarket::infrastructure::in_memory::InMemoryProfileStore;
use promarket::infrastructure::nominatim::NominatimGeocoder;
use promarket::interfaces::csv::profile_reader::ProfileReader;
use promarket::interfaces::csv::result_writer::ResultWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input profile seed CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Substring match on the professional's display name or handle
    #[arg(long)]
    name: Option<String>,

    /// Substring match on the profile location
    #[arg(long)]
    location: Option<String>,

    /// Minimum rating threshold
    #[arg(long)]
    min_rating: Option<f64>,

    /// 1-based result page
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Page size
    #[arg(long, default_value_t = 20)]
    limit: u32,

    /// Search origin latitude; together with --lng and --radius enables
    /// near-me mode
    #[arg(long, requires = "lng", requires = "radius")]
    lat: Option<f64>,

    /// Search origin longitude
    #[arg(long, requires = "lat")]
    lng: Option<f64>,

    /// Radius in kilometres around the search origin
    #[arg(long, requires = "lat")]
    radius: Option<f64>,
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<ProfileStoreBox> {
    use promarket::infrastructure::rocksdb::RocksDbStore;

    Ok(match db_path {
        Some(path) => Box::new(RocksDbStore::open(path).into_diagnostic()?),
        None => Box::new(InMemoryProfileStore::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<ProfileStoreBox> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryProfileStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles = open_store(cli.db_path)?;

    // Seed profiles from the input file
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = ProfileReader::new(file);
    for row in reader.profiles() {
        match row {
            Ok((user, profile)) => {
                if let Err(e) = profiles.put_user(user).await {
                    eprintln!("Error seeding profile: {}", e);
                    continue;
                }
                if let Err(e) = profiles.put_profile(profile).await {
                    eprintln!("Error seeding profile: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading profile: {}", e);
            }
        }
    }

    let geocoder = Arc::new(NominatimGeocoder::new().into_diagnostic()?);
    let engine = DiscoveryEngine::new(profiles, geocoder);

    let request = SearchRequest {
        filters: SearchFilters {
            name: cli.name,
            location: cli.location,
            min_rating: cli.min_rating,
            category_ids: Vec::new(),
        },
        page: PageRequest::new(cli.page, cli.limit).into_diagnostic()?,
        sort: SortOptions::default(),
        geo: match (cli.lat, cli.lng, cli.radius) {
            (Some(lat), Some(lng), Some(radius_km)) => Some(GeoFilter {
                lat,
                lng,
                radius_km,
            }),
            _ => None,
        },
    };

    let response = engine.search(request).await.into_diagnostic()?;
    info!(
        "page {}/{} ({} matching profiles)",
        response.page_info.page, response.page_info.total_pages, response.page_info.total_items
    );

    // Output results
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());
    writer.write_results(&response.results).into_diagnostic()?;

    Ok(())
}
