use crate::calculator::DEFAULT_GRID_INTENSITY;
use clap::Parser;
use uuid::Uuid;

pub const DEFAULT_OUTPUT: &str = "text";
pub const DEFAULT_RESOURCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONCURRENCY: usize = 6;

#[derive(Parser, Debug, Clone)]
#[command(name = "carbonscout")]
#[command(about = "Estimate the carbon footprint of a web page", long_about = None)]
pub struct Cli {
    /// The page URL to analyze
    #[arg(value_name = "URL")]
    pub url: String,

    /// Content identifier stored with the report (random when omitted)
    #[arg(long)]
    pub content_id: Option<Uuid>,

    /// Output format: text or json
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Save report to file
    #[arg(short, long)]
    pub save: Option<String>,

    /// The site is served from renewable energy
    #[arg(long)]
    pub green_hosting: bool,

    /// Grid carbon intensity in grams CO₂ per kWh (default: 442)
    #[arg(long, default_value_t = DEFAULT_GRID_INTENSITY)]
    pub grid_intensity: f64,

    /// Timeout in seconds for each resource fetch (default: 30)
    #[arg(long, default_value_t = DEFAULT_RESOURCE_TIMEOUT_SECS)]
    pub resource_timeout: u64,

    /// Timeout in seconds for the whole page analysis (default: 120)
    #[arg(long, default_value_t = DEFAULT_PAGE_TIMEOUT_SECS)]
    pub page_timeout: u64,

    /// Number of concurrent resource fetches (default: 6)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Rate limit for resource requests per second (optional, e.g., 5.0)
    #[arg(short = 'r', long)]
    pub rate_limit: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long)]
    pub config: Option<String>,
}
