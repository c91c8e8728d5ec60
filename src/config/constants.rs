//! Configuration constants.
//!
//! This module defines all constants used throughout the application,
//! including NCBI endpoints, request pacing, retry policy and report layout.

// NCBI endpoints
/// Base URL of the NCBI Datasets v2 REST API
pub const DEFAULT_DATASETS_BASE_URL: &str = "https://api.ncbi.nlm.nih.gov/datasets/v2";
/// Base URL of the NCBI E-utilities
pub const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default User-Agent sent with every NCBI request.
pub const DEFAULT_USER_AGENT: &str = concat!("brc_analytics/", env!("CARGO_PKG_VERSION"));

// Request pacing
/// Minimum delay between NCBI requests in milliseconds.
/// NCBI allows roughly 3 requests per second without an API key.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 350;
/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Token-bucket burst for the NCBI rate limiter (requests are strictly paced)
pub const RATE_LIMIT_BURST: usize = 1;

// Retry policy
/// Initial delay before the first retry (milliseconds)
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Multiplier applied to the delay after each retry
pub const RETRY_FACTOR: u64 = 2;
/// Upper bound for a single retry delay (seconds)
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 3;
/// HTTP 429 Too Many Requests
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

// Caching
/// Default directory for lookup cache entries and taxonomy snapshots
pub const DEFAULT_CACHE_DIR: &str = ".taxonomy_cache";
/// Lookup cache entries older than this are discarded (30 days)
pub const LOOKUP_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

// Data locations
/// Directory holding monthly `top-pages-*.tab` exports
pub const DEFAULT_DATA_DIR: &str = "data/fetched";
/// Directory `analyze` writes its reports into
pub const DEFAULT_OUTPUT_DIR: &str = "output";

// Report layout
/// Placeholder for names and lineages that could not be resolved
pub const UNKNOWN: &str = "Unknown";
/// Width of the organism and workflow text reports
pub const REPORT_WIDTH: usize = 80;
/// Width of the monthly summary report
pub const SUMMARY_WIDTH: usize = 120;
/// Rows shown in the "top N" assembly and intersection tables
pub const TOP_LIMIT: usize = 20;
/// Progress is logged at info level every this many snapshot lookups
pub const PROGRESS_LOG_INTERVAL: usize = 10;

/// Assemblies that appear early in the site's assembly listings and
/// therefore attract visits regardless of interest.
pub const FIRST_IN_LIST_BIASED_ASSEMBLIES: &[&str] = &["GCA_001008285_1", "GCA_000826245_1"];
