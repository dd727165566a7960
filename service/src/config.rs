use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use semver::{BuildMetadata, Prerelease, Version};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

type APiVersionList = [&'static str; 1];

const DEFAULT_API_VERSION: &str = "1.0.0-beta1";
// Expand this array to include all backend API versions this client can speak.
const API_VERSIONS: APiVersionList = [DEFAULT_API_VERSION];

static X_VERSION: &str = "x-version";

/// Default Google Meet REST API base URL used when `GOOGLE_MEET_BASE_URL` is not set.
pub const DEFAULT_GOOGLE_MEET_BASE_URL: &str = "https://meet.googleapis.com/v2";

/// Default Google OAuth token endpoint used when `GOOGLE_OAUTH_TOKEN_URL` is not set.
pub const DEFAULT_GOOGLE_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Longest session window accepted on the command line or from the environment: one week.
pub const MAX_SESSION_MINUTES: i64 = 7 * 24 * 60;

/// Version of the backend API that meeting persistence requests are sent against.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiVersion {
    pub version: Version,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Set the semantic version of the backend API to send meeting requests against.
    #[arg(short, long, env, default_value = DEFAULT_API_VERSION,
        value_parser = clap::builder::PossibleValuesParser::new(API_VERSIONS)
            .map(|s| s.parse::<String>().unwrap()),
        )]
    pub api_version: Option<String>,

    /// The base URL of the backend that stores meetings, participants and artifacts.
    #[arg(long, env, default_value = "http://localhost:4000")]
    backend_base_url: String,

    /// Optional bearer token presented to the backend.
    #[arg(long, env)]
    backend_api_token: Option<String>,

    /// The base URL of the Google Meet REST API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_GOOGLE_MEET_BASE_URL)]
    google_meet_base_url: String,

    /// The Google OAuth token endpoint used to mint capability-scoped access tokens.
    #[arg(long, env, default_value = DEFAULT_GOOGLE_OAUTH_TOKEN_URL)]
    google_oauth_token_url: String,

    /// The Google OAuth client ID.
    #[arg(long, env)]
    google_client_id: Option<String>,

    /// The Google OAuth client secret.
    #[arg(long, env)]
    google_client_secret: Option<String>,

    /// The long-lived Google refresh token for the organizing user.
    #[arg(long, env)]
    google_refresh_token: Option<String>,

    /// Base URL used to construct transcript viewer links when the provider
    /// has not exported a transcript document yet.
    #[arg(long, env, default_value = "https://meet.google.com")]
    meet_viewer_base_url: String,

    /// Access type requested for newly created meeting spaces.
    #[arg(long, env, default_value = "OPEN")]
    meet_space_access_type: String,

    /// How many conference records to request when resolving the latest one.
    #[arg(long, env, default_value_t = 1)]
    pub conference_record_page_size: u32,

    /// Length in minutes of the window given to a successor session.
    #[arg(long, env, default_value_t = 60, value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_MINUTES))]
    pub default_session_minutes: i64,

    /// Timeout in seconds for any single outbound HTTP request
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Maximum number of retries for transient outbound HTTP failures
    #[arg(long, env, default_value_t = 3)]
    pub http_max_retries: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION)
    }

    pub fn backend_base_url(&self) -> &str {
        &self.backend_base_url
    }

    pub fn set_backend_base_url(mut self, backend_base_url: String) -> Self {
        self.backend_base_url = backend_base_url;
        self
    }

    pub fn backend_api_token(&self) -> Option<String> {
        self.backend_api_token.clone()
    }

    /// Returns the Google Meet API base URL.
    pub fn google_meet_base_url(&self) -> &str {
        &self.google_meet_base_url
    }

    pub fn set_google_meet_base_url(mut self, google_meet_base_url: String) -> Self {
        self.google_meet_base_url = google_meet_base_url;
        self
    }

    /// Returns the Google OAuth token endpoint.
    pub fn google_oauth_token_url(&self) -> &str {
        &self.google_oauth_token_url
    }

    pub fn google_client_id(&self) -> Option<String> {
        self.google_client_id.clone()
    }

    pub fn google_client_secret(&self) -> Option<String> {
        self.google_client_secret.clone()
    }

    pub fn google_refresh_token(&self) -> Option<String> {
        self.google_refresh_token.clone()
    }

    pub fn meet_viewer_base_url(&self) -> &str {
        &self.meet_viewer_base_url
    }

    pub fn meet_space_access_type(&self) -> &str {
        &self.meet_space_access_type
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

impl ApiVersion {
    /// Parses a version string, falling back to `0.0.1` when it is not valid semver.
    pub fn new(version_str: &str) -> Self {
        ApiVersion {
            version: Version::parse(version_str).unwrap_or(Version {
                major: 0,
                minor: 0,
                patch: 1,
                pre: Prerelease::EMPTY,
                build: BuildMetadata::EMPTY,
            }),
        }
    }

    pub fn default_version() -> &'static str {
        DEFAULT_API_VERSION
    }

    pub fn field_name() -> &'static str {
        X_VERSION
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        ApiVersion::new(DEFAULT_API_VERSION)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}
