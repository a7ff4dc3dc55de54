use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub club: ClubSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut club = ClubSettings::default();
        if let Ok(events) = env::var("CLUB_EVENTS_PER_WEEK") {
            club.events_per_week = events
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidEventsPerWeek)?;
        }
        if let Ok(sender) = env::var("CLUB_SENDER_ADDRESS") {
            club.sender_address = sender;
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            club,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Default weekly event count carried by the stored settings record. The
/// allocator's own internal fallback remains five.
pub const DEFAULT_EVENTS_PER_WEEK: usize = 6;

/// Club-level settings record: weekly capacity plus the outbound mail
/// identity and templates owned by the settings collaborator.
#[derive(Debug, Clone)]
pub struct ClubSettings {
    pub events_per_week: usize,
    pub sender_address: String,
    pub weekly_result_template: String,
    pub password_reset_template: String,
}

impl Default for ClubSettings {
    fn default() -> Self {
        Self {
            events_per_week: DEFAULT_EVENTS_PER_WEEK,
            sender_address: "Court Bids <noreply@courtbids.example.org>".to_string(),
            weekly_result_template: include_str!("../../templates/weekly_result.html")
                .to_string(),
            password_reset_template: include_str!("../../templates/password_reset.html")
                .to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidEventsPerWeek,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidEventsPerWeek => {
                write!(f, "CLUB_EVENTS_PER_WEEK must be a non-negative integer")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidEventsPerWeek => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
