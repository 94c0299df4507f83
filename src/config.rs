//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default remote admin API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.alteg.io/api/v1";

/// Top-level configuration for the onboarding binary.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Base directory holding one subdirectory per tenant.
    pub state_dir: PathBuf,
    pub api: ApiConfig,
    pub bookings: BookingDefaults,
    /// Field delimiter for text batches.
    pub csv_delimiter: u8,
}

/// Remote API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub partner_token: SecretString,
    /// User session token. Absent means the operator has not logged in.
    pub user_token: Option<SecretString>,
    pub timeout: Duration,
}

/// Parameters for synthetic test bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingDefaults {
    /// Hour of day (local to the platform) at which test bookings are placed.
    pub hour: u32,
    /// Booking length in seconds.
    pub seance_length_secs: u32,
}

impl Default for BookingDefaults {
    fn default() -> Self {
        Self {
            hour: 10,
            seance_length_secs: 3600,
        }
    }
}

impl OnboardingConfig {
    /// Build configuration from `ONBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let state_dir = std::env::var("ONBOARD_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".tenant-onboard/state")
            });

        let base_url = std::env::var("ONBOARD_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let partner_token = std::env::var("ONBOARD_PARTNER_TOKEN")
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("ONBOARD_PARTNER_TOKEN".to_string()))?;

        let user_token = std::env::var("ONBOARD_USER_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        let timeout_secs: u64 = parse_env("ONBOARD_HTTP_TIMEOUT_SECS", 30)?;

        let hour: u32 = parse_env("ONBOARD_BOOKING_HOUR", 10)?;
        if hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARD_BOOKING_HOUR".to_string(),
                message: format!("{hour} is not an hour of day (0-23)"),
            });
        }
        let seance_length_secs: u32 = parse_env("ONBOARD_BOOKING_LENGTH_SECS", 3600)?;

        let csv_delimiter = match std::env::var("ONBOARD_CSV_DELIMITER") {
            Ok(raw) => parse_delimiter(&raw)?,
            Err(_) => b',',
        };

        Ok(Self {
            state_dir,
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                partner_token,
                user_token,
                timeout: Duration::from_secs(timeout_secs),
            },
            bookings: BookingDefaults {
                hour,
                seance_length_secs,
            },
            csv_delimiter,
        })
    }
}

/// A delimiter must be exactly one ASCII character; `\t` names a tab.
fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" => Ok(b'\t'),
        _ if raw.len() == 1 && raw.is_ascii() => Ok(raw.as_bytes()[0]),
        _ => Err(ConfigError::InvalidValue {
            key: "ONBOARD_CSV_DELIMITER".to_string(),
            message: format!("{raw:?} is not a single ASCII character"),
        }),
    }
}

/// Parse an optional numeric env var, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
        Err(_) => Ok(default),
    }
}
