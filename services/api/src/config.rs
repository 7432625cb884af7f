//! Service settings read from the environment

use chrono::FixedOffset;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// API service settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Offset from UTC, in minutes, of the wall-clock times used for slots
    pub schedule_utc_offset_minutes: i32,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings: ApiSettings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("schedule_utc_offset_minutes", 0)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.schedule_offset()?;
        Ok(settings)
    }

    pub fn schedule_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.schedule_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "SCHEDULE_UTC_OFFSET_MINUTES out of range: {}",
                    self.schedule_utc_offset_minutes
                ))
            })
    }
}
