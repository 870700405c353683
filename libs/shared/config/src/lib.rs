use std::env;

use chrono_tz::Tz;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub calendar_base_url: String,
    pub calendar_api_key: String,
    pub calendar_id: String,
    pub pharmacy_name: String,
    pub pharmacy_phone: String,
    pub business_timezone: Tz,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            calendar_base_url: env::var("CALENDAR_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("CALENDAR_BASE_URL not set, using empty value");
                    String::new()
                }),
            calendar_api_key: env::var("CALENDAR_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("CALENDAR_API_KEY not set, using empty value");
                    String::new()
                }),
            calendar_id: env::var("CALENDAR_ID")
                .unwrap_or_else(|_| {
                    warn!("CALENDAR_ID not set, using default");
                    "primary".to_string()
                }),
            pharmacy_name: env::var("PHARMACY_NAME")
                .unwrap_or_else(|_| "CareWell Pharmacy".to_string()),
            pharmacy_phone: env::var("PHARMACY_PHONE")
                .unwrap_or_else(|_| "(555) 123-4567".to_string()),
            business_timezone: env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|name| name.parse::<Tz>().ok())
                .unwrap_or_else(|| {
                    warn!("BUSINESS_TIMEZONE not set or invalid, using America/New_York");
                    chrono_tz::America::New_York
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_calendar_configured() {
            warn!("Calendar collaborator not fully configured - availability will run degraded");
        }

        config
    }

    pub fn is_calendar_configured(&self) -> bool {
        !self.calendar_base_url.is_empty() && !self.calendar_api_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            calendar_base_url: String::new(),
            calendar_api_key: String::new(),
            calendar_id: "primary".to_string(),
            pharmacy_name: "CareWell Pharmacy".to_string(),
            pharmacy_phone: "(555) 123-4567".to_string(),
            business_timezone: chrono_tz::America::New_York,
            port: 3000,
        }
    }
}
