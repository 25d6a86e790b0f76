use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub bind_addr: String,
    pub session_store_path: String,
    pub base_consultation_fee: f64,
    pub specialty_consultation_fee: f64,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("PORTAL_BACKEND_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_BACKEND_URL not set, using empty value");
                    String::new()
                }),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            session_store_path: env::var("SESSION_STORE_PATH")
                .unwrap_or_else(|_| "sessions.json".to_string()),
            base_consultation_fee: env::var("BASE_CONSULTATION_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500.0),
            specialty_consultation_fee: env::var("SPECIALTY_CONSULTATION_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500.0),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            bind_addr: "0.0.0.0:8080".to_string(),
            session_store_path: "sessions.json".to_string(),
            base_consultation_fee: 500.0,
            specialty_consultation_fee: 1500.0,
            request_timeout_secs: 10,
        }
    }
}
