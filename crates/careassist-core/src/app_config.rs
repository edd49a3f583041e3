use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the geocoder picks one coordinate when the service returns several
/// matches for the same text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeocodeStrategy {
    /// Take the first feature in the response.
    #[default]
    FirstMatch,
    /// Take the feature with the highest `rank.confidence`; ties keep the earliest.
    HighestConfidence,
}

impl std::fmt::Display for GeocodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeStrategy::FirstMatch => write!(f, "first"),
            GeocodeStrategy::HighestConfidence => write!(f, "confidence"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub gmail_address: String,
    pub gmail_app_password: String,
    pub geoapify_api_key: String,
    pub groq_api_key: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub geoapify_base_url: String,
    pub chat_base_url: String,
    pub chat_model: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub hospital_radius_m: u32,
    pub hospital_limit: u32,
    pub route_concurrency: usize,
    pub geocode_strategy: GeocodeStrategy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("gmail_address", &self.gmail_address)
            .field("gmail_app_password", &"[redacted]")
            .field("geoapify_api_key", &"[redacted]")
            .field("groq_api_key", &"[redacted]")
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("geoapify_base_url", &self.geoapify_base_url)
            .field("chat_base_url", &self.chat_base_url)
            .field("chat_model", &self.chat_model)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("hospital_radius_m", &self.hospital_radius_m)
            .field("hospital_limit", &self.hospital_limit)
            .field("route_concurrency", &self.route_concurrency)
            .field("geocode_strategy", &self.geocode_strategy)
            .finish()
    }
}
