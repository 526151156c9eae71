use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub purchase: PurchaseConfig,
}

/// Remote ticketing API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Browser cookie of a logged-in account (required)
    pub cookie: String,
    /// API base URL (default: https://show.bilibili.com)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Skip TLS certificate verification for this client only
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl ApiConfig {
    /// Build an API config with defaults for everything but the cookie.
    pub fn with_cookie(cookie: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            accept_invalid_certs: false,
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://show.bilibili.com";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/126.0.0.0 Safari/537.36"
        .to_string()
}

/// What to buy and for whom.
///
/// Index fields are positions into the lists returned by the API, not ids.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PurchaseConfig {
    /// Project (event) id
    pub project_id: u64,
    /// (session index, ticket tier index) pairs; only the first is used
    #[serde(default = "default_screen_ticket")]
    pub screen_ticket: Vec<(usize, usize)>,
    /// Buyer indices for identity-verified projects
    #[serde(default)]
    pub buyer_index: Vec<usize>,
    /// Address indices; the first one supplies name/phone for non-verified projects
    #[serde(default)]
    pub address_index: Vec<usize>,
    /// Ticket count for non-verified projects
    #[serde(default = "default_count")]
    pub count: u32,
    /// Sale dates for dated projects; only the first is used
    #[serde(default)]
    pub sales_date: Vec<String>,
    /// Ship paper tickets to the selected address instead of the first one
    #[serde(default)]
    pub deliver_to_selected_address: bool,
}

impl PurchaseConfig {
    /// A purchase of one ticket from the first session and tier.
    pub fn for_project(project_id: u64) -> Self {
        Self {
            project_id,
            screen_ticket: default_screen_ticket(),
            buyer_index: Vec::new(),
            address_index: Vec::new(),
            count: default_count(),
            sales_date: Vec::new(),
            deliver_to_selected_address: false,
        }
    }

    /// Selected (session index, tier index), defaulting to the first of each.
    pub fn screen_ticket_index(&self) -> (usize, usize) {
        self.screen_ticket.first().copied().unwrap_or((0, 0))
    }

    /// Selected address index, defaulting to the first address.
    pub fn address_index(&self) -> usize {
        self.address_index.first().copied().unwrap_or(0)
    }
}

fn default_screen_ticket() -> Vec<(usize, usize)> {
    vec![(0, 0)]
}

fn default_count() -> u32 {
    1
}

/// Sanitized config for logging (cookie redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub purchase: PurchaseConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub cookie_configured: bool,
    pub timeout_secs: u32,
    pub accept_invalid_certs: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                cookie_configured: !config.api.cookie.is_empty(),
                timeout_secs: config.api.timeout_secs,
                accept_invalid_certs: config.api.accept_invalid_certs,
            },
            purchase: config.purchase.clone(),
        }
    }
}
