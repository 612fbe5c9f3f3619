pub mod network {
    pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const ERROR_PREVIEW_BYTES: usize = 4 * 1024;
}

pub mod env {
    pub const API_BASE_URL: &str = "TELEGRAM_API_BASE_URL";
    pub const ACCESS_TOKEN: &str = "TELEGRAM_ACCESS_TOKEN";
    pub const TIMEOUT_MS: &str = "TELEGRAM_TIMEOUT_MS";
    pub const BINARY_DATA_DIR: &str = "TELEGRAM_BINARY_DATA_DIR";
    pub const ATTRIBUTION_DISABLED: &str = "TELEGRAM_ATTRIBUTION_DISABLED";
    pub const LOG_LEVEL: &str = "TELEGRAM_LOG_LEVEL";
    pub const LOG_LEVEL_FALLBACK: &str = "LOG_LEVEL";
}

pub mod node {
    pub const DEFAULT_TYPE_VERSION: f64 = 1.2;
    pub const DEFAULT_BINARY_PROPERTY: &str = "data";
    pub const DOWNLOAD_BINARY_PROPERTY: &str = "data";
    pub const DEFAULT_PARSE_MODE: &str = "Markdown";
}

pub mod attribution {
    pub const TEXT: &str = "This message was sent automatically with ";
    pub const LABEL: &str = "n8n";
    pub const LINK_BASE: &str =
        "https://n8n.io/?utm_source=n8n-internal&utm_medium=powered_by&utm_campaign=n8n-nodes-base.telegram";
}

pub mod send_and_wait {
    pub const DEFAULT_APPROVE_LABEL: &str = "✅ Approve";
    pub const DEFAULT_DISAPPROVE_LABEL: &str = "❌ Decline";
    pub const DEFAULT_RESPOND_LABEL: &str = "Respond";
    /// Far-future instant used when no wait limit is configured.
    pub const WAIT_INDEFINITELY: &str = "3000-01-01T00:00:00Z";
}
