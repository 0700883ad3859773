/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

// Session storage
pub const SESSION_FILE_NAME: &str = "session.toml";

// Initial navigation targets, keyed by the persisted role
pub const ROUTE_LOGIN: &str = "login";
pub const ROUTE_HOME: &str = "home";
pub const ROUTE_ADMIN_DASHBOARD: &str = "admin_dashboard";
pub const ROUTE_SUPER_ADMIN_DASHBOARD: &str = "super_admin_dashboard";
