/// Names shared between configuration, handlers and the wizard.

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com";

// Environment variables
pub const ENV_PORT: &str = "PORT";
pub const ENV_STATIC_DIR: &str = "ROAMSIX_STATIC_DIR";
pub const ENV_LOG_DIR: &str = "ROAMSIX_LOG_DIR";
pub const ENV_AIRTABLE_API_URL: &str = "AIRTABLE_API_URL";
pub const ENV_AIRTABLE_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const ENV_AIRTABLE_TOKEN: &str = "AIRTABLE_TOKEN";
pub const ENV_AIRTABLE_TABLE_CODES: &str = "AIRTABLE_TABLE_CODES";
pub const ENV_AIRTABLE_TABLE_APPLICATIONS: &str = "AIRTABLE_TABLE_APPLICATIONS";
pub const ENV_AIRTABLE_TABLE_INTERESTS: &str = "AIRTABLE_TABLE_INTERESTS";

// Routes
pub const ROUTE_VALIDATE_CODE: &str = "/api/validate-code";
pub const ROUTE_MARK_CODE_USED: &str = "/api/mark-code-used";
pub const ROUTE_SUBMIT_APPLICATION: &str = "/api/submit-application";
pub const ROUTE_SUBMIT_INTERESTS: &str = "/api/submit-interests";
pub const ROUTE_SUBMIT_INTEREST_ALIAS: &str = "/api/submit-interest";
pub const ROUTE_PATHWAYS: &str = "/api/pathways";

// Airtable status values
pub const CODE_STATUS_ACTIVE: &str = "Active";
pub const CODE_STATUS_USED: &str = "Used";
pub const APPLICATION_STATUS_UNDER_REVIEW: &str = "Under Review";
pub const INTEREST_STATUS_NOT_CONTACTED: &str = "Not Contacted";
