//! Application configuration constants.
//! Endpoints, tuning and markers in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &'static str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Remote API ----

/// Public CircleCI endpoints and transport defaults.
pub struct ApiDefaults;

impl ApiDefaults {
    pub const BASE_URL: &'static str = "https://circleci.com/api/v1.1/";
    pub const DASHBOARD_URL: &'static str = "https://app.circleci.com";
    /// Attempts per GET, including the first.
    pub const RETRY_ATTEMPTS: u32 = 3;
    pub const TIMEOUT_SECS: u64 = 30;
    /// First retry delay; doubles per attempt.
    pub const BACKOFF_BASE_MS: u64 = 250;
}

/// Request headers sent to the API.
pub struct ApiHeaders;

impl ApiHeaders {
    pub const TOKEN: &'static str = "Circle-Token";
    pub const ACCEPT: &'static str = "Accept";
    pub const ACCEPT_JSON: &'static str = "application/json";
}

// ---- Sanitizer ----

/// Log lines containing this token are dropped before emission.
pub const CIRCLE_SHA1_MARKER: &[u8] = b"CIRCLE_SHA1=";

// ---- Workers / channels ----

/// Worker and channel sizing.
pub struct ScanLimits;

impl ScanLimits {
    /// Project walks running at once when not configured.
    pub const DEFAULT_CONCURRENCY: usize = 8;
    /// Chunk channel capacity used by the CLI consumer.
    pub const DEFAULT_CHANNEL_CAP: usize = 64;
}

// ---- Credentials ----

/// Environment variable holding the API token.
pub const TOKEN_ENV_KEY: &str = "CIRCLECI_TOKEN";
