pub mod config;
pub mod logger;
pub mod scan_toml;
pub mod token;

pub use config::*;
pub use logger::setup_logging;
pub use scan_toml::{ScanToml, apply_file_to_cli, load_scan_toml, parse_scan_toml};
pub use token::get_token;
