//! Engine module: remote access, transport, sanitizing, progress and the CLI.

pub mod arg_parser;
pub mod cancel;
pub mod cli;
pub mod client;
pub mod progress;
pub mod sanitize;
pub mod transport;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cancel::CancelToken;
pub use cli::handle_run;
pub use client::{CircleCiClient, Endpoints};
pub use progress::ScanProgress;
pub use sanitize::sanitize;
pub use transport::{HttpRequest, HttpResponse, RetryingClient, Transport};
