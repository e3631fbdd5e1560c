//! API token loading: env var → .env in dir → secure prompt.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::info;
use std::path::Path;

use crate::utils::config::{PackagePaths, TOKEN_ENV_KEY};

fn token_from_env() -> Option<String> {
    std::env::var(TOKEN_ENV_KEY)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn try_env_then_dotenv(dir: &Path) -> Option<String> {
    if let Some(s) = token_from_env() {
        return Some(s);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
        return token_from_env();
    }
    None
}

/// Read the CircleCI token: env (CIRCLECI_TOKEN) → .env in `dir` → secure prompt.
pub fn get_token(dir: &Path) -> Result<String> {
    if let Some(s) = try_env_then_dotenv(dir) {
        info!("Token found in environment");
        return Ok(s);
    }
    let label = format!("[{}]", PackagePaths::get().pkg_name()).cyan().bold();
    let token = rpassword::prompt_password(format!("{} CircleCI API token: ", label))
        .context("read token")?;
    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("no token given (set {} or enter one at the prompt)", TOKEN_ENV_KEY);
    }
    Ok(token)
}
