//! Configuration loading and resolution.

use std::path::PathBuf;

use steuer::{DEFAULT_ENDPOINT, DEFAULT_OUTPUT};

/// Environment variable overriding the output file.
pub const OUTPUT_ENV: &str = "STEUER_OUTPUT";

/// Environment variable overriding the calculator endpoint.
pub const ENDPOINT_ENV: &str = "STEUER_ENDPOINT";

/// Resolve the output file path: flag, then env, then `steuer.jsonl` in the cwd.
pub fn resolve_output_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Ok(env_path) = std::env::var(OUTPUT_ENV) {
        if !env_path.is_empty() {
            return PathBuf::from(env_path);
        }
    }

    PathBuf::from(DEFAULT_OUTPUT)
}

/// Resolve the calculator endpoint: flag, then env, then the public site.
pub fn resolve_endpoint(explicit: Option<&str>) -> String {
    if let Some(url) = explicit {
        return url.to_string();
    }

    match std::env::var(ENDPOINT_ENV) {
        Ok(url) if !url.is_empty() => url,
        _ => DEFAULT_ENDPOINT.to_string(),
    }
}
