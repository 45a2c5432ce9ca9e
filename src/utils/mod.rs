//! Utility functions and helpers.

pub mod http;

use std::path::Path;

use crate::error::Result;
use crate::models::TOKEN_ENV;

/// Resolve the API token.
///
/// A non-empty `GITHUB_TOKEN` wins over the token file. A missing file yields
/// `None` and the client runs anonymously.
pub fn load_token(token_file: &Path) -> Result<Option<String>> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            return Ok(Some(token.trim().to_string()));
        }
    }
    read_token_file(token_file)
}

fn read_token_file(token_file: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(token_file) {
        Ok(content) => {
            let token = content.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!(
                "No token at {} and {TOKEN_ENV} unset; searching anonymously",
                token_file.display()
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
