use serde_json::Value;
use std::io::{self, Read};

/// Read a request piped on stdin, e.g.
/// `cat records.json | taxpos position`.
///
/// The request has the same shape as an `--input` file: the command's
/// fields plus an optional embedded `settings` (or `config` for
/// `safety-check`). Returns `None` for an interactive terminal or an empty
/// pipe so the caller can report which input is missing.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        tracing::debug!("stdin is a terminal, not reading a request from it");
        return Ok(None);
    }

    let mut request = String::new();
    io::stdin().lock().read_to_string(&mut request)?;
    if request.trim().is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(&request)
        .map_err(|e| format!("request on stdin is not valid JSON: {e}"))?;
    tracing::debug!(bytes = request.len(), "read request from stdin");
    Ok(Some(value))
}
