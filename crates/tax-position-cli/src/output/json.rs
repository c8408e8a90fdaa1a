use serde_json::Value;
use std::io::{self, Write};

/// Write the computation envelope (`result`, `methodology`, `assumptions`,
/// `warnings`, `metadata`) to stdout as indented JSON. Decimal amounts stay
/// strings so no precision is lost downstream.
pub fn print_json(value: &Value) {
    let mut out = io::stdout().lock();
    let written = serde_json::to_writer_pretty(&mut out, value)
        .map_err(io::Error::from)
        .and_then(|()| writeln!(out));
    if let Err(e) = written {
        tracing::error!(error = %e, "failed to write JSON output");
    }
}
