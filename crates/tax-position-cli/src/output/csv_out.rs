use serde_json::Value;
use std::io;

use super::{plain, ROW_FIELDS};

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write the result as CSV: the row list when the result has one
/// (breakdown lines or safety-check items), otherwise field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let rows = ROW_FIELDS
                .iter()
                .find_map(|f| map.get(*f).and_then(Value::as_array));
            match rows {
                Some(rows) => write_rows(&mut wtr, rows),
                None => {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in map {
                        let _ = wtr.write_record([key.as_str(), &plain(val)]);
                    }
                }
            }
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => {
            let _ = wtr.write_record([&plain(result)]);
        }
    }

    if let Err(e) = wtr.flush() {
        tracing::warn!(error = %e, "failed to flush CSV output");
    }
}

fn write_rows(wtr: &mut StdoutCsv<'_>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(plain).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}
