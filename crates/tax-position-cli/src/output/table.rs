use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{plain, ROW_FIELDS};

/// Print the result as a field/value table, followed by one table per row
/// list (breakdown lines, safety-check items) and the warnings.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", plain(value));
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            print_fields(result);
            for field in ROW_FIELDS {
                if let Some(Value::Array(rows)) = result.get(field) {
                    println!("\n{}:", field);
                    print_rows(rows);
                }
            }
        }
        _ => print_fields(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if ROW_FIELDS.contains(&key.as_str()) {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(none)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn cell(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Null => "-".to_string(),
        _ => plain(value),
    }
}
