use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReadingOutput<'a> {
    target: &'a str,
    ok: bool,
    value: &'a Value,
    timestamp_ms: u128,
}

/// Print one sensor reading. `value` is the serialized typed reading value.
pub fn print_reading(target: &str, ok: bool, value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ReadingOutput {
            target,
            ok,
            value,
            timestamp_ms: now_unix_millis(),
        }),
        OutputFormat::Table => {
            let mut rows = vec![vec!["ok".to_string(), ok.to_string()]];
            rows.extend(
                flatten(value)
                    .into_iter()
                    .map(|(field, value)| vec![field, value]),
            );
            print_table(vec!["FIELD", "VALUE"], rows);
        }
        OutputFormat::Pretty => {
            let fields = flatten(value)
                .into_iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{target} ok={ok} {fields}");
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_table(header: Vec<&str>, rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

/// Flatten nested objects into dotted `field=value` pairs, in field order.
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let field = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&field, child, rows);
            }
        }
        Value::String(text) => rows.push((field_name(prefix), text.clone())),
        other => rows.push((field_name(prefix), other.to_string())),
    }
}

fn field_name(prefix: &str) -> String {
    if prefix.is_empty() {
        "value".to_string()
    } else {
        prefix.to_string()
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
