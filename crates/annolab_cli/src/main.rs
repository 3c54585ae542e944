//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `annolab_core` linkage.
//! - Print the flat form model of a JSON document for quick local checks.

use annolab_core::{describe_fields, flatten, unflatten, NestedRecord};
use serde_json::{json, Value};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("annolab_core ping={}", annolab_core::ping());
    println!("annolab_core version={}", annolab_core::core_version());

    let document = match std::env::args().nth(1) {
        Some(path) => match load_document(&path) {
            Ok(document) => document,
            Err(message) => {
                eprintln!("error: {message}");
                return ExitCode::FAILURE;
            }
        },
        None => sample_document(),
    };

    let flat = flatten(&document);
    for field in describe_fields(&flat) {
        let value = flat
            .get(&field.path)
            .map(|value| value.to_json().to_string())
            .unwrap_or_default();
        println!(
            "{} kind={} widget={} value={}",
            field.path,
            field.kind.as_str(),
            field.widget.as_str(),
            value
        );
    }

    match unflatten(&flat) {
        Ok(rebuilt) if rebuilt == document => {
            println!("roundtrip=ok fields={}", flat.len());
            ExitCode::SUCCESS
        }
        Ok(_) => {
            eprintln!("roundtrip=mismatch");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("roundtrip=error {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_document(path: &str) -> Result<NestedRecord, String> {
    let text = std::fs::read_to_string(path).map_err(|err| format!("{path}: {err}"))?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(format!("{path}: document must be a JSON object")),
        Err(err) => Err(format!("{path}: {err}")),
    }
}

fn sample_document() -> NestedRecord {
    let sample = json!({
        "company": {
            "name": "Acme Labeling",
            "founded": "2012-03-01",
            "verified": true
        },
        "qualifications": {
            "construction": {"level": "A", "expires": "2026-06-30"}
        },
        "headcount": 42,
        "tags": ["image", "audio"]
    });
    match sample {
        Value::Object(document) => document,
        _ => NestedRecord::new(),
    }
}
