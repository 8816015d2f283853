use std::path::Path;
use std::process;

use crate::{report_error, OutputFormat};

static DOCUMENT_SCHEMA_STR: &str = include_str!("../../../../schema/template-document.schema.json");

pub(crate) fn cmd_validate(document_path: &Path, output: OutputFormat, quiet: bool) {
    let schema: serde_json::Value = match serde_json::from_str(DOCUMENT_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("internal error: failed to parse embedded document schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc_str = match std::fs::read_to_string(document_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", document_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc: serde_json::Value = match serde_json::from_str(&doc_str) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", document_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("internal error: failed to compile schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let errors: Vec<String> = validator
        .iter_errors(&doc)
        .map(|e| format!("{}", e))
        .collect();

    if errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => println!("{}", serde_json::json!({ "valid": true })),
            }
        }
        return;
    }

    tracing::debug!(count = errors.len(), "schema violations");
    if !quiet {
        match output {
            OutputFormat::Text => {
                eprintln!("invalid document");
                for e in &errors {
                    eprintln!("  {}", e);
                }
            }
            OutputFormat::Json => {
                eprintln!(
                    "{:#}",
                    serde_json::json!({ "valid": false, "errors": errors })
                );
            }
        }
    }
    process::exit(1);
}
