use std::path::Path;
use std::process;

use stackform_core::StackError;

use crate::templates;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_render(
    name: &str,
    out: Option<&Path>,
    compact: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let Some(template) = templates::find(name) else {
        let msg = format!(
            "unknown template '{}' (run `stackform list` for available templates)",
            name
        );
        report_error(&msg, output, quiet);
        process::exit(1);
    };

    let stack = match (template.build)() {
        Ok(stack) => stack,
        Err(e) => {
            if !quiet {
                eprintln!("{}", build_error_report(&e, output));
            }
            process::exit(1);
        }
    };
    tracing::info!(template = name, entities = stack.len(), "built template");

    let doc = stack.to_json();
    let rendered = if compact {
        doc.to_string()
    } else {
        format!("{:#}", doc)
    };

    match out {
        None => println!("{}", rendered),
        Some(path) => {
            if let Err(e) = std::fs::write(path, format!("{}\n", rendered)) {
                let msg = format!("error writing '{}': {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
            if !quiet && output == OutputFormat::Text {
                println!("Wrote {}", path.display());
            }
        }
    }
}

/// Render a template build failure for stderr. JSON output keeps the error's
/// stable `code` next to the message.
fn build_error_report(e: &StackError, output: OutputFormat) -> String {
    match output {
        OutputFormat::Text => format!("error: {}", e),
        OutputFormat::Json => format!("{:#}", e.to_json_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackform_core::{OutputDef, ParameterDef, Stack};

    fn failed_build() -> StackError {
        let mut stack = Stack::default();
        stack
            .add_parameter("KeyName", ParameterDef::new("String"))
            .unwrap();
        stack
            .add_output("KeyName", OutputDef::new("duplicate"))
            .unwrap_err()
    }

    #[test]
    fn build_error_text_is_prefixed() {
        let report = build_error_report(&failed_build(), OutputFormat::Text);
        assert_eq!(
            report,
            "error: duplicate Output id 'KeyName': already registered as a Parameter"
        );
    }

    #[test]
    fn build_error_json_carries_code_and_message() {
        let report = build_error_report(&failed_build(), OutputFormat::Json);
        let v: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(v["code"], "DuplicateIdentifier");
        assert_eq!(
            v["message"],
            "duplicate Output id 'KeyName': already registered as a Parameter"
        );
        // pretty-printed like the rest of the JSON error output
        assert!(report.contains('\n'));
    }
}
