use crate::templates::TEMPLATES;
use crate::OutputFormat;

pub(crate) fn cmd_list(output: OutputFormat) {
    match output {
        OutputFormat::Text => {
            let width = TEMPLATES.iter().map(|t| t.name.len()).max().unwrap_or(0);
            for t in TEMPLATES {
                println!("{:<width$}  {}", t.name, t.summary, width = width);
            }
        }
        OutputFormat::Json => {
            let list: Vec<serde_json::Value> = TEMPLATES
                .iter()
                .map(|t| serde_json::json!({ "name": t.name, "summary": t.summary }))
                .collect();
            println!("{:#}", serde_json::Value::Array(list));
        }
    }
}
