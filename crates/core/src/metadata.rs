//! Top-level template metadata: parameter grouping and labels for the
//! console's parameter form.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

const INTERFACE_KEY: &str = "AWS::CloudFormation::Interface";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    groups: Vec<ParameterGroup>,
    labels: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    pub label: String,
    pub parameters: Vec<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.labels.is_empty()
    }

    pub fn groups(&self) -> &[ParameterGroup] {
        &self.groups
    }

    pub fn label(&self, parameter: &str) -> Option<&str> {
        self.labels.get(parameter).map(String::as_str)
    }

    pub(crate) fn push_group(&mut self, label: String, parameters: Vec<String>) {
        self.groups.push(ParameterGroup { label, parameters });
    }

    /// A later label for the same parameter replaces the earlier one.
    pub(crate) fn set_label(&mut self, parameter: String, label: String) {
        self.labels.insert(parameter, label);
    }

    pub fn to_json(&self) -> Value {
        let mut interface = Map::new();
        if !self.groups.is_empty() {
            let groups: Vec<Value> = self
                .groups
                .iter()
                .map(|g| {
                    json!({
                        "Label": { "default": g.label },
                        "Parameters": g.parameters,
                    })
                })
                .collect();
            interface.insert("ParameterGroups".to_owned(), Value::Array(groups));
        }
        if !self.labels.is_empty() {
            let mut lm = Map::new();
            for (name, label) in &self.labels {
                lm.insert(name.clone(), json!({ "default": label }));
            }
            interface.insert("ParameterLabels".to_owned(), Value::Object(lm));
        }

        let mut m = Map::new();
        m.insert(INTERFACE_KEY.to_owned(), Value::Object(interface));
        Value::Object(m)
    }
}
