//! Built-in template documents rendered by `stackform render`.

mod instance_volume;
mod web_server;

use stackform_core::{Result, Stack};

/// A named document builder shipped with the binary.
pub(crate) struct BuiltinTemplate {
    pub name: &'static str,
    pub summary: &'static str,
    pub build: fn() -> Result<Stack>,
}

pub(crate) const TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        name: "web-server",
        summary: "Web server instance with optional SSH access and an optional attached EBS volume",
        build: web_server::build,
    },
    BuiltinTemplate {
        name: "instance-volume",
        summary: "EC2 instance with an EBS volume in the same availability zone",
        build: instance_volume::build,
    },
];

pub(crate) fn find(name: &str) -> Option<&'static BuiltinTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}
