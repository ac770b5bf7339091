//! Resource URI templates and static resource definitions.

use crate::types::{ResourceDefinition, ResourceTemplateDefinition};

pub const SCHEME: &str = "depmatrix://";

fn template(uri_template: &str, name: &str, description: &str) -> ResourceTemplateDefinition {
    ResourceTemplateDefinition {
        uri_template: uri_template.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        mime_type: Some("application/json".to_string()),
    }
}

pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
    vec![
        template(
            "depmatrix://session/{id}/original",
            "Original Matrix",
            "Matrix produced by the last discovery or import",
        ),
        template(
            "depmatrix://session/{id}/modified",
            "Modified Matrix",
            "Matrix produced by the last edit, or the original if none",
        ),
        template(
            "depmatrix://session/{id}/diff",
            "Matrix Diff",
            "Changes between the original and the modified matrix",
        ),
    ]
}

pub fn list_resources() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: format!("{SCHEME}sessions"),
        name: "Sessions".to_string(),
        description: Some("Status of every live matrix session".to_string()),
        mime_type: Some("application/json".to_string()),
    }]
}
