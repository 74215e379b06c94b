//! JSON output records.

use serde::{Deserialize, Serialize};

/// Release versions of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTags {
    pub project_name: String,
    pub tags: Vec<String>,
}

/// Tickets shipped by one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestTickets {
    pub manifest_name: String,
    pub tickets: Vec<String>,
}

/// Release versions of each project shipped by one manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestTags {
    pub manifest_name: String,
    pub projects_tags: Vec<ProjectTags>,
}
