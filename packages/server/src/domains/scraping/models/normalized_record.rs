use serde::{Deserialize, Serialize};

/// The stable shape every consumer sees. All fields are always present strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizedRecord {
    pub post_title: String,
    pub text: String,
    pub likes_count: String,
    pub source_url: String,
    pub profile_id: String,
    pub profile_name: String,
    pub profile_url: String,
    pub profile_picture: String,
}
