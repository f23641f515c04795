//! Participant identity as supplied by the identity-lookup collaborator

use serde::{Deserialize, Serialize};

/// Display identity for one participant
///
/// The optional fields only surface on export scoreboards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
}

impl UserInfo {
    pub fn named(display_name: impl Into<String>) -> Self {
        UserInfo {
            display_name: display_name.into(),
            ..UserInfo::default()
        }
    }
}
