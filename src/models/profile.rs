//! Signed-in identity. Only `uid` is consumed as the owner key for cards.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub display_name: String,
    pub email: String,
}
