//! Card is a front/back study item with revision metadata. Field names
//! follow the stored document shape (camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schedule::RevisionSetting;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub user_id: String,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_revision: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(rename = "revisionSettings", default)]
    pub revision: RevisionSetting,
}

/// Partial update for an existing card.
#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub front: Option<String>,
    pub back: Option<String>,
    pub revision: Option<RevisionSetting>,
}

/// Trims card text and rejects empty values before persistence.
pub fn clean_text(field: &'static str, text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clean_text_trims() {
        assert_eq!(clean_text("front", "  Paris  ").unwrap(), "Paris");
    }

    #[test]
    fn test_clean_text_rejects_blank() {
        assert!(matches!(
            clean_text("back", "   "),
            Err(AppError::EmptyField("back"))
        ));
        assert!(clean_text("front", "").is_err());
    }

    #[test]
    fn test_card_serializes_with_document_field_names() {
        let card = Card {
            id: "c1".to_string(),
            user_id: "u1".to_string(),
            front: "Capital of France".to_string(),
            back: "Paris".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            next_revision: None,
            last_reviewed: None,
            review_count: 0,
            revision: RevisionSetting::default(),
        };

        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"revisionSettings\""));
        assert!(json.contains("\"reviewCount\""));
        // absent optional fields are omitted, not null
        assert!(!json.contains("nextRevision"));
        assert!(!json.contains("lastReviewed"));
    }
}
