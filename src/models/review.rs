//! Review surface view-model: the card list with its flip state, updated
//! through explicit commands. A command runs against the store first and is
//! applied locally only once the write is confirmed, so a failed write
//! leaves the list exactly as it was.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::schedule::{RevisionSetting, time_until};
use super::{Card, CardPatch};
use crate::database::db;
use crate::error::Result;

/// Store-backed mutations of the card list.
#[derive(Debug, Clone)]
pub enum ReviewCommand {
    Create {
        front: String,
        back: String,
        revision: RevisionSetting,
    },
    Update {
        id: String,
        patch: CardPatch,
    },
    Delete {
        id: String,
    },
    MarkReviewed {
        id: String,
    },
}

pub struct ReviewModel {
    pub user_id: String,
    /// Newest first, mirroring the store ordering.
    pub cards: Vec<Card>,
    flipped: HashSet<String>,
    pub error: Option<String>,
}

impl ReviewModel {
    pub fn load(conn: &Connection, user_id: String) -> Result<Self> {
        let cards = db::list_cards(conn, &user_id)?;
        Ok(Self {
            user_id,
            cards,
            flipped: HashSet::new(),
            error: None,
        })
    }

    /// Runs a command against the store, applying it locally on success.
    /// Failures become a user-facing message and change nothing else.
    pub fn dispatch(&mut self, conn: &Connection, command: ReviewCommand, now: DateTime<Utc>) {
        match self.run(conn, command, now) {
            Ok(()) => self.error = None,
            Err(err) => {
                log::warn!("store command failed: {err}");
                self.error = Some(err.to_string());
            }
        }
    }

    fn run(&mut self, conn: &Connection, command: ReviewCommand, now: DateTime<Utc>) -> Result<()> {
        match command {
            ReviewCommand::Create {
                front,
                back,
                revision,
            } => {
                let card = db::create_card(conn, &self.user_id, &front, &back, revision, now)?;
                self.cards.insert(0, card);
            }
            ReviewCommand::Update { id, patch } => {
                let card = db::update_card(conn, &id, patch)?;
                self.replace(card);
            }
            ReviewCommand::Delete { id } => {
                db::delete_card(conn, &id)?;
                self.cards.retain(|c| c.id != id);
                self.flipped.remove(&id);
            }
            ReviewCommand::MarkReviewed { id } => {
                let card = db::mark_reviewed(conn, &id, now)?;
                self.replace(card);
            }
        }
        Ok(())
    }

    fn replace(&mut self, card: Card) {
        if let Some(slot) = self.cards.iter_mut().find(|c| c.id == card.id) {
            *slot = card;
        }
    }

    pub fn toggle_flip(&mut self, id: &str) {
        if !self.flipped.remove(id) {
            self.flipped.insert(id.to_string());
        }
    }

    pub fn is_flipped(&self, id: &str) -> bool {
        self.flipped.contains(id)
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// "due in 3 days" / "due now" for a scheduled card.
    pub fn due_label(card: &Card, now: DateTime<Utc>) -> Option<String> {
        card.next_revision.map(|due| time_until(due, now).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::RevisionUnit;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn setting() -> RevisionSetting {
        RevisionSetting::new(1, RevisionUnit::Days).unwrap()
    }

    fn create(front: &str, back: &str) -> ReviewCommand {
        ReviewCommand::Create {
            front: front.to_string(),
            back: back.to_string(),
            revision: setting(),
        }
    }

    #[test]
    fn test_create_appends_newest_first() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();

        model.dispatch(&conn, create("first", "a"), t0());
        model.dispatch(&conn, create("second", "b"), t0() + Duration::seconds(1));

        assert!(model.error.is_none());
        assert_eq!(model.cards.len(), 2);
        assert_eq!(model.cards[0].front, "second");

        // local order matches a fresh load from the store
        let reloaded = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        let local: Vec<&str> = model.cards.iter().map(|c| c.id.as_str()).collect();
        let stored: Vec<&str> = reloaded.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(local, stored);
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        model.dispatch(&conn, create("keep", "me"), t0());
        assert_eq!(model.cards.len(), 1);

        conn.execute_batch("DROP TABLE cards").unwrap();
        model.dispatch(&conn, create("lost", "write"), t0());

        assert_eq!(model.cards.len(), 1);
        assert_eq!(model.cards[0].front, "keep");
        let message = model.error.as_deref().unwrap();
        assert!(message.contains("unavailable"), "got: {message}");
    }

    #[test]
    fn test_delete_missing_card_reports_not_found() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        model.dispatch(&conn, create("only", "card"), t0());

        model.dispatch(
            &conn,
            ReviewCommand::Delete {
                id: "missing".to_string(),
            },
            t0(),
        );
        assert_eq!(model.cards.len(), 1);
        assert!(model.error.as_deref().unwrap().contains("not found"));

        // a successful command clears the stale message
        let id = model.cards[0].id.clone();
        model.dispatch(&conn, ReviewCommand::Delete { id }, t0());
        assert!(model.error.is_none());
        assert!(model.cards.is_empty());
    }

    #[test]
    fn test_mark_reviewed_updates_local_card() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        model.dispatch(&conn, create("front", "back"), t0());

        let id = model.cards[0].id.clone();
        model.dispatch(&conn, ReviewCommand::MarkReviewed { id }, t0());

        let card = &model.cards[0];
        assert_eq!(card.review_count, 1);
        assert_eq!(
            card.next_revision.map(|d| (d - t0()).num_milliseconds()),
            Some(86_400_000)
        );
    }

    #[test]
    fn test_update_edits_local_card() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        model.dispatch(&conn, create("front", "back"), t0());

        let id = model.cards[0].id.clone();
        model.dispatch(
            &conn,
            ReviewCommand::Update {
                id,
                patch: CardPatch {
                    front: Some("edited".to_string()),
                    ..Default::default()
                },
            },
            t0(),
        );
        assert_eq!(model.cards[0].front, "edited");
    }

    #[test]
    fn test_flip_toggles() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        model.toggle_flip("c1");
        assert!(model.is_flipped("c1"));
        model.toggle_flip("c1");
        assert!(!model.is_flipped("c1"));
    }

    #[test]
    fn test_due_label() {
        let conn = db::init_in_memory().unwrap();
        let mut model = ReviewModel::load(&conn, "u1".to_string()).unwrap();
        model.dispatch(&conn, create("front", "back"), t0());

        assert_eq!(ReviewModel::due_label(&model.cards[0], t0()), None);

        let id = model.cards[0].id.clone();
        model.dispatch(&conn, ReviewCommand::MarkReviewed { id }, t0());
        assert_eq!(
            ReviewModel::due_label(&model.cards[0], t0()).as_deref(),
            Some("due in 1 day")
        );
        assert_eq!(
            ReviewModel::due_label(&model.cards[0], t0() + Duration::days(2)).as_deref(),
            Some("due now")
        );
    }
}
