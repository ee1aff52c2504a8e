//! Card store gateway
//!
//! CRUD façade over the card collection, scoped by owning user. Backed by
//! SQLite; callers get the typed error taxonomy and never see rusqlite
//! directly. Failures are not retried here; the caller surfaces them and
//! leaves its own state unchanged.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::card::clean_text;
use crate::models::schedule::{RevisionSetting, RevisionUnit};
use crate::models::{Card, CardPatch, Profile};

/// Opens the store at `path` and creates the tables if needed.
pub fn init_store(path: &str) -> Result<Connection> {
    let conn = Connection::open(path).map_err(AppError::StoreUnavailable)?;
    create_tables(&conn)?;
    Ok(conn)
}

/// In-memory store, used by tests.
pub fn init_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(AppError::StoreUnavailable)?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            next_revision INTEGER,
            last_reviewed INTEGER,
            review_count INTEGER NOT NULL DEFAULT 0,
            revision_interval INTEGER,
            revision_unit TEXT
        );
        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .map_err(AppError::StoreUnavailable)
}

fn to_millis(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

const CARD_COLUMNS: &str = "id, user_id, front, back, created_at, next_revision, \
                            last_reviewed, review_count, revision_interval, revision_unit";

/// Maps a stored row to a Card. Documents written before revision units
/// existed carry a plain day count in `revision_interval`; they migrate to
/// days here, and documents with no setting at all get the default.
fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    let interval: Option<i64> = row.get(8)?;
    let unit: Option<String> = row.get(9)?;

    let revision = match (interval, unit.as_deref().and_then(RevisionUnit::from_name)) {
        (Some(interval), Some(unit)) => RevisionSetting::new(interval, unit).unwrap_or_default(),
        (Some(interval), None) => {
            RevisionSetting::new(interval, RevisionUnit::Days).unwrap_or_default()
        }
        _ => RevisionSetting::default(),
    };

    Ok(Card {
        id: row.get(0)?,
        user_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        created_at: from_millis(row.get(4)?),
        next_revision: row.get::<_, Option<i64>>(5)?.map(from_millis),
        last_reviewed: row.get::<_, Option<i64>>(6)?.map(from_millis),
        review_count: row.get(7)?,
        revision,
    })
}

/// Creates a card for `user_id`, assigning its id and creation timestamp.
pub fn create_card(
    conn: &Connection,
    user_id: &str,
    front: &str,
    back: &str,
    revision: RevisionSetting,
    now: DateTime<Utc>,
) -> Result<Card> {
    // settings can arrive from deserialized card files, so re-check here
    let revision = RevisionSetting::new(revision.interval, revision.unit)?;
    let card = Card {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        front: clean_text("front", front)?,
        back: clean_text("back", back)?,
        created_at: now,
        next_revision: None,
        last_reviewed: None,
        review_count: 0,
        revision,
    };

    conn.execute(
        "INSERT INTO cards (id, user_id, front, back, created_at, review_count, revision_interval, revision_unit)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
        params![
            card.id,
            card.user_id,
            card.front,
            card.back,
            to_millis(card.created_at),
            card.revision.interval,
            card.revision.unit.name(),
        ],
    )
    .map_err(AppError::StoreUnavailable)?;

    log::info!("created card {} for user {}", card.id, card.user_id);
    Ok(card)
}

/// Fetches a single card by id.
pub fn get_card(conn: &Connection, id: &str) -> Result<Card> {
    conn.query_row(
        &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
        params![id],
        card_from_row,
    )
    .map_err(|err| match err {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(id.to_string()),
        other => AppError::StoreUnavailable(other),
    })
}

/// Applies a partial update to an existing card.
pub fn update_card(conn: &Connection, id: &str, patch: CardPatch) -> Result<Card> {
    let mut card = get_card(conn, id)?;

    if let Some(front) = patch.front {
        card.front = clean_text("front", &front)?;
    }
    if let Some(back) = patch.back {
        card.back = clean_text("back", &back)?;
    }
    if let Some(revision) = patch.revision {
        card.revision = RevisionSetting::new(revision.interval, revision.unit)?;
    }

    conn.execute(
        "UPDATE cards SET front = ?1, back = ?2, revision_interval = ?3, revision_unit = ?4
         WHERE id = ?5",
        params![
            card.front,
            card.back,
            card.revision.interval,
            card.revision.unit.name(),
            id,
        ],
    )
    .map_err(AppError::StoreUnavailable)?;

    Ok(card)
}

pub fn delete_card(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM cards WHERE id = ?1", params![id])
        .map_err(AppError::StoreUnavailable)?;

    if deleted == 0 {
        return Err(AppError::NotFound(id.to_string()));
    }
    log::info!("deleted card {id}");
    Ok(())
}

/// All cards owned by `user_id`, newest first.
pub fn list_cards(conn: &Connection, user_id: &str) -> Result<Vec<Card>> {
    let mut stmt = conn
        .prepare(&format!(
            // ties on created_at break toward the newer insert
            "SELECT {CARD_COLUMNS} FROM cards WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))
        .map_err(AppError::StoreUnavailable)?;

    let cards = stmt
        .query_map(params![user_id], card_from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Card>>>())
        .map_err(AppError::StoreUnavailable)?;

    Ok(cards)
}

/// Marks a card reviewed at `now`: stamps the review, schedules the next
/// due date from the card's own setting, and bumps the counter.
pub fn mark_reviewed(conn: &Connection, id: &str, now: DateTime<Utc>) -> Result<Card> {
    let mut card = get_card(conn, id)?;

    card.last_reviewed = Some(now);
    card.next_revision = Some(card.revision.next_due(now)?);
    card.review_count += 1;

    conn.execute(
        "UPDATE cards SET last_reviewed = ?1, next_revision = ?2, review_count = ?3
         WHERE id = ?4",
        params![
            to_millis(now),
            card.next_revision.map(to_millis),
            card.review_count,
            id,
        ],
    )
    .map_err(AppError::StoreUnavailable)?;

    log::info!("card {} reviewed, next due {:?}", card.id, card.next_revision);
    Ok(card)
}

/// Loads the signed-in profile, creating one on first run.
pub fn get_or_create_profile(conn: &Connection) -> Result<Profile> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = 'profile'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(AppError::StoreUnavailable)?;

    if let Some(json) = stored {
        return Ok(serde_json::from_str(&json)?);
    }

    let profile = Profile {
        uid: Uuid::new_v4().to_string(),
        display_name: "Local user".to_string(),
        email: String::new(),
    };
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES ('profile', ?1)",
        params![serde_json::to_string(&profile)?],
    )
    .map_err(AppError::StoreUnavailable)?;

    log::info!("created profile {}", profile.uid);
    Ok(profile)
}
