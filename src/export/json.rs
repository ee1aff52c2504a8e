//! JSON import/export for a user's cards.
//! Card files carry only the fields worth moving between machines; ids,
//! ownership and review history are assigned again on import.

use std::fs::File;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Card;
use crate::models::schedule::RevisionSetting;

/// On-disk card file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFile {
    pub cards: Vec<CardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub revision_settings: RevisionSetting,
}

impl From<&Card> for CardEntry {
    fn from(card: &Card) -> Self {
        Self {
            front: card.front.clone(),
            back: card.back.clone(),
            revision_settings: card.revision,
        }
    }
}

/// Exports cards to a JSON file at the specified path.
pub fn export_cards_to_path(cards: &[Card], path: &str) -> Result<()> {
    let card_file = CardFile {
        cards: cards.iter().map(CardEntry::from).collect(),
    };
    let json_string = serde_json::to_string_pretty(&card_file)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Imports a card file. Returns an error if the file doesn't exist or
/// contains invalid JSON.
pub fn import_cards(filename: &str) -> Result<CardFile> {
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let card_file: CardFile = serde_json::from_str(&contents)?;
    Ok(card_file)
}
