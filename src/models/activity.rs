// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily activity record for one character.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ActivityBitmap, CharacterKey};

/// Stored activity record in Firestore.
///
/// Exactly one record exists per character and calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Owning account ID
    pub account_id: u64,
    /// Character ID within the world
    pub character_id: u64,
    /// World (server) name
    pub world: String,
    /// Calendar day (serialized as `YYYY-MM-DD`, sorts chronologically)
    pub date: NaiveDate,
    /// Minutes observed online
    pub bitmap: ActivityBitmap,
}

impl Activity {
    /// Fresh, all-zero record for a character and day.
    pub fn new(key: &CharacterKey, date: NaiveDate) -> Self {
        Self {
            account_id: key.account_id,
            character_id: key.character_id,
            world: key.world.clone(),
            date,
            bitmap: ActivityBitmap::new(),
        }
    }

    /// Identity of the owning character.
    pub fn character_key(&self) -> CharacterKey {
        CharacterKey::new(self.account_id, self.character_id, &self.world)
    }

    /// Firestore document ID: `{character_doc_id}_{YYYY-MM-DD}`.
    pub fn doc_id(&self) -> String {
        Self::doc_id_for(&self.character_key(), self.date)
    }

    pub fn doc_id_for(key: &CharacterKey, date: NaiveDate) -> String {
        format!("{}_{}", key.doc_id(), date.format("%Y-%m-%d"))
    }

    /// Total minutes observed online.
    pub fn total_minutes(&self) -> u32 {
        self.bitmap.pop_count()
    }
}
