// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store with the same operations as the Firestore client.
//!
//! Used by tests and local runs. Nothing is persisted.

use crate::error::AppError;
use crate::models::{
    Account, Activity, BitmapError, Character, CharacterKey, CharacterProfile, MINUTES_PER_DAY,
};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    accounts: DashMap<u64, Account>,
    characters: DashMap<CharacterKey, Character>,
    activities: DashMap<(CharacterKey, NaiveDate), Activity>,
}

/// In-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Account Operations ──────────────────────────────────────

    pub async fn get_account(&self, account_id: u64) -> Result<Option<Account>, AppError> {
        Ok(self
            .tables
            .accounts
            .get(&account_id)
            .map(|a| a.value().clone()))
    }

    pub async fn upsert_account(&self, account_id: u64) -> Result<Account, AppError> {
        Ok(self
            .tables
            .accounts
            .entry(account_id)
            .or_insert_with(|| Account::new(account_id))
            .value()
            .clone())
    }

    // ─── Character Operations ────────────────────────────────────

    pub async fn get_character(&self, key: &CharacterKey) -> Result<Option<Character>, AppError> {
        Ok(self.tables.characters.get(key).map(|c| c.value().clone()))
    }

    pub async fn upsert_character(&self, key: &CharacterKey) -> Result<Character, AppError> {
        Ok(self
            .tables
            .characters
            .entry(key.clone())
            .or_insert_with(|| Character::new(key))
            .value()
            .clone())
    }

    pub async fn update_character_profile(
        &self,
        key: &CharacterKey,
        profile: &CharacterProfile,
    ) -> Result<Character, AppError> {
        let mut character = self
            .tables
            .characters
            .get_mut(key)
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", key.doc_id())))?;
        character.apply_profile(profile);
        Ok(character.value().clone())
    }

    pub async fn characters_missing_profile(
        &self,
        limit: u32,
    ) -> Result<Vec<Character>, AppError> {
        let mut missing: Vec<Character> = self
            .tables
            .characters
            .iter()
            .filter(|c| c.needs_profile())
            .map(|c| c.value().clone())
            .collect();
        missing.sort_by(|a, b| a.key().cmp(&b.key()));
        missing.truncate(limit as usize);
        Ok(missing)
    }

    pub async fn get_characters_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Character>, AppError> {
        let mut characters: Vec<Character> = self
            .tables
            .characters
            .iter()
            .filter(|c| c.account_id == account_id)
            .map(|c| c.value().clone())
            .collect();
        characters.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(characters)
    }

    // ─── Activity Operations ─────────────────────────────────────

    pub async fn stamp_minute(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
        minute: usize,
    ) -> Result<Activity, AppError> {
        if minute >= MINUTES_PER_DAY {
            return Err(BitmapError::InvalidMinute(minute).into());
        }

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut activity = self
            .tables
            .activities
            .entry((key.clone(), date))
            .or_insert_with(|| Activity::new(key, date));
        activity.bitmap.set_minute(minute)?;
        Ok(activity.value().clone())
    }

    pub async fn get_activity(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
    ) -> Result<Option<Activity>, AppError> {
        Ok(self
            .tables
            .activities
            .get(&(key.clone(), date))
            .map(|a| a.value().clone()))
    }

    pub async fn get_activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>, AppError> {
        let mut activities: Vec<Activity> = self
            .tables
            .activities
            .iter()
            .filter(|a| a.date == date)
            .map(|a| a.value().clone())
            .collect();
        activities.sort_by(|a, b| a.character_key().cmp(&b.character_key()));
        Ok(activities)
    }

    pub async fn get_activities_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Activity>, AppError> {
        let mut activities: Vec<Activity> = self
            .tables
            .activities
            .iter()
            .filter(|a| a.account_id == account_id)
            .map(|a| a.value().clone())
            .collect();
        activities.sort_by(|a, b| {
            (a.date, a.character_id, &a.world).cmp(&(b.date, b.character_id, &b.world))
        });
        Ok(activities)
    }

    pub async fn latest_activity_date(&self) -> Result<Option<NaiveDate>, AppError> {
        Ok(self.tables.activities.iter().map(|a| a.date).max())
    }
}
