//! Database layer.
//!
//! Two backends with the same operations: Firestore for production and an
//! in-process store for tests and local runs. Document IDs are derived from
//! record identity so every upsert is idempotent.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Account, Activity, Character, CharacterKey, CharacterProfile};
use chrono::NaiveDate;

/// Collection names as constants.
pub mod collections {
    pub const ACCOUNTS: &str = "accounts";
    pub const CHARACTERS: &str = "characters";
    /// Daily activity bitmaps (keyed by character and date)
    pub const ACTIVITIES: &str = "activities";
}

/// Store handle used by the sampler and the read services.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    /// Get an account by ID.
    pub async fn get_account(&self, account_id: u64) -> Result<Option<Account>, AppError> {
        match self {
            Db::Firestore(db) => db.get_account(account_id).await,
            Db::Memory(db) => db.get_account(account_id).await,
        }
    }

    /// Get or create an account.
    pub async fn upsert_account(&self, account_id: u64) -> Result<Account, AppError> {
        match self {
            Db::Firestore(db) => db.upsert_account(account_id).await,
            Db::Memory(db) => db.upsert_account(account_id).await,
        }
    }

    /// Get a character by identity.
    pub async fn get_character(&self, key: &CharacterKey) -> Result<Option<Character>, AppError> {
        match self {
            Db::Firestore(db) => db.get_character(key).await,
            Db::Memory(db) => db.get_character(key).await,
        }
    }

    /// Get or create a character (new characters have no profile data).
    pub async fn upsert_character(&self, key: &CharacterKey) -> Result<Character, AppError> {
        match self {
            Db::Firestore(db) => db.upsert_character(key).await,
            Db::Memory(db) => db.upsert_character(key).await,
        }
    }

    /// Write scraped profile data onto an existing character.
    pub async fn update_character_profile(
        &self,
        key: &CharacterKey,
        profile: &CharacterProfile,
    ) -> Result<Character, AppError> {
        match self {
            Db::Firestore(db) => db.update_character_profile(key, profile).await,
            Db::Memory(db) => db.update_character_profile(key, profile).await,
        }
    }

    /// Characters without profile data, ordered by (account, character, world).
    pub async fn characters_missing_profile(
        &self,
        limit: u32,
    ) -> Result<Vec<Character>, AppError> {
        match self {
            Db::Firestore(db) => db.characters_missing_profile(limit).await,
            Db::Memory(db) => db.characters_missing_profile(limit).await,
        }
    }

    /// All characters of an account, ordered by (character, world).
    pub async fn get_characters_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Character>, AppError> {
        match self {
            Db::Firestore(db) => db.get_characters_for_account(account_id).await,
            Db::Memory(db) => db.get_characters_for_account(account_id).await,
        }
    }

    /// Mark `minute` as online in a character's activity for `date`,
    /// creating the day's record if needed. Returns the updated record.
    pub async fn stamp_minute(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
        minute: usize,
    ) -> Result<Activity, AppError> {
        match self {
            Db::Firestore(db) => db.stamp_minute(key, date, minute).await,
            Db::Memory(db) => db.stamp_minute(key, date, minute).await,
        }
    }

    /// Get one character's activity for a day.
    pub async fn get_activity(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
    ) -> Result<Option<Activity>, AppError> {
        match self {
            Db::Firestore(db) => db.get_activity(key, date).await,
            Db::Memory(db) => db.get_activity(key, date).await,
        }
    }

    /// All activities on a day, ordered by (account, character, world).
    pub async fn get_activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>, AppError> {
        match self {
            Db::Firestore(db) => db.get_activities_on(date).await,
            Db::Memory(db) => db.get_activities_on(date).await,
        }
    }

    /// All activities of an account, ordered by (date, character, world).
    pub async fn get_activities_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Activity>, AppError> {
        match self {
            Db::Firestore(db) => db.get_activities_for_account(account_id).await,
            Db::Memory(db) => db.get_activities_for_account(account_id).await,
        }
    }

    /// Most recent date with any activity.
    pub async fn latest_activity_date(&self) -> Result<Option<NaiveDate>, AppError> {
        match self {
            Db::Firestore(db) => db.latest_activity_date().await,
            Db::Memory(db) => db.latest_activity_date().await,
        }
    }
}

impl From<FirestoreDb> for Db {
    fn from(db: FirestoreDb) -> Self {
        Db::Firestore(db)
    }
}

impl From<MemoryDb> for Db {
    fn from(db: MemoryDb) -> Self {
        Db::Memory(db)
    }
}
