// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (created on first sighting)
//! - Characters (created on first sighting, enriched from profile pages)
//! - Activities (one bitmap document per character and day)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Account, Activity, BitmapError, Character, CharacterKey, CharacterProfile, MINUTES_PER_DAY,
};
use chrono::NaiveDate;
use firestore::FirestoreQueryDirection::{Ascending, Descending};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Get an account by its game account ID.
    pub async fn get_account(&self, account_id: u64) -> Result<Option<Account>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNTS)
            .obj()
            .one(&account_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get or create an account.
    ///
    /// Existing accounts are not rewritten.
    pub async fn upsert_account(&self, account_id: u64) -> Result<Account, AppError> {
        if let Some(existing) = self.get_account(account_id).await? {
            return Ok(existing);
        }

        let account = Account::new(account_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACCOUNTS)
            .document_id(account.doc_id())
            .object(&account)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        tracing::debug!(account_id, "Created account");
        Ok(account)
    }

    // ─── Character Operations ────────────────────────────────────

    /// Get a character by identity.
    pub async fn get_character(&self, key: &CharacterKey) -> Result<Option<Character>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHARACTERS)
            .obj()
            .one(&key.doc_id())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get or create a character.
    ///
    /// Existing characters are returned untouched so profile data survives.
    pub async fn upsert_character(&self, key: &CharacterKey) -> Result<Character, AppError> {
        if let Some(existing) = self.get_character(key).await? {
            return Ok(existing);
        }

        let character = Character::new(key);
        self.set_character(&character).await?;
        tracing::debug!(character = %character.doc_id(), "Created character");
        Ok(character)
    }

    /// Write scraped profile data onto an existing character.
    pub async fn update_character_profile(
        &self,
        key: &CharacterKey,
        profile: &CharacterProfile,
    ) -> Result<Character, AppError> {
        let mut character = self
            .get_character(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Character {} not found", key.doc_id())))?;

        character.apply_profile(profile);
        self.set_character(&character).await?;
        Ok(character)
    }

    /// Characters without profile data, in identity order.
    pub async fn characters_missing_profile(
        &self,
        limit: u32,
    ) -> Result<Vec<Character>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHARACTERS)
            .filter(|q| q.field("level").is_null())
            .order_by([
                ("account_id", Ascending),
                ("character_id", Ascending),
                ("world", Ascending),
            ])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All characters of an account.
    pub async fn get_characters_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Character>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHARACTERS)
            .filter(move |q| q.field("account_id").eq(account_id))
            .order_by([("character_id", Ascending), ("world", Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_character(&self, character: &Character) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CHARACTERS)
            .document_id(character.doc_id())
            .object(character)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// OR one minute into a character's activity for a day.
    ///
    /// The read happens outside the transaction and only the write is
    /// committed through it, so this is not safe against concurrent writers.
    /// It relies on the sampler being the only writer of activity documents.
    /// A missing document is created zeroed first.
    pub async fn stamp_minute(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
        minute: usize,
    ) -> Result<Activity, AppError> {
        if minute >= MINUTES_PER_DAY {
            return Err(BitmapError::InvalidMinute(minute).into());
        }

        let client = self.get_client()?;
        let doc_id = Activity::doc_id_for(key, date);

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read the current bitmap (if any)
        let existing: Option<Activity> = client
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read activity in transaction: {}", e))
            })?;

        // 2. Set the bit in memory
        let mut activity = existing.unwrap_or_else(|| Activity::new(key, date));
        activity.bitmap.set_minute(minute)?;

        // 3. Write back and commit
        client
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&doc_id)
            .object(&activity)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add activity to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(activity)
    }

    /// Get one character's activity for a day.
    pub async fn get_activity(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
    ) -> Result<Option<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&Activity::doc_id_for(key, date))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All activities on a day.
    pub async fn get_activities_on(&self, date: NaiveDate) -> Result<Vec<Activity>, AppError> {
        let date = date.format("%Y-%m-%d").to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| q.field("date").eq(date.clone()))
            .order_by([
                ("account_id", Ascending),
                ("character_id", Ascending),
                ("world", Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All activities of an account, oldest first.
    pub async fn get_activities_for_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| q.field("account_id").eq(account_id))
            .order_by([
                ("date", Ascending),
                ("character_id", Ascending),
                ("world", Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent date with any activity.
    pub async fn latest_activity_date(&self) -> Result<Option<NaiveDate>, AppError> {
        let latest: Vec<Activity> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .order_by([("date", Descending)])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(latest.first().map(|a| a.date))
    }
}
