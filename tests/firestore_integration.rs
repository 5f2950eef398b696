// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST` set); they are skipped otherwise.

use chrono::NaiveDate;
use meno_stats::models::{CharacterKey, CharacterProfile, Profession};

mod common;
use common::test_db;

/// Generate a unique account ID for test isolation.
fn unique_account_id() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 12, d).unwrap()
}

#[tokio::test]
async fn test_account_upsert_is_idempotent() {
    require_emulator!();

    let db = test_db().await;
    let account_id = unique_account_id();

    assert!(db.get_account(account_id).await.unwrap().is_none());
    let created = db.upsert_account(account_id).await.unwrap();
    let again = db.upsert_account(account_id).await.unwrap();
    assert_eq!(created, again);

    let account = db.get_account(account_id).await.unwrap().unwrap();
    assert_eq!(account.account_id, account_id);
}

#[tokio::test]
async fn test_character_profile_update() {
    require_emulator!();

    let db = test_db().await;
    let key = CharacterKey::new(unique_account_id(), 3, "nerthus");

    let created = db.upsert_character(&key).await.unwrap();
    assert!(created.needs_profile());

    let profile = CharacterProfile {
        nick: "Zażółć".to_string(),
        level: 120,
        profession: Profession::Paladin,
        avatar_url: Some("/obrazki/postacie/p/pal.gif".to_string()),
    };
    db.update_character_profile(&key, &profile).await.unwrap();

    // A later sighting must not wipe the profile
    db.upsert_character(&key).await.unwrap();

    let stored = db.get_character(&key).await.unwrap().unwrap();
    assert_eq!(stored.nick, "Zażółć");
    assert_eq!(stored.level, Some(120));
    assert_eq!(stored.profession, Profession::Paladin);
}

#[tokio::test]
async fn test_stamp_minute_accumulates() {
    require_emulator!();

    let db = test_db().await;
    let account_id = unique_account_id();
    let key = CharacterKey::new(account_id, 1, "tarhuna");

    db.stamp_minute(&key, day(28), 0).await.unwrap();
    db.stamp_minute(&key, day(28), 1439).await.unwrap();
    db.stamp_minute(&key, day(28), 0).await.unwrap();
    db.stamp_minute(&key, day(27), 5).await.unwrap();

    let activity = db.get_activity(&key, day(28)).await.unwrap().unwrap();
    assert_eq!(activity.total_minutes(), 2);
    assert!(activity.bitmap.is_set(0).unwrap());
    assert!(activity.bitmap.is_set(1439).unwrap());

    let all = db.get_activities_for_account(account_id).await.unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|a| a.date).collect();
    assert_eq!(dates, vec![day(27), day(28)]);
}

#[tokio::test]
async fn test_stamp_minute_rejects_out_of_range() {
    require_emulator!();

    let db = test_db().await;
    let key = CharacterKey::new(unique_account_id(), 1, "tarhuna");

    assert!(db.stamp_minute(&key, day(28), 1440).await.is_err());
    assert!(db.get_activity(&key, day(28)).await.unwrap().is_none());
}
