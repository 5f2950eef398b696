// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The polling loop.
//!
//! Each tick does one of two things:
//! 1. On the first tick of a new minute: fetch the "who's online" page and
//!    stamp that minute into the bitmap of every character listed.
//! 2. Otherwise: fetch the profile of one character that has no profile data
//!    yet and store it.
//!
//! The online page itself refreshes once a minute, so scanning more often is
//! wasted work; the rest of the minute is spent on profiles, one per tick.

use crate::config::Config;
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Character, CharacterKey};
use crate::services::parse::{parse_online_feed, parse_profile};
use crate::services::site::SiteClient;
use crate::time_utils::{minute_of_day, truncate_to_minute};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::ops::Range;
use std::time::Duration;
use tokio::sync::watch;

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Online page ingested.
    Scanned {
        minute_of_day: usize,
        /// Profile links found, duplicates included
        observed: usize,
        /// Distinct characters stamped
        stamped: usize,
        /// Characters whose write failed
        failed: usize,
    },
    /// One character's profile stored.
    Enriched(Character),
    /// Nobody is waiting for a profile.
    NothingToEnrich,
}

/// Loop state carried between ticks.
#[derive(Debug, Default)]
pub struct SamplerState {
    /// Minute of the last scan tick
    pub last_sampled_minute: Option<NaiveDateTime>,
    /// Characters whose profile could not be fetched or parsed today
    skipped: HashSet<CharacterKey>,
    skipped_day: Option<NaiveDate>,
}

impl SamplerState {
    /// Whether enrichment is skipping `key` for the rest of the day.
    pub fn is_skipped(&self, key: &CharacterKey) -> bool {
        self.skipped.contains(key)
    }
}

/// Sampling loop over the game site.
pub struct Sampler {
    db: Db,
    site: SiteClient,
    feed_blocks: Range<usize>,
    tick_interval: Duration,
    state: SamplerState,
}

impl Sampler {
    pub fn new(
        db: Db,
        site: SiteClient,
        feed_blocks: Range<usize>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            db,
            site,
            feed_blocks,
            tick_interval,
            state: SamplerState::default(),
        }
    }

    /// Build a sampler from application config.
    pub fn from_config(db: Db, config: &Config) -> anyhow::Result<Self> {
        let site = SiteClient::new(&config.site_base_url, config.http_timeout)?;
        Ok(Self::new(
            db,
            site,
            config.feed_blocks.clone(),
            config.tick_interval,
        ))
    }

    pub fn state(&self) -> &SamplerState {
        &self.state
    }

    /// Run until `shutdown` flips to `true` (or its sender is dropped).
    ///
    /// Tick failures are logged and the loop carries on.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            site = %self.site.online_url(),
            interval_ms = self.tick_interval.as_millis() as u64,
            "Sampler started"
        );

        loop {
            let now = chrono::Local::now().naive_local();
            match self.tick(now).await {
                Ok(TickOutcome::Enriched(character)) => {
                    tracing::debug!(character = %character, "Enrichment tick")
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "Sampler tick failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Sampler stopped");
    }

    /// Run one tick as of wall-clock time `now`.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Result<TickOutcome> {
        let minute = truncate_to_minute(now);
        if self.state.last_sampled_minute != Some(minute) {
            // Recorded before fetching: a failed scan is not retried this minute.
            self.state.last_sampled_minute = Some(minute);
            self.scan(minute).await
        } else {
            self.enrich(minute.date()).await
        }
    }

    /// Ingest the online page for `minute`.
    async fn scan(&self, minute: NaiveDateTime) -> Result<TickOutcome> {
        let minute_of_day = minute_of_day(minute);
        let date = minute.date();

        let html = self.site.fetch_online_page().await?;
        let sightings = parse_online_feed(&html, self.feed_blocks.clone());
        let observed = sightings.len();

        let mut seen = HashSet::new();
        let mut stamped = 0;
        let mut failed = 0;
        for key in sightings {
            if !seen.insert(key.clone()) {
                continue;
            }
            match self.record_sighting(&key, date, minute_of_day).await {
                Ok(()) => stamped += 1,
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        character = %key.doc_id(),
                        error = %err,
                        "Failed to record sighting"
                    );
                }
            }
        }

        tracing::info!(minute_of_day, observed, stamped, failed, "Sampled online players");

        Ok(TickOutcome::Scanned {
            minute_of_day,
            observed,
            stamped,
            failed,
        })
    }

    async fn record_sighting(
        &self,
        key: &CharacterKey,
        date: NaiveDate,
        minute_of_day: usize,
    ) -> Result<()> {
        self.db.upsert_account(key.account_id).await?;
        self.db.upsert_character(key).await?;
        self.db.stamp_minute(key, date, minute_of_day).await?;
        Ok(())
    }

    /// Fill in the profile of one character.
    async fn enrich(&mut self, today: NaiveDate) -> Result<TickOutcome> {
        if self.state.skipped_day != Some(today) {
            self.state.skipped.clear();
            self.state.skipped_day = Some(today);
        }

        let Some(key) = self.next_enrichment_candidate().await? else {
            return Ok(TickOutcome::NothingToEnrich);
        };

        // Any failure is final for today; the client has already retried.
        let fetched = self
            .site
            .fetch_profile_page(&key)
            .await
            .map_err(AppError::from)
            .and_then(|html| parse_profile(&html, key.character_id).map_err(AppError::from));
        let profile = match fetched {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(
                    character = %key.doc_id(),
                    error = %err,
                    "Profile unavailable, skipping character until tomorrow"
                );
                self.state.skipped.insert(key);
                return Err(err);
            }
        };

        let character = self.db.update_character_profile(&key, &profile).await?;
        tracing::info!(
            character = %character.doc_id(),
            nick = %character.nick,
            level = profile.level,
            "Stored character profile"
        );

        Ok(TickOutcome::Enriched(character))
    }

    /// First character (in identity order) without a profile that has not
    /// been skipped today.
    async fn next_enrichment_candidate(&self) -> Result<Option<CharacterKey>> {
        // Skipped characters still match the query, so ask for one more than
        // the number skipped to be sure to see a fresh candidate.
        let limit = u32::try_from(self.state.skipped.len() + 1).unwrap_or(u32::MAX);
        let candidates = self.db.characters_missing_profile(limit).await?;

        Ok(candidates
            .into_iter()
            .map(|c| c.key())
            .find(|key| !self.state.skipped.contains(key)))
    }
}
