// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily ranking of characters by time online.

use crate::db::Db;
use crate::error::Result;
use crate::models::{Activity, Character};
use crate::services::intervals::format_duration;
use chrono::NaiveDate;
use serde::Serialize;

/// Number of characters in the ranking.
pub const RANKING_SIZE: usize = 5;

/// One ranked character.
#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub character: Character,
    pub activity: Activity,
    pub total_minutes: u32,
    pub duration: String,
}

/// Top characters for a day.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    /// Day ranked; `None` when there is no activity at all
    pub date: Option<NaiveDate>,
    pub entries: Vec<RankingEntry>,
}

/// Builds the daily top list.
pub struct RankingAggregator {
    db: Db,
}

impl RankingAggregator {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Rank characters for `date`, or for the latest day with any activity.
    pub async fn top_characters(&self, date: Option<NaiveDate>) -> Result<Ranking> {
        let date = match date {
            Some(date) => Some(date),
            None => self.db.latest_activity_date().await?,
        };
        let Some(day) = date else {
            return Ok(Ranking {
                date: None,
                entries: Vec::new(),
            });
        };

        let activities = self.db.get_activities_on(day).await?;
        let candidates = activities.len();
        let top = rank_activities(activities, RANKING_SIZE);

        let mut entries = Vec::with_capacity(top.len());
        for activity in top {
            let key = activity.character_key();
            let character = match self.db.get_character(&key).await? {
                Some(character) => character,
                None => {
                    tracing::warn!(character = %key.doc_id(), "Activity without character record");
                    Character::new(&key)
                }
            };
            let total_minutes = activity.total_minutes();
            entries.push(RankingEntry {
                character,
                activity,
                total_minutes,
                duration: format_duration(total_minutes),
            });
        }

        tracing::debug!(%day, candidates, ranked = entries.len(), "Built ranking");

        Ok(Ranking {
            date: Some(day),
            entries,
        })
    }
}

/// Keep the `limit` most active records, most minutes first.
///
/// The sort is stable: equal totals keep their retrieval order.
pub fn rank_activities(mut activities: Vec<Activity>, limit: usize) -> Vec<Activity> {
    activities.sort_by_key(|a| std::cmp::Reverse(a.total_minutes()));
    activities.truncate(limit);
    activities
}
