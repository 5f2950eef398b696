// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-account daily report: every character of an account with its
//! activity on one day.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{Activity, Character};
use crate::services::intervals::ActivitySummary;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which day to report when the requested one has no activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFallback {
    First,
    #[default]
    Last,
}

/// One character's row in the report.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterDay {
    pub character: Character,
    pub nick: String,
    pub level: String,
    /// `None` when the character was not seen that day
    pub summary: Option<ActivitySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub account_id: u64,
    pub requested_date: NaiveDate,
    /// Day actually reported (`None` when the account has no activity)
    pub date: Option<NaiveDate>,
    pub characters: Vec<CharacterDay>,
    /// Every day with activity, oldest first
    pub all_dates: Vec<NaiveDate>,
}

/// Builds account reports.
pub struct AccountReporter {
    db: Db,
    plot_width: f64,
}

impl AccountReporter {
    pub fn new(db: Db, plot_width: f64) -> Self {
        Self { db, plot_width }
    }

    pub async fn account_day(
        &self,
        account_id: u64,
        requested_date: NaiveDate,
        fallback: DateFallback,
    ) -> Result<AccountReport> {
        if self.db.get_account(account_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Account {} not found",
                account_id
            )));
        }

        let characters = self.db.get_characters_for_account(account_id).await?;
        let activities = self.db.get_activities_for_account(account_id).await?;

        let all_dates = distinct_dates(&activities);
        let date = resolve_date(&all_dates, requested_date, fallback);

        let characters = characters
            .into_iter()
            .map(|character| {
                let summary = date
                    .and_then(|day| find_activity(&activities, &character, day))
                    .map(|activity| ActivitySummary::from_bitmap(&activity.bitmap, self.plot_width));
                CharacterDay {
                    nick: character.nick_or_placeholder().to_string(),
                    level: character.level_label(),
                    character,
                    summary,
                }
            })
            .collect();

        Ok(AccountReport {
            account_id,
            requested_date,
            date,
            characters,
            all_dates,
        })
    }
}

fn distinct_dates(activities: &[Activity]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = activities.iter().map(|a| a.date).collect();
    dates.sort();
    dates.dedup();
    dates
}

/// The requested day if it has data, else the first or last day with data.
fn resolve_date(
    all_dates: &[NaiveDate],
    requested: NaiveDate,
    fallback: DateFallback,
) -> Option<NaiveDate> {
    if all_dates.contains(&requested) {
        return Some(requested);
    }
    match fallback {
        DateFallback::First => all_dates.first().copied(),
        DateFallback::Last => all_dates.last().copied(),
    }
}

fn find_activity<'a>(
    activities: &'a [Activity],
    character: &Character,
    date: NaiveDate,
) -> Option<&'a Activity> {
    activities.iter().find(|a| {
        a.date == date && a.character_id == character.character_id && a.world == character.world
    })
}
