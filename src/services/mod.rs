// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod export;
pub mod intervals;
pub mod parse;
pub mod ranking;
pub mod report;
pub mod sampler;
pub mod site;

pub use export::{ActivityExporter, ExportDocument};
pub use intervals::ActivitySummary;
pub use ranking::{Ranking, RankingAggregator};
pub use report::{AccountReport, AccountReporter, DateFallback};
pub use sampler::{Sampler, TickOutcome};
pub use site::{SiteClient, SiteError};
