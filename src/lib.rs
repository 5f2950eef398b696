// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Meno Stats: minute-by-minute online activity of game characters
//!
//! This crate samples the game's "who's online" page once a minute, keeps a
//! 1440-bit presence bitmap per character and day, and serves rankings,
//! per-account reports and XML exports built from those bitmaps.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
}
