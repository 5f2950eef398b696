// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod activity;
pub mod bitmap;
pub mod character;

pub use account::Account;
pub use activity::Activity;
pub use bitmap::{ActivityBitmap, BitmapError, BITMAP_LEN, MINUTES_PER_DAY};
pub use character::{Character, CharacterKey, CharacterProfile, Profession};
