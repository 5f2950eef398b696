// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for minute-of-day arithmetic.

use chrono::{NaiveDateTime, Timelike};

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Minutes since midnight (0..1440).
pub fn minute_of_day(time: NaiveDateTime) -> usize {
    (time.hour() * 60 + time.minute()) as usize
}
