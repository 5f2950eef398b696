// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decoding presence bitmaps into online intervals and plot geometry.

use crate::models::{ActivityBitmap, MINUTES_PER_DAY};
use serde::Serialize;

/// Default plot width in pixels.
pub const DEFAULT_PLOT_WIDTH: f64 = 600.0;
/// Left margin added to every plot offset, in pixels.
pub const PLOT_LEFT_MARGIN: f64 = 10.0;

/// Half-open run of online minutes `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: u16,
    pub end: u16,
}

impl Interval {
    pub fn minutes(&self) -> u16 {
        self.end - self.start
    }
}

/// One online interval scaled to the plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSegment {
    pub left: f64,
    pub width: f64,
}

/// Hour boundary marker on the plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourTick {
    pub left: f64,
    pub label: String,
}

/// Renderer-agnostic day plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPlot {
    pub width: f64,
    pub hour_ticks: Vec<HourTick>,
    pub segments: Vec<PlotSegment>,
}

/// Everything the UI shows for one day of one character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub intervals: Vec<Interval>,
    pub total_minutes: u32,
    pub duration: String,
    pub plot: ActivityPlot,
}

impl ActivitySummary {
    pub fn from_bitmap(bitmap: &ActivityBitmap, plot_width: f64) -> Self {
        let intervals = extract_intervals(bitmap);
        let total_minutes = bitmap.pop_count();
        Self {
            plot: plot_intervals(&intervals, plot_width),
            duration: format_duration(total_minutes),
            intervals,
            total_minutes,
        }
    }
}

/// Maximal runs of set bits, in order.
pub fn extract_intervals(bitmap: &ActivityBitmap) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut start: Option<u16> = None;

    for (minute, bit) in (0u16..).zip(bitmap.bits()) {
        match (bit, start) {
            (true, None) => start = Some(minute),
            (false, Some(s)) => {
                intervals.push(Interval { start: s, end: minute });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        intervals.push(Interval {
            start: s,
            end: MINUTES_PER_DAY as u16,
        });
    }

    intervals
}

/// `"{h} godz. {m} min."`, or `"{m} min."` under an hour.
pub fn format_duration(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{} godz. {} min.", hours, minutes)
    } else {
        format!("{} min.", minutes)
    }
}

/// Scale intervals and hour boundaries to a plot `width` pixels wide.
pub fn plot_intervals(intervals: &[Interval], width: f64) -> ActivityPlot {
    let scale = |minutes: u16| round4(f64::from(minutes) * width / MINUTES_PER_DAY as f64);

    let hour_ticks = (60..MINUTES_PER_DAY as u16)
        .step_by(60)
        .map(|minute| HourTick {
            left: scale(minute) + PLOT_LEFT_MARGIN,
            label: format!("{:02}", minute / 60),
        })
        .collect();

    let segments = intervals
        .iter()
        .map(|interval| PlotSegment {
            left: scale(interval.start) + PLOT_LEFT_MARGIN,
            width: scale(interval.minutes()),
        })
        .collect();

    ActivityPlot {
        width,
        hour_ticks,
        segments,
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_from(minutes: &[usize]) -> ActivityBitmap {
        let mut bitmap = ActivityBitmap::new();
        for &m in minutes {
            bitmap.set_minute(m).unwrap();
        }
        bitmap
    }

    #[test]
    fn test_extract_two_runs() {
        // bits 1,1,1,0,0,1,1
        let bitmap = bitmap_from(&[0, 1, 2, 5, 6]);
        let summary = ActivitySummary::from_bitmap(&bitmap, DEFAULT_PLOT_WIDTH);

        assert_eq!(
            summary.intervals,
            vec![Interval { start: 0, end: 3 }, Interval { start: 5, end: 7 }]
        );
        assert_eq!(summary.total_minutes, 5);
        assert_eq!(summary.duration, "5 min.");
    }

    #[test]
    fn test_run_open_at_end_closes_at_1440() {
        let bitmap = ActivityBitmap::from_bytes(&[0xFF; 180]).unwrap();
        let summary = ActivitySummary::from_bitmap(&bitmap, DEFAULT_PLOT_WIDTH);

        assert_eq!(summary.intervals, vec![Interval { start: 0, end: 1440 }]);
        assert_eq!(summary.total_minutes, 1440);
        assert_eq!(summary.duration, "24 godz. 0 min.");
    }

    #[test]
    fn test_empty_bitmap() {
        let bitmap = ActivityBitmap::new();
        assert!(extract_intervals(&bitmap).is_empty());
        assert_eq!(format_duration(bitmap.pop_count()), "0 min.");
    }

    #[test]
    fn test_interval_lengths_sum_to_pop_count() {
        let patterns: Vec<Vec<usize>> = vec![
            vec![1439],
            vec![0, 2, 4, 6, 8],
            (100..260).chain(700..701).chain(1400..1440).collect(),
            (0..1440).filter(|m| m % 7 != 0).collect(),
        ];

        for minutes in patterns {
            let bitmap = bitmap_from(&minutes);
            let intervals = extract_intervals(&bitmap);
            let sum: u32 = intervals.iter().map(|i| u32::from(i.minutes())).sum();

            assert_eq!(sum, bitmap.pop_count());
            assert!(intervals.iter().all(|i| i.end > i.start));
            assert!(intervals.windows(2).all(|w| w[0].end < w[1].start));
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59), "59 min.");
        assert_eq!(format_duration(60), "1 godz. 0 min.");
        assert_eq!(format_duration(135), "2 godz. 15 min.");
    }

    #[test]
    fn test_plot_geometry() {
        let plot = plot_intervals(&[Interval { start: 60, end: 180 }], 600.0);

        assert_eq!(plot.hour_ticks.len(), 23);
        assert_eq!(plot.hour_ticks[0].left, 35.0);
        assert_eq!(plot.hour_ticks[0].label, "01");
        assert_eq!(plot.hour_ticks[22].label, "23");
        assert_eq!(plot.hour_ticks[22].left, 585.0);

        assert_eq!(
            plot.segments,
            vec![PlotSegment {
                left: 35.0,
                width: 50.0
            }]
        );
    }

    #[test]
    fn test_plot_rounds_to_four_places() {
        // 1 minute at 700px = 0.486111... px
        let plot = plot_intervals(&[Interval { start: 1, end: 2 }], 700.0);
        assert_eq!(plot.segments[0].width, 0.4861);
        assert!((plot.segments[0].left - 10.4861).abs() < 1e-9);
    }
}
