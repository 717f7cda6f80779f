// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering of run results.

use std::time::Duration;

use crate::case::Status;
use crate::registry::Counts;

pub(crate) fn glyph(status: Status) -> &'static str {
    match status {
        Status::Pass => ":)",
        Status::Fail => ":(",
        Status::Skip => ":/",
    }
}

/// Milliseconds below one second, whole seconds at or above.
pub(crate) fn format_duration(elapsed: Duration) -> String {
    let ms = elapsed.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{}ms", ms.round() as u64)
    } else {
        format!("{}s", (ms / 1000.0).round() as u64)
    }
}

/// Summary line listing only the nonzero counters, plus elapsed time.
pub(crate) fn summary_line(counts: Counts, elapsed: Duration) -> String {
    let mut line = String::from(" ");
    if counts.passed > 0 {
        line.push_str(&format!(" {} passing", counts.passed));
    }
    if counts.failed > 0 {
        line.push_str(&format!(" {} failing", counts.failed));
    }
    if counts.skipped > 0 {
        line.push_str(&format!(" {} skipped", counts.skipped));
    }
    line.push_str(&format!(" ({})", format_duration(elapsed)));
    line
}
