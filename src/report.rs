use std::fmt::Write as _;
use std::time::Duration;

use crate::tracker::CompletedSegment;

/// Aggregate of all completed runs sharing one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSummary {
    pub label: String,
    pub count: usize,
    pub total: Duration,
    pub max: Duration,
}

impl LabelSummary {
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total / n,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.count as f64),
        }
    }
}

/// Group completed segments by label, ordered by first completion.
pub fn summarize(completed: &[CompletedSegment]) -> Vec<LabelSummary> {
    let mut rows: Vec<LabelSummary> = Vec::new();
    for seg in completed {
        match rows.iter_mut().find(|row| row.label == seg.label) {
            Some(row) => {
                row.count += 1;
                row.total += seg.elapsed;
                row.max = row.max.max(seg.elapsed);
            }
            None => rows.push(LabelSummary {
                label: seg.label.clone(),
                count: 1,
                total: seg.elapsed,
                max: seg.elapsed,
            }),
        }
    }
    rows
}

/// Render summaries as an aligned plain-text table with a total line.
pub fn render_table(rows: &[LabelSummary]) -> String {
    let width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once("Segment".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>5}  {:>10}  {:>10}  {:>10}",
        "Segment", "Runs", "Total", "Mean", "Max"
    );
    let _ = writeln!(out, "{}", "-".repeat(width + 43));
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:>5}  {:>10}  {:>10}  {:>10}",
            row.label,
            row.count,
            format_secs(row.total),
            format_secs(row.mean()),
            format_secs(row.max),
        );
    }
    let grand: Duration = rows.iter().map(|r| r.total).sum();
    let _ = writeln!(out, "Total: {}", format_secs(grand));
    out
}

fn format_secs(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.3}s", secs)
    }
}
