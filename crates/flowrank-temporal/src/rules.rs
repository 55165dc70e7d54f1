//! Rule-based temporal resolution. Deterministic, no external calls.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, info};

use flowrank_core::{decode_chunks, Chunk, Error, Result};

use crate::types::{constraint_text, FilterOutput, TemporalWindow};

/// Deterministic temporal filter over fixed constraint phrases.
///
/// Recognized patterns, in priority order (case-insensitive substring):
/// "semana passada" (previous calendar week, Monday-based),
/// "últimos 2 meses" (trailing 60 days), "última" (latest group wins).
/// Anything else passes all chunks through unfiltered.
pub struct RuleBasedFilter {
    current_date: NaiveDate,
}

impl RuleBasedFilter {
    /// Current date must be `YYYY-MM-DD`; anything else is a hard error.
    pub fn new(current_date: &str) -> Result<Self> {
        let current_date = NaiveDate::parse_from_str(current_date, "%Y-%m-%d")
            .map_err(|_| Error::InvalidDate(current_date.to_string()))?;
        Ok(Self { current_date })
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    /// Host-facing entry point: decode the chunk envelope and the
    /// constraint input (plain string or wrapped object), then filter.
    pub fn filter_envelope(&self, input: &Value, constraints: &Value) -> FilterOutput {
        let (chunks, warnings) = decode_chunks(input);
        let constraints = constraint_text(constraints);
        let mut output = self.filter(chunks, &constraints);
        output.warnings.extend(warnings);
        output
    }

    /// Apply the constraint to the chunk list. Infallible: unrecognized
    /// constraints pass everything through, which is not an error.
    pub fn filter(&self, chunks: Vec<Chunk>, constraints: &str) -> FilterOutput {
        if chunks.is_empty() {
            return FilterOutput::new(Vec::new(), "no chunks to filter", constraints, "");
        }

        let lowered = constraints.to_lowercase();

        if let Some(window) = self.resolve_window(&lowered) {
            let kept = filter_by_window(&chunks, window);
            info!(
                "Window {} kept {} of {} chunks",
                window,
                kept.len(),
                chunks.len()
            );
            let message = format!(
                "filtered to {} chunks based on temporal constraints",
                kept.len()
            );
            return FilterOutput::new(kept, message, constraints, window.to_string());
        }

        if lowered.contains("última") {
            let kept = latest_group(&chunks);
            info!("Latest-group selection kept {} chunks", kept.len());
            let message = format!(
                "filtered to {} chunks based on temporal constraints",
                kept.len()
            );
            return FilterOutput::new(kept, message, constraints, "latest event");
        }

        debug!("No recognized temporal pattern; passing {} chunks through", chunks.len());
        let message = format!("no temporal pattern recognized; {} chunks passed through", chunks.len());
        FilterOutput::new(chunks, message, constraints, "no explicit range")
    }

    /// Resolve a fixed window for the phrases that define one.
    fn resolve_window(&self, lowered: &str) -> Option<TemporalWindow> {
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).expect("valid midnight");

        if lowered.contains("semana passada") {
            let days_into_week = self.current_date.weekday().num_days_from_monday() as i64;
            let end = self.current_date - Duration::days(days_into_week);
            let start = end - Duration::days(7);
            return Some(TemporalWindow {
                start: midnight(start),
                end: midnight(end),
            });
        }

        if lowered.contains("últimos 2 meses") {
            return Some(TemporalWindow {
                start: midnight(self.current_date - Duration::days(60)),
                end: midnight(self.current_date),
            });
        }

        None
    }
}

/// Group chunks by `group_id`, preserving first-seen order. Chunks
/// without a grouping key are left out.
pub(crate) fn group_chunks(chunks: &[Chunk]) -> Vec<(String, Vec<Chunk>)> {
    let mut groups: Vec<(String, Vec<Chunk>)> = Vec::new();
    for chunk in chunks {
        let Some(group_id) = chunk.group_id() else {
            continue;
        };
        match groups.iter_mut().find(|(id, _)| id.as_str() == group_id) {
            Some((_, members)) => members.push(chunk.clone()),
            None => groups.push((group_id.to_string(), vec![chunk.clone()])),
        }
    }
    groups
}

/// Keep each group entirely if its representative timestamp (first
/// chunk) falls inside the window.
fn filter_by_window(chunks: &[Chunk], window: TemporalWindow) -> Vec<Chunk> {
    let mut kept = Vec::new();
    for (_, members) in group_chunks(chunks) {
        let representative = members[0].updated_timestamp();
        if window.contains(representative) {
            kept.extend(members);
        }
    }
    kept
}

/// Keep only the group whose maximum `updated_at` is globally greatest.
/// Exact ties go to the first group encountered.
fn latest_group(chunks: &[Chunk]) -> Vec<Chunk> {
    let groups = group_chunks(chunks);
    let mut best: Option<(NaiveDateTime, &Vec<Chunk>)> = None;
    for (_, members) in &groups {
        let latest = members
            .iter()
            .map(Chunk::updated_timestamp)
            .max()
            .expect("groups are non-empty");
        // Strictly greater: first group wins exact ties
        match best {
            Some((current, _)) if latest <= current => {}
            _ => best = Some((latest, members)),
        }
    }
    best.map(|(_, members)| members.clone()).unwrap_or_default()
}
