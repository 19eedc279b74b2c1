//! Generation pipeline constants, request validation, and AI metadata.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Progress milestones
// ---------------------------------------------------------------------------
//
// Progress is monotonically non-decreasing while a generation is
// processing; each stage writes its milestone after its result is durable.

/// Commits fetched from the source-control host.
pub const PROGRESS_FETCHED: i16 = 10;
/// Per-commit analyses stored.
pub const PROGRESS_ANALYZED: i16 = 40;
/// Changelog synthesized and parsed.
pub const PROGRESS_SYNTHESIZED: i16 = 80;
/// Metadata reconciled against the analysis recount.
pub const PROGRESS_RECONCILED: i16 = 95;
/// Terminal: content persisted.
pub const PROGRESS_DONE: i16 = 100;

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

/// Parse a request date bound. Accepts RFC 3339 timestamps
/// (`2025-01-07T12:00:00Z`) and bare dates (`2025-01-07`, midnight UTC).
pub fn parse_date_bound(raw: &str) -> Result<Timestamp, CoreError> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&chrono::Utc));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        return Ok(midnight.and_utc());
    }
    Err(CoreError::Validation(format!(
        "'{raw}' is not a valid date; expected RFC 3339 or YYYY-MM-DD"
    )))
}

/// Validate that a commit range is well-formed: start must not be after end.
pub fn validate_date_range(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::Validation(
            "start_date must be on or before end_date".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// AI metadata
// ---------------------------------------------------------------------------

/// Bookkeeping about the model calls that produced a completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiMetadata {
    /// Model name reported by the language-model API.
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Mean confidence over the stored commit analyses.
    pub confidence: f64,
    /// Wall-clock pipeline duration in milliseconds.
    pub processing_ms: u64,
}

/// Mean confidence over a set of analyses; 0.0 when empty.
pub fn mean_confidence(analyses: &[crate::analysis::CommitAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    analyses.iter().map(|a| a.confidence).sum::<f64>() / analyses.len() as f64
}
