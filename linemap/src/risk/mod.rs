//! Crossing hazard risk scoring.
//!
//! A pure function of one record plus the current crossing set. Three inputs
//! are normalized to `[0, 1]` and blended with fixed weights:
//!
//! | input       | source                                            | weight |
//! |-------------|---------------------------------------------------|--------|
//! | span        | `(span − 80) / 370`, span from a [`SpanSource`]   | 0.40   |
//! | corrosion   | severity tier plus a degradation status bonus     | 0.35   |
//! | proximity   | `1 / (1 + k·d²)` to the nearest crossing          | 0.25   |
//!
//! The composite is clamped to `[0, 1]` and monotonically non-decreasing in
//! each input.

mod span;

pub use span::{
    fnv1a_32, SpanSource, SurveyedSpan, SyntheticSpan, MAX_SPAN_M, MIN_SPAN_M,
    SPAN_LENGTH_PROPERTY,
};

use serde::Serialize;

use crate::feature::{FeatureRecord, Severity, Status};
use crate::geometry::{nearest_squared_distance, CrossingPoint};

/// Composite weight of the normalized span.
pub const SPAN_WEIGHT: f64 = 0.4;
/// Composite weight of the corrosion index.
pub const CORROSION_WEIGHT: f64 = 0.35;
/// Composite weight of the crossing proximity factor.
pub const PROXIMITY_WEIGHT: f64 = 0.25;

/// Default proximity falloff; a crossing 0.01° away scores 0.5.
pub const DEFAULT_PROXIMITY_K: f64 = 10_000.0;

/// Risk inputs and score for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub record_id: String,
    /// Metres
    pub span_length: f64,
    pub corrosion_index: f64,
    pub crossing_proximity_factor: f64,
    pub composite_score: f64,
}

/// Corrosion base by severity tier.
pub fn severity_base(severity: Severity) -> f64 {
    match severity {
        Severity::High => 1.0,
        Severity::Medium => 0.55,
        Severity::Low => 0.25,
    }
}

/// Corrosion bonus by status.
pub fn status_bonus(status: &Status) -> f64 {
    match status {
        Status::Critical => 0.35,
        Status::Pending => 0.25,
        Status::Alert => 0.2,
        _ => 0.05,
    }
}

/// Corrosion index in `[0, 1]`.
pub fn corrosion_index(severity: Severity, status: &Status) -> f64 {
    (severity_base(severity) + status_bonus(status)).clamp(0.0, 1.0)
}

/// Span normalized from `[80, 450]` m to `[0, 1]`.
pub fn normalize_span(span_m: f64) -> f64 {
    ((span_m - MIN_SPAN_M) / (MAX_SPAN_M - MIN_SPAN_M)).clamp(0.0, 1.0)
}

/// `1 / (1 + k·d²)`, or 0 when there is no crossing at all.
pub fn proximity_factor(k: f64, nearest_squared: Option<f64>) -> f64 {
    match nearest_squared {
        Some(d2) => (1.0 / (1.0 + k * d2)).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Weighted blend of the three normalized inputs, clamped to `[0, 1]`.
pub fn composite_score(span_norm: f64, corrosion: f64, proximity: f64) -> f64 {
    (SPAN_WEIGHT * span_norm + CORROSION_WEIGHT * corrosion + PROXIMITY_WEIGHT * proximity)
        .clamp(0.0, 1.0)
}

/// Scores records against a crossing set.
#[derive(Debug, Clone)]
pub struct RiskModel<S = SurveyedSpan> {
    span_source: S,
    proximity_k: f64,
}

impl Default for RiskModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskModel {
    /// Model using surveyed spans with the synthetic fallback.
    pub fn new() -> Self {
        Self {
            span_source: SurveyedSpan::default(),
            proximity_k: DEFAULT_PROXIMITY_K,
        }
    }
}

impl<S: SpanSource> RiskModel<S> {
    /// Replace the span source.
    pub fn with_span_source<T: SpanSource>(self, span_source: T) -> RiskModel<T> {
        RiskModel {
            span_source,
            proximity_k: self.proximity_k,
        }
    }

    /// Set the proximity falloff constant. Non-positive values are ignored.
    pub fn with_proximity_k(mut self, k: f64) -> Self {
        if k.is_finite() && k > 0.0 {
            self.proximity_k = k;
        }
        self
    }

    pub fn proximity_k(&self) -> f64 {
        self.proximity_k
    }

    /// Assess one record.
    pub fn assess(&self, record: &FeatureRecord, crossings: &[CrossingPoint]) -> RiskAssessment {
        let span_length = self.span_source.span_length(record);
        let corrosion = corrosion_index(record.severity, &record.status);
        let nearest = record
            .anchor()
            .and_then(|anchor| nearest_squared_distance(anchor, crossings));
        let proximity = proximity_factor(self.proximity_k, nearest);

        RiskAssessment {
            record_id: record.id.clone(),
            span_length,
            corrosion_index: corrosion,
            crossing_proximity_factor: proximity,
            composite_score: composite_score(normalize_span(span_length), corrosion, proximity),
        }
    }

    /// Assess every record, highest composite first; ties by id.
    pub fn rank<'a, I>(&self, records: I, crossings: &[CrossingPoint]) -> Vec<RiskAssessment>
    where
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let mut ranked: Vec<RiskAssessment> = records
            .into_iter()
            .map(|record| self.assess(record, crossings))
            .collect();
        ranked.sort_by(|a, b| {
            b.composite_score
                .total_cmp(&a.composite_score)
                .then_with(|| a.record_id.cmp(&b.record_id))
        });
        ranked
    }
}

/// Span length at the 90th percentile (nearest-rank, floored index).
///
/// Records at or above it are flagged for attention. Empty input gives 0.
pub fn attention_threshold(assessments: &[RiskAssessment]) -> f64 {
    if assessments.is_empty() {
        return 0.0;
    }
    let mut spans: Vec<f64> = assessments.iter().map(|a| a.span_length).collect();
    spans.sort_by(f64::total_cmp);
    let index = (0.9 * (spans.len() - 1) as f64).floor() as usize;
    spans[index]
}
