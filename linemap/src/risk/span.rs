//! Span length sources.
//!
//! The scoring model only needs a span length per record. Where it comes from
//! is isolated behind [`SpanSource`] so a survey feed can replace the
//! synthetic placeholder without touching the scoring math.

use crate::feature::FeatureRecord;

/// Shortest span the synthetic source produces, in metres.
pub const MIN_SPAN_M: f64 = 80.0;

/// Longest span the synthetic source produces, in metres.
pub const MAX_SPAN_M: f64 = 450.0;

/// Property read by [`SurveyedSpan`].
pub const SPAN_LENGTH_PROPERTY: &str = "span_length";

/// Provides the span length (metres) of a record.
pub trait SpanSource {
    fn span_length(&self, record: &FeatureRecord) -> f64;
}

/// Deterministic placeholder derived from the record identity.
///
/// Hashes `id + name` with 32-bit FNV-1a and derives two fractions from
/// different bit ranges (`h % 1000` and `(h >> 10) % 1000`). Each yields a
/// span in `[80, 450]` m rounded to the metre; the larger one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSpan;

impl SpanSource for SyntheticSpan {
    fn span_length(&self, record: &FeatureRecord) -> f64 {
        let key = format!("{}{}", record.id, record.name().unwrap_or(""));
        let h = fnv1a_32(&key);
        let rand_a = f64::from(h % 1000) / 1000.0;
        let rand_b = f64::from((h >> 10) % 1000) / 1000.0;
        let span = |r: f64| (MIN_SPAN_M + r * (MAX_SPAN_M - MIN_SPAN_M)).round();
        span(rand_a).max(span(rand_b))
    }
}

/// Uses the upstream `span_length` property when present and positive,
/// falling back to another source otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyedSpan<F = SyntheticSpan> {
    fallback: F,
}

impl<F: SpanSource> SurveyedSpan<F> {
    pub fn with_fallback(fallback: F) -> Self {
        Self { fallback }
    }
}

impl<F: SpanSource> SpanSource for SurveyedSpan<F> {
    fn span_length(&self, record: &FeatureRecord) -> f64 {
        match record.property_f64(SPAN_LENGTH_PROPERTY) {
            Some(span) if span.is_finite() && span > 0.0 => span,
            _ => self.fallback.span_length(record),
        }
    }
}

/// 32-bit FNV-1a over the UTF-16 code units of `text`.
pub fn fnv1a_32(text: &str) -> u32 {
    const OFFSET_BASIS: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;

    text.encode_utf16().fold(OFFSET_BASIS, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LngLat;
    use crate::feature::{Severity, Status};

    fn record(id: &str) -> FeatureRecord {
        FeatureRecord::point(id, LngLat::new(0.0, 0.0), Severity::Low, Status::Pending)
    }

    #[test]
    fn test_fnv1a_reference_vectors() {
        assert_eq!(fnv1a_32(""), 0x811c_9dc5);
        assert_eq!(fnv1a_32("a"), 0xe40c_292c);
        assert_eq!(fnv1a_32("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_synthetic_span_is_deterministic_and_bounded() {
        for id in ["E-1", "E-2", "torre-77", "ação"] {
            let r = record(id).with_property("name", "Estrutura");
            let first = SyntheticSpan.span_length(&r);
            assert_eq!(first, SyntheticSpan.span_length(&r));
            assert!((MIN_SPAN_M..=MAX_SPAN_M).contains(&first), "{} -> {}", id, first);
            assert_eq!(first, first.round());
        }
    }

    #[test]
    fn test_synthetic_span_depends_on_name() {
        let spans: Vec<f64> = (0..20)
            .map(|i| SyntheticSpan.span_length(&record("E").with_property("name", format!("n{}", i))))
            .collect();
        assert!(spans.iter().any(|s| *s != spans[0]));
    }

    #[test]
    fn test_surveyed_span_prefers_property() {
        let surveyed = SurveyedSpan::<SyntheticSpan>::default();
        let r = record("E-1").with_property(SPAN_LENGTH_PROPERTY, 512.5);
        assert_eq!(surveyed.span_length(&r), 512.5);

        let r = record("E-1").with_property(SPAN_LENGTH_PROPERTY, -3.0);
        assert_eq!(surveyed.span_length(&r), SyntheticSpan.span_length(&r));
    }
}
