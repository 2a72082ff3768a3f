//! Data-driven paint expressions.
//!
//! Colors and thresholds are constants keyed by the closed severity and
//! obstacle sets. Expressions are style-document JSON values the surface
//! evaluates per feature.

use serde_json::{json, Value};

use crate::feature::Severity;
use crate::geometry::ObstacleKind;

/// Color of a severity tier.
pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "#22c55e",
        Severity::Medium => "#f97316",
        Severity::High => "#ef4444",
    }
}

/// Color of a crossing tag.
pub fn obstacle_color(kind: ObstacleKind) -> &'static str {
    match kind {
        ObstacleKind::Highway => "#f59e0b",
        ObstacleKind::Railway => "#8b5cf6",
    }
}

/// Fallback color for features outside the closed sets.
pub const UNKNOWN_COLOR: &str = "#38bdf8";

/// Measurement line and marker color.
pub const MEASUREMENT_COLOR: &str = "#0ea5e9";

/// `match` on the `severity` property.
pub fn severity_color_expression() -> Value {
    let mut expr = vec![json!("match"), json!(["get", "severity"])];
    for severity in Severity::ALL {
        expr.push(json!(severity.as_str()));
        expr.push(json!(severity_color(severity)));
    }
    expr.push(json!(UNKNOWN_COLOR));
    Value::Array(expr)
}

/// `match` on the `tag` property of crossing points.
pub fn obstacle_color_expression() -> Value {
    let mut expr = vec![json!("match"), json!(["get", "tag"])];
    for kind in ObstacleKind::ALL {
        expr.push(json!(kind.as_str()));
        expr.push(json!(obstacle_color(kind)));
    }
    expr.push(json!(UNKNOWN_COLOR));
    Value::Array(expr)
}

/// Point radius interpolated from the `weight` property.
pub fn weight_radius_expression(min_radius: f64, max_radius: f64) -> Value {
    json!(["interpolate", ["linear"], ["get", "weight"], 0.25, min_radius, 1.0, max_radius])
}

/// Cluster point-count thresholds for color and radius steps.
pub const CLUSTER_STEPS: [u64; 3] = [10, 30, 50];

/// Bubble color stepped by `point_count`.
pub fn cluster_color_expression() -> Value {
    json!([
        "step",
        ["get", "point_count"],
        "#51bbd6",
        CLUSTER_STEPS[0],
        "#f1f075",
        CLUSTER_STEPS[1],
        "#f28cb1",
        CLUSTER_STEPS[2],
        "#ff0000"
    ])
}

/// Bubble radius stepped by `point_count`.
pub fn cluster_radius_expression() -> Value {
    json!(["step", ["get", "point_count"], 20, CLUSTER_STEPS[0], 30, CLUSTER_STEPS[1], 40])
}

/// Heatmap color ramp over density.
pub fn heatmap_color_expression() -> Value {
    json!([
        "interpolate",
        ["linear"],
        ["heatmap-density"],
        0.0,
        "rgba(34,197,94,0)",
        0.3,
        severity_color(Severity::Low),
        0.6,
        severity_color(Severity::Medium),
        1.0,
        severity_color(Severity::High)
    ])
}

/// Filter matching clustered features.
pub fn clustered_filter() -> Value {
    json!(["has", "point_count"])
}

/// Filter matching unclustered features.
pub fn unclustered_filter() -> Value {
    json!(["!", ["has", "point_count"]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_expression_covers_every_tier() {
        let expr = severity_color_expression();
        let items = expr.as_array().unwrap();
        assert_eq!(items[0], "match");
        // match, input, 3 pairs, fallback
        assert_eq!(items.len(), 2 + 6 + 1);
        assert_eq!(items[6], "high");
        assert_eq!(items[7], "#ef4444");
    }

    #[test]
    fn test_obstacle_expression() {
        let expr = obstacle_color_expression();
        assert_eq!(expr[2], "highway");
        assert_eq!(expr[4], "railway");
        assert_eq!(expr[5], obstacle_color(ObstacleKind::Railway));
    }

    #[test]
    fn test_cluster_steps() {
        let color = cluster_color_expression();
        assert_eq!(color[3], 10);
        assert_eq!(color[5], 30);
        assert_eq!(color[7], 50);
        assert_eq!(color[8], "#ff0000");

        let radius = cluster_radius_expression();
        assert_eq!(radius[2], 20);
        assert_eq!(radius[6], 40);
    }
}
