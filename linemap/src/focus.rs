//! Focused entity synchronization.
//!
//! One record at a time can be focused. Focusing eases the camera onto the
//! record and opens a popup built from an HTML template; the list and the
//! map both go through [`EventFocusController::focus`], so either entry
//! point leaves the same state behind. After every filter change
//! [`EventFocusController::settle`] drops a focus that is no longer part of
//! the visible set.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::controller::{MapSurfaceController, SurfaceOp};
use crate::coord::{fit_bounds, Camera, LngLatBounds};
use crate::feature::FeatureRecord;
use crate::surface::{Popup, RenderSurface};

/// Lowest zoom the camera eases to when focusing a record.
pub const DEFAULT_MIN_FOCUS_ZOOM: f64 = 14.0;

/// Duration of the focus camera ease.
pub const DEFAULT_EASE_DURATION_MS: u64 = 1000;

/// Padding around framed records, in pixels.
pub const FIT_PADDING_PX: f64 = 60.0;

/// Duration of the framing ease.
pub const FIT_DURATION_MS: u64 = 800;

/// Highest zoom used when framing records.
pub const FIT_MAX_ZOOM: f64 = 11.0;

/// Popup shown for a focused record.
pub const DEFAULT_POPUP_TEMPLATE: &str = concat!(
    "<div class=\"event-popup\">",
    "<h3>{name}</h3>",
    "<p>Severity: {severity}</p>",
    "<p>Status: {status}</p>",
    "<p>Start: {start}</p>",
    "</div>"
);

/// Keeps list, popup and camera on the same record.
#[derive(Debug, Clone)]
pub struct EventFocusController {
    focused: Option<String>,
    min_zoom: f64,
    ease_duration_ms: u64,
    template: String,
}

impl Default for EventFocusController {
    fn default() -> Self {
        Self {
            focused: None,
            min_zoom: DEFAULT_MIN_FOCUS_ZOOM,
            ease_duration_ms: DEFAULT_EASE_DURATION_MS,
            template: DEFAULT_POPUP_TEMPLATE.to_string(),
        }
    }
}

impl EventFocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_zoom(mut self, zoom: f64) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_ease_duration(mut self, duration_ms: u64) -> Self {
        self.ease_duration_ms = duration_ms;
        self
    }

    /// Popup template; `{field}` placeholders are replaced with escaped
    /// record values.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Id of the focused record.
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn ease_duration_ms(&self) -> u64 {
        self.ease_duration_ms
    }

    /// Focus record `id` out of `records`.
    ///
    /// Eases the camera to the record's anchor at
    /// `max(current zoom, minimum focus zoom)` and opens its popup. Returns
    /// `false`, leaving the current focus alone, when `id` is not in
    /// `records` or has no usable geometry.
    pub fn focus<'a, S, I>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        records: I,
        id: &str,
    ) -> bool
    where
        S: RenderSurface,
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let Some(record) = records.into_iter().find(|r| r.id == id) else {
            debug!(event_id = id, "Focus target not in current set");
            return false;
        };
        let Some(anchor) = record.anchor() else {
            debug!(event_id = id, "Focus target has no anchor");
            return false;
        };

        let current = controller.camera();
        let target = current.looking_at(anchor, current.zoom.max(self.min_zoom));
        controller.dispatch(SurfaceOp::EaseTo {
            camera: target,
            duration_ms: self.ease_duration_ms,
        });
        controller.dispatch(SurfaceOp::ShowPopup(Popup {
            anchor,
            html: render_popup(&self.template, record),
        }));

        info!(event_id = id, zoom = target.zoom, "Focused record");
        self.focused = Some(id.to_string());
        true
    }

    /// Focus the record behind a clicked feature's properties.
    pub fn focus_clicked<'a, S, I>(
        &mut self,
        controller: &mut MapSurfaceController<S>,
        records: I,
        properties: &Map<String, Value>,
    ) -> bool
    where
        S: RenderSurface,
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        match properties.get("id").and_then(Value::as_str) {
            Some(id) => self.focus(controller, records, id),
            None => false,
        }
    }

    /// Drop the focus and close the popup. Returns `false` if nothing was
    /// focused.
    pub fn clear<S: RenderSurface>(&mut self, controller: &mut MapSurfaceController<S>) -> bool {
        let Some(id) = self.focused.take() else {
            return false;
        };
        debug!(event_id = %id, "Cleared focus");
        controller.dispatch(SurfaceOp::RemovePopup);
        true
    }

    /// Reconcile the focus with a recomputed filtered set.
    ///
    /// Returns `true` if the focus was cleared.
    pub fn settle<'a, S, I>(&mut self, controller: &mut MapSurfaceController<S>, filtered: I) -> bool
    where
        S: RenderSurface,
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let Some(id) = self.focused.as_deref() else {
            return false;
        };
        if filtered.into_iter().any(|r| r.id == id) {
            return false;
        }
        self.clear(controller)
    }

    /// Ease the camera so every record fits in the viewport.
    ///
    /// Returns the target camera, or `None` when no record has geometry.
    pub fn fit_bounds<'a, S, I>(
        &self,
        controller: &mut MapSurfaceController<S>,
        records: I,
    ) -> Option<Camera>
    where
        S: RenderSurface,
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        let bounds =
            LngLatBounds::from_points(records.into_iter().flat_map(|r| r.geometry.vertices()))?;
        let framed = fit_bounds(&bounds, controller.viewport(), FIT_PADDING_PX, FIT_MAX_ZOOM);
        let target = controller.camera().looking_at(framed.center, framed.zoom);
        debug!(zoom = target.zoom, "Framing records");
        controller.dispatch(SurfaceOp::EaseTo {
            camera: target,
            duration_ms: FIT_DURATION_MS,
        });
        Some(target)
    }
}

/// Fill `template` from `record`, escaping every substituted value.
///
/// Known fields are `id`, `name`, `severity`, `status`, `start` and `end`;
/// any other placeholder is looked up in the record's properties. Missing
/// values render as an empty string.
pub fn render_popup(template: &str, record: &FeatureRecord) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let key = &rest[open + 1..open + close];
        out.push_str(&escape_html(&field(record, key)));
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn field(record: &FeatureRecord, key: &str) -> String {
    match key {
        "id" => record.id.clone(),
        "name" => record.name().unwrap_or(&record.id).to_string(),
        "severity" => record.severity.to_string(),
        "status" => record.status.to_string(),
        "start" => record
            .started_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        "end" => record
            .ended_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        other => match record.properties.get(other) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(value) => value.to_string(),
        },
    }
}

/// Escape the HTML special characters of `text`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::coord::LngLat;
    use crate::feature::{Severity, Status};
    use crate::style::StyleRef;
    use crate::surface::{MemorySurface, SurfaceCall};

    fn ready(zoom: f64) -> MapSurfaceController<MemorySurface> {
        let mut controller = MapSurfaceController::create(
            MemorySurface::new((800.0, 600.0), Camera::new(LngLat::new(0.0, 0.0), 2.0)),
            "map",
            Camera::new(LngLat::new(-46.3, -23.9), zoom),
            StyleRef::Url("https://styles.test/base.json".into()),
        );
        let event = controller.surface_mut().complete_style_load();
        controller.on_surface_event(&event);
        controller
    }

    fn records() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord::point("e1", LngLat::new(-46.30, -23.90), Severity::High, Status::Critical)
                .with_property("name", "Tower <17> & \"B\""),
            FeatureRecord::point("e2", LngLat::new(-46.50, -23.70), Severity::Low, Status::Resolved)
                .with_started_at(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()),
        ]
    }

    #[test]
    fn test_focus_eases_to_min_zoom() {
        let mut controller = ready(10.0);
        let mut focus = EventFocusController::new();
        assert!(focus.focus(&mut controller, &records(), "e1"));

        assert_eq!(focus.focused(), Some("e1"));
        let camera = controller.surface().camera();
        assert_eq!(camera.center, LngLat::new(-46.30, -23.90));
        assert_eq!(camera.zoom, DEFAULT_MIN_FOCUS_ZOOM);
        assert!(controller.surface().calls().iter().any(|c| matches!(
            c,
            SurfaceCall::EaseTo { duration_ms, .. } if *duration_ms == DEFAULT_EASE_DURATION_MS
        )));
    }

    #[test]
    fn test_focus_keeps_deeper_zoom() {
        let mut controller = ready(17.0);
        let mut focus = EventFocusController::new();
        focus.focus(&mut controller, &records(), "e2");
        assert_eq!(controller.surface().camera().zoom, 17.0);
    }

    #[test]
    fn test_popup_escapes_values() {
        let mut controller = ready(10.0);
        let mut focus = EventFocusController::new();
        focus.focus(&mut controller, &records(), "e1");

        let popup = controller.surface().popup().unwrap();
        assert!(popup.html.contains("Tower &lt;17&gt; &amp; &quot;B&quot;"));
        assert!(popup.html.contains("Severity: high"));
        assert!(!popup.html.contains("<17>"));
    }

    #[test]
    fn test_list_and_click_converge() {
        let data = records();

        let mut by_list = ready(10.0);
        let mut list_focus = EventFocusController::new();
        list_focus.focus(&mut by_list, &data, "e2");

        let mut by_click = ready(10.0);
        let mut click_focus = EventFocusController::new();
        let props = data[1].to_feature().properties;
        click_focus.focus_clicked(&mut by_click, &data, &props);

        assert_eq!(list_focus.focused(), click_focus.focused());
        assert_eq!(by_list.surface().popup(), by_click.surface().popup());
        assert_eq!(by_list.surface().camera(), by_click.surface().camera());
    }

    #[test]
    fn test_unknown_id_keeps_focus() {
        let mut controller = ready(10.0);
        let mut focus = EventFocusController::new();
        focus.focus(&mut controller, &records(), "e1");
        assert!(!focus.focus(&mut controller, &records(), "nope"));
        assert_eq!(focus.focused(), Some("e1"));
    }

    #[test]
    fn test_settle_clears_filtered_out_focus() {
        let mut controller = ready(10.0);
        let mut focus = EventFocusController::new();
        let data = records();
        focus.focus(&mut controller, &data, "e1");

        assert!(!focus.settle(&mut controller, &data));
        assert_eq!(focus.focused(), Some("e1"));

        assert!(focus.settle(&mut controller, &data[1..]));
        assert_eq!(focus.focused(), None);
        assert!(controller.surface().popup().is_none());

        assert!(!focus.settle(&mut controller, &data[1..]));
    }

    #[test]
    fn test_render_popup_fields() {
        let record = &records()[1];
        let html = render_popup("{name}|{start}|{region}|{", record);
        assert_eq!(html, "e2|2024-03-01 08:30||{");
    }

    #[test]
    fn test_fit_bounds_caps_zoom() {
        let mut controller = ready(3.0);
        let focus = EventFocusController::new();
        let camera = focus.fit_bounds(&mut controller, &records()).unwrap();
        assert!(camera.zoom <= FIT_MAX_ZOOM);
        assert_eq!(controller.surface().camera(), camera);

        let single = vec![records().remove(0)];
        let camera = focus.fit_bounds(&mut controller, &single).unwrap();
        assert_eq!(camera.zoom, FIT_MAX_ZOOM);

        let none: Vec<FeatureRecord> = Vec::new();
        assert!(focus.fit_bounds(&mut controller, &none).is_none());
    }
}
