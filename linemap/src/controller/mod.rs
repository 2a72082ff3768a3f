//! Surface lifecycle controller.
//!
//! [`MapSurfaceController`] owns exactly one [`RenderSurface`] and tracks its
//! readiness with a small state machine:
//!
//! ```text
//! Uninitialized → Initializing → Ready ⇄ StyleSwapping
//!                      │           │          │
//!                      └───────────┴──────────┴──→ Destroyed
//! ```
//!
//! Every mutation is dispatched as a [`SurfaceOp`]. In `Ready` it is applied
//! immediately; in any other live state it is queued (coalesced per source,
//! camera, popup and resize slot) and flushed on the next transition to
//! `Ready`. Applying an op is idempotent: upserting an existing source
//! replaces its data, adding an existing layer is skipped, removing a missing
//! layer or source does nothing, and a layer whose source is missing gets an
//! empty source created for it.
//!
//! Style load failures never escape as errors. They are recorded as
//! [`Notice`]s and the controller re-requests the last good style (or the
//! fallback during initialization).

mod op;
mod state;

pub use op::{Dispatch, OpQueue, SurfaceOp};
pub use state::{Notice, SurfaceState};

use tracing::{debug, info, warn};

use crate::coord::Camera;
use crate::feature::FeatureCollection;
use crate::style::StyleRef;
use crate::surface::{
    EventKind, ListenerId, RenderSurface, SourceDescriptor, SurfaceError, SurfaceEvent,
};

/// Extruded buildings layer removed by [`MapSurfaceController::reset_terrain`].
pub const BUILDINGS_LAYER_ID: &str = "3d-buildings";

/// Elevation source used by the terrain toggle.
pub const DEM_SOURCE_ID: &str = "mapbox-dem";

/// A listener registered through the controller.
#[derive(Debug, Clone, PartialEq)]
struct ListenerRecord {
    id: ListenerId,
    kind: EventKind,
    layer_id: Option<String>,
}

/// Owns one rendering surface and serializes every write to it.
#[derive(Debug)]
pub struct MapSurfaceController<S: RenderSurface> {
    surface: S,
    container: String,
    state: SurfaceState,
    queue: OpQueue,
    /// Most recently requested style
    style: StyleRef,
    last_good_style: Option<StyleRef>,
    fallback_style: Option<StyleRef>,
    /// Set while re-requesting a style after a failure
    recovering: bool,
    /// Camera captured before a style swap
    saved_camera: Option<Camera>,
    listeners: Vec<ListenerRecord>,
    notices: Vec<Notice>,
}

impl<S: RenderSurface> MapSurfaceController<S> {
    /// Take ownership of `surface`, position the camera and request the
    /// initial style.
    ///
    /// The controller starts in `Initializing` and becomes `Ready` when the
    /// surface reports [`SurfaceEvent::StyleLoaded`].
    pub fn create(
        surface: S,
        container: impl Into<String>,
        initial_camera: Camera,
        initial_style: StyleRef,
    ) -> Self {
        let mut controller = Self {
            surface,
            container: container.into(),
            state: SurfaceState::Uninitialized,
            queue: OpQueue::default(),
            style: initial_style,
            last_good_style: None,
            fallback_style: None,
            recovering: false,
            saved_camera: None,
            listeners: Vec::new(),
            notices: Vec::new(),
        };
        controller.initialize(initial_camera);
        controller
    }

    fn initialize(&mut self, camera: Camera) {
        if let Err(e) = self.surface.jump_to(camera) {
            warn!(container = %self.container, error = %e, "Failed to position initial camera");
        }
        match self.surface.set_style(&self.style) {
            Ok(()) => {
                self.transition(SurfaceState::Initializing);
            }
            Err(e) => {
                warn!(container = %self.container, error = %e, "Surface rejected initial style");
                self.transition(SurfaceState::Destroyed);
            }
        }
    }

    /// Style requested when the initial style fails to load.
    pub fn with_fallback_style(mut self, style: StyleRef) -> Self {
        self.fallback_style = Some(style);
        self
    }

    fn transition(&mut self, next: SurfaceState) {
        if self.state != next {
            info!(
                container = %self.container,
                from = %self.state,
                to = %next,
                "Surface state changed"
            );
            self.state = next;
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SurfaceState::Ready
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The most recently requested style.
    pub fn style(&self) -> &StyleRef {
        &self.style
    }

    /// The last style that loaded successfully.
    pub fn last_good_style(&self) -> Option<&StyleRef> {
        self.last_good_style.as_ref()
    }

    /// Operations waiting for the next ready transition.
    pub fn queued_ops(&self) -> &[SurfaceOp] {
        self.queue.ops()
    }

    /// Drain recorded notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn camera(&self) -> Camera {
        self.saved_camera.unwrap_or_else(|| self.surface.camera())
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.surface.viewport()
    }

    /// Layer ids on the surface, bottom to top.
    pub fn layer_order(&self) -> Vec<String> {
        self.surface.layer_order()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Switch the base style.
    ///
    /// A request for the style already active (or already loading) is a
    /// no-op. From `Ready`, the camera is captured and re-applied once the
    /// new style is ready; every custom source and layer is dropped by the
    /// surface and must be replayed by the caller.
    pub fn set_style(&mut self, next: StyleRef) -> Dispatch {
        match self.state {
            SurfaceState::Destroyed => return Dispatch::Discarded,
            _ if next == self.style => {
                debug!(style = %next, "Style already active, skipping swap");
                return Dispatch::Skipped;
            }
            SurfaceState::Ready => {
                self.saved_camera = Some(self.surface.camera());
                self.transition(SurfaceState::StyleSwapping);
            }
            SurfaceState::Uninitialized => self.transition(SurfaceState::Initializing),
            SurfaceState::Initializing | SurfaceState::StyleSwapping => {}
        }

        info!(container = %self.container, style = %next, "Requesting style");
        self.style = next;
        self.recovering = false;
        if let Err(e) = self.surface.set_style(&self.style) {
            warn!(style = %self.style, error = %e, "Surface rejected style");
        }
        Dispatch::Applied
    }

    /// Feed a surface callback into the state machine.
    ///
    /// Returns `true` when the surface has just become ready, in which case
    /// custom sources and layers must be replayed.
    pub fn on_surface_event(&mut self, event: &SurfaceEvent) -> bool {
        match event {
            SurfaceEvent::StyleLoaded => self.on_style_loaded(),
            SurfaceEvent::StyleError { message } => {
                self.on_style_error(message);
                false
            }
            _ => false,
        }
    }

    fn on_style_loaded(&mut self) -> bool {
        if !matches!(
            self.state,
            SurfaceState::Initializing | SurfaceState::StyleSwapping
        ) {
            return false;
        }

        self.last_good_style = Some(self.style.clone());
        self.recovering = false;
        self.transition(SurfaceState::Ready);

        if let Some(camera) = self.saved_camera.take() {
            if let Err(e) = self.surface.jump_to(camera) {
                warn!(error = %e, "Failed to restore camera after style swap");
            }
        }

        self.flush();
        true
    }

    fn on_style_error(&mut self, message: &str) {
        let recovery = match self.state {
            SurfaceState::StyleSwapping => self.last_good_style.clone(),
            SurfaceState::Initializing => self.fallback_style.clone(),
            _ => {
                debug!(error = message, "Ignoring style error outside a style load");
                return;
            }
        }
        .filter(|style| *style != self.style && !self.recovering);

        warn!(
            container = %self.container,
            style = %self.style,
            error = message,
            recovery = ?recovery.as_ref().map(StyleRef::label),
            "Style failed to load"
        );
        self.notices.push(Notice::StyleLoadFailure {
            style: self.style.label(),
            message: message.to_string(),
            recovery: recovery.as_ref().map(StyleRef::label),
        });

        if let Some(style) = recovery {
            self.style = style;
            self.recovering = true;
            if let Err(e) = self.surface.set_style(&self.style) {
                warn!(style = %self.style, error = %e, "Surface rejected recovery style");
            }
        }
    }

    /// Apply `op` now if ready, otherwise queue it.
    pub fn dispatch(&mut self, op: SurfaceOp) -> Dispatch {
        match self.state {
            SurfaceState::Destroyed => {
                warn!(op = op.name(), "Dropping operation on destroyed surface");
                Dispatch::Discarded
            }
            SurfaceState::Ready => self.apply_or_queue(op),
            _ => {
                debug!(op = op.name(), state = %self.state, "Queueing operation until ready");
                self.queue.push(op);
                Dispatch::Queued
            }
        }
    }

    fn apply_or_queue(&mut self, op: SurfaceOp) -> Dispatch {
        match self.apply_op(&op) {
            Ok(true) => Dispatch::Applied,
            Ok(false) => Dispatch::Skipped,
            Err(SurfaceError::NotReady) => {
                debug!(op = op.name(), "Surface not ready, queueing operation");
                self.queue.push(op);
                Dispatch::Queued
            }
            Err(e) => {
                warn!(op = op.name(), error = %e, "Surface operation failed");
                Dispatch::Skipped
            }
        }
    }

    fn flush(&mut self) {
        let ops = self.queue.drain();
        if ops.is_empty() {
            return;
        }
        debug!(count = ops.len(), "Flushing queued operations");
        for op in ops {
            self.apply_or_queue(op);
        }
    }

    /// Apply one op idempotently. `Ok(false)` means nothing had to change.
    fn apply_op(&mut self, op: &SurfaceOp) -> Result<bool, SurfaceError> {
        let surface = &mut self.surface;
        match op {
            SurfaceOp::UpsertSource(source) => {
                if surface.has_source(&source.id) {
                    surface.set_source_data(&source.id, &source.data)?;
                } else {
                    surface.add_source(source)?;
                }
            }
            SurfaceOp::RemoveSource(id) => {
                if !surface.has_source(id) {
                    return Ok(false);
                }
                surface.remove_source(id)?;
            }
            SurfaceOp::AddLayer { layer, before } => {
                if surface.has_layer(&layer.id) {
                    return Ok(false);
                }
                ensure_source(surface, &layer.source_id)?;
                let before = before.as_deref().filter(|b| surface.has_layer(b));
                surface.add_layer(layer, before)?;
            }
            SurfaceOp::UpdateLayer(layer) => {
                if surface.has_layer(&layer.id) {
                    surface.update_layer(layer)?;
                } else {
                    ensure_source(surface, &layer.source_id)?;
                    surface.add_layer(layer, None)?;
                }
            }
            SurfaceOp::RemoveLayer(id) => {
                if !surface.has_layer(id) {
                    return Ok(false);
                }
                surface.remove_layer(id)?;
            }
            SurfaceOp::MoveLayer { id, before } => {
                if !surface.has_layer(id) {
                    return Ok(false);
                }
                let before = before.as_deref().filter(|b| surface.has_layer(b));
                surface.move_layer(id, before)?;
            }
            SurfaceOp::SetVisibility { id, visible } => {
                if !surface.has_layer(id) {
                    return Ok(false);
                }
                surface.set_layer_visibility(id, *visible)?;
            }
            SurfaceOp::SetTerrain(source) => surface.set_terrain(source.as_deref())?,
            SurfaceOp::JumpTo(camera) => surface.jump_to(*camera)?,
            SurfaceOp::EaseTo {
                camera,
                duration_ms,
            } => surface.ease_to(*camera, *duration_ms)?,
            SurfaceOp::ShowPopup(popup) => surface.show_popup(popup)?,
            SurfaceOp::RemovePopup => surface.remove_popup(),
            SurfaceOp::Resize => surface.resize()?,
            SurfaceOp::ExpandCluster {
                source_id,
                cluster_id,
                center,
            } => surface.request_cluster_expansion(source_id, *cluster_id, *center)?,
        }
        debug!(op = op.name(), "Applied surface operation");
        Ok(true)
    }

    /// Turn terrain off and drop the extruded buildings layer and the
    /// elevation source. Missing pieces are ignored.
    pub fn reset_terrain(&mut self) {
        self.dispatch(SurfaceOp::SetTerrain(None));
        self.dispatch(SurfaceOp::RemoveLayer(BUILDINGS_LAYER_ID.to_string()));
        self.dispatch(SurfaceOp::RemoveSource(DEM_SOURCE_ID.to_string()));
    }

    /// Turn terrain on over [`DEM_SOURCE_ID`]. The surface provisions the
    /// elevation source if it is missing, including after
    /// [`reset_terrain`](Self::reset_terrain) removed it.
    pub fn enable_terrain(&mut self) -> Dispatch {
        self.dispatch(SurfaceOp::SetTerrain(Some(DEM_SOURCE_ID.to_string())))
    }

    /// Ask the surface to re-read its container size.
    pub fn resize(&mut self) -> Dispatch {
        self.dispatch(SurfaceOp::Resize)
    }

    /// Register a listener and track it for teardown.
    pub fn on(&mut self, kind: EventKind, layer_id: Option<&str>) -> Option<ListenerId> {
        if self.state == SurfaceState::Destroyed {
            return None;
        }
        match self.surface.on(kind, layer_id) {
            Ok(id) => {
                debug!(listener = %id, ?kind, layer_id = ?layer_id, "Registered listener");
                self.listeners.push(ListenerRecord {
                    id,
                    kind,
                    layer_id: layer_id.map(str::to_string),
                });
                Some(id)
            }
            Err(e) => {
                warn!(?kind, error = %e, "Failed to register listener");
                None
            }
        }
    }

    /// Remove a listener registered through [`Self::on`].
    pub fn off(&mut self, id: ListenerId) {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        if self.listeners.len() != before {
            self.surface.off(id);
        }
    }

    /// Listeners registered for `layer_id`.
    pub fn listeners_for(&self, layer_id: &str) -> Vec<(ListenerId, EventKind)> {
        self.listeners
            .iter()
            .filter(|l| l.layer_id.as_deref() == Some(layer_id))
            .map(|l| (l.id, l.kind))
            .collect()
    }

    /// Remove every listener and dispose the surface.
    ///
    /// Returns `false` if the controller was already torn down.
    pub fn teardown(&mut self) -> bool {
        if self.state == SurfaceState::Destroyed {
            return false;
        }
        for listener in self.listeners.drain(..) {
            self.surface.off(listener.id);
        }
        self.surface.remove_popup();
        self.surface.dispose();
        let dropped = self.queue.len();
        self.queue.clear();
        self.saved_camera = None;
        self.transition(SurfaceState::Destroyed);
        if dropped > 0 {
            warn!(dropped, "Dropped queued operations on teardown");
        }
        true
    }
}

/// Create an empty source for `id` if the surface lacks one.
fn ensure_source<S: RenderSurface>(surface: &mut S, id: &str) -> Result<(), SurfaceError> {
    if surface.has_source(id) {
        return Ok(());
    }
    debug!(source_id = id, "Creating missing source");
    surface.add_source(&SourceDescriptor::new(id, FeatureCollection::empty()))
}
