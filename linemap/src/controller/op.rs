//! Surface operations and their queue.

use super::DEM_SOURCE_ID;
use crate::coord::{Camera, LngLat};
use crate::surface::{LayerDescriptor, Popup, SourceDescriptor};

/// One imperative surface mutation.
///
/// Every source/layer/camera write goes through the controller as one of
/// these so it can be applied now or queued until the surface is ready.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// Create the source, or replace its data in place if it exists.
    UpsertSource(SourceDescriptor),
    RemoveSource(String),
    /// Add a layer below `before` (top when `None` or missing).
    AddLayer {
        layer: LayerDescriptor,
        before: Option<String>,
    },
    UpdateLayer(LayerDescriptor),
    RemoveLayer(String),
    MoveLayer {
        id: String,
        before: Option<String>,
    },
    SetVisibility {
        id: String,
        visible: bool,
    },
    SetTerrain(Option<String>),
    JumpTo(Camera),
    EaseTo {
        camera: Camera,
        duration_ms: u64,
    },
    ShowPopup(Popup),
    RemovePopup,
    Resize,
    ExpandCluster {
        source_id: String,
        cluster_id: u64,
        center: LngLat,
    },
}

impl SurfaceOp {
    /// Key under which a queued op replaces an earlier queued one.
    ///
    /// Ops without a key are queued in order and never merged.
    pub fn coalesce_key(&self) -> Option<String> {
        match self {
            SurfaceOp::UpsertSource(source) => Some(format!("source:{}", source.id)),
            SurfaceOp::SetVisibility { id, .. } => Some(format!("visibility:{}", id)),
            SurfaceOp::JumpTo(_) | SurfaceOp::EaseTo { .. } => Some("camera".to_string()),
            SurfaceOp::ShowPopup(_) | SurfaceOp::RemovePopup => Some("popup".to_string()),
            SurfaceOp::Resize => Some("resize".to_string()),
            SurfaceOp::SetTerrain(_) => Some("terrain".to_string()),
            _ => None,
        }
    }

    /// True if this op invalidates the coalescing slot `key`: a queued op
    /// with that key must not absorb later writes across this one.
    ///
    /// Removing the elevation source also fences the terrain slot, so a
    /// terrain write queued after the removal stays after it.
    fn invalidates(&self, key: &str) -> bool {
        match self {
            SurfaceOp::RemoveSource(id) => {
                key.strip_prefix("source:") == Some(id.as_str())
                    || (key == "terrain" && id == DEM_SOURCE_ID)
            }
            SurfaceOp::AddLayer { layer, .. } | SurfaceOp::UpdateLayer(layer) => {
                key.strip_prefix("visibility:") == Some(layer.id.as_str())
            }
            SurfaceOp::RemoveLayer(id) => key.strip_prefix("visibility:") == Some(id.as_str()),
            _ => false,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceOp::UpsertSource(_) => "upsert_source",
            SurfaceOp::RemoveSource(_) => "remove_source",
            SurfaceOp::AddLayer { .. } => "add_layer",
            SurfaceOp::UpdateLayer(_) => "update_layer",
            SurfaceOp::RemoveLayer(_) => "remove_layer",
            SurfaceOp::MoveLayer { .. } => "move_layer",
            SurfaceOp::SetVisibility { .. } => "set_visibility",
            SurfaceOp::SetTerrain(_) => "set_terrain",
            SurfaceOp::JumpTo(_) => "jump_to",
            SurfaceOp::EaseTo { .. } => "ease_to",
            SurfaceOp::ShowPopup(_) => "show_popup",
            SurfaceOp::RemovePopup => "remove_popup",
            SurfaceOp::Resize => "resize",
            SurfaceOp::ExpandCluster { .. } => "expand_cluster",
        }
    }
}

/// What happened to a dispatched operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Applied to the surface now
    Applied,
    /// Held until the next ready transition
    Queued,
    /// Nothing to do (already in the requested state)
    Skipped,
    /// Dropped because the controller is destroyed
    Discarded,
}

/// Pending operations, coalesced by [`SurfaceOp::coalesce_key`].
#[derive(Debug, Default)]
pub struct OpQueue {
    ops: Vec<SurfaceOp>,
}

impl OpQueue {
    /// Queue `op`, replacing a queued op with the same key in place.
    ///
    /// The search stops at an op that invalidates the key (a source removal
    /// for source writes), so ordering against it is preserved.
    pub fn push(&mut self, op: SurfaceOp) {
        if let Some(key) = op.coalesce_key() {
            for slot in self.ops.iter_mut().rev() {
                if slot.coalesce_key().as_deref() == Some(key.as_str()) {
                    *slot = op;
                    return;
                }
                if slot.invalidates(&key) {
                    break;
                }
            }
        }
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn drain(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}
