//! Desired surface state.

use std::collections::BTreeMap;

use crate::surface::{LayerDescriptor, SourceDescriptor};

/// Declarative description of every custom source and layer.
///
/// `order` lists layer ids bottom to top and always holds exactly the keys
/// of `layers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredState {
    sources: BTreeMap<String, SourceDescriptor>,
    layers: BTreeMap<String, LayerDescriptor>,
    order: Vec<String>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a source.
    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.put_source(source);
        self
    }

    /// Add a layer on top, or replace it in place.
    pub fn with_layer(mut self, layer: LayerDescriptor) -> Self {
        self.put_layer(layer);
        self
    }

    pub(crate) fn put_source(&mut self, source: SourceDescriptor) -> Option<SourceDescriptor> {
        self.sources.insert(source.id.clone(), source)
    }

    pub(crate) fn put_layer(&mut self, layer: LayerDescriptor) -> Option<LayerDescriptor> {
        let id = layer.id.clone();
        let previous = self.layers.insert(id.clone(), layer);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub(crate) fn take_source(&mut self, id: &str) -> Option<SourceDescriptor> {
        self.sources.remove(id)
    }

    pub(crate) fn take_layer(&mut self, id: &str) -> Option<LayerDescriptor> {
        let layer = self.layers.remove(id)?;
        self.order.retain(|l| l != id);
        Some(layer)
    }

    pub(crate) fn layer_mut(&mut self, id: &str) -> Option<&mut LayerDescriptor> {
        self.layers.get_mut(id)
    }

    pub(crate) fn set_order(&mut self, order: Vec<String>) {
        self.order = order;
    }

    pub fn source(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerDescriptor> {
        self.layers.get(id)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.values()
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> impl Iterator<Item = &LayerDescriptor> {
        self.order.iter().filter_map(|id| self.layers.get(id))
    }

    /// Layer ids bottom to top.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Ids of layers drawing from `source_id`, bottom to top.
    pub fn layers_using(&self, source_id: &str) -> Vec<String> {
        self.layers()
            .filter(|l| l.source_id == source_id)
            .map(|l| l.id.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.layers.is_empty()
    }
}
