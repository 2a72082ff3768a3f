//! LineMap - Headless map engine for power line corridor monitoring
//!
//! This library turns a set of monitoring events (feature records) and a
//! corridor geometry into overlay layers on an interactive map surface:
//! a severity heatmap that gives way to individual points when zoomed in,
//! corridor crossings with highways and railways, a two-point distance
//! measurement, and camera focus with popups. It also scores each record
//! for structural risk.
//!
//! The engine never draws anything. It drives a [`surface::RenderSurface`]
//! and keeps the surface in sync with the desired overlay state across
//! asynchronous style loads and base map swaps.
//!
//! # High-Level API
//!
//! For most use cases, the [`view`] module provides a single entry point:
//!
//! ```
//! use linemap::config::MapConfig;
//! use linemap::coord::{Camera, LngLat};
//! use linemap::surface::MemorySurface;
//! use linemap::view::{MapView, ViewOutcome};
//!
//! let surface = MemorySurface::new((800.0, 600.0), Camera::new(LngLat::new(0.0, 0.0), 1.0));
//! let mut view = MapView::new(surface, "map", &MapConfig::default());
//!
//! // The surface reports its style load later, as a host callback would
//! let loaded = view.surface_mut().complete_style_load();
//! assert_eq!(view.handle_event(&loaded), ViewOutcome::Replayed);
//! ```

pub mod config;
pub mod controller;
pub mod coord;
pub mod feature;
pub mod filter;
pub mod focus;
pub mod geometry;
pub mod layers;
pub mod logging;
pub mod measure;
pub mod paint;
pub mod risk;
pub mod style;
pub mod surface;
pub mod sync;
pub mod view;

/// Version of the LineMap library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
