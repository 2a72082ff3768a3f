//! Controller states and notices.

use std::fmt;

/// Readiness of a controlled surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// Not yet bound to a style
    Uninitialized,
    /// Initial style requested, not loaded
    Initializing,
    /// Style loaded; operations apply immediately
    Ready,
    /// A new style is loading; custom state was dropped
    StyleSwapping,
    /// Torn down (terminal)
    Destroyed,
}

impl SurfaceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceState::Uninitialized => "uninitialized",
            SurfaceState::Initializing => "initializing",
            SurfaceState::Ready => "ready",
            SurfaceState::StyleSwapping => "style_swapping",
            SurfaceState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal condition reported to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A style failed to load. `recovery` names the style requested instead.
    StyleLoadFailure {
        style: String,
        message: String,
        recovery: Option<String>,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::StyleLoadFailure {
                style,
                message,
                recovery: Some(recovery),
            } => write!(
                f,
                "Style '{}' failed to load ({}); restoring '{}'",
                style, message, recovery
            ),
            Notice::StyleLoadFailure {
                style,
                message,
                recovery: None,
            } => write!(f, "Style '{}' failed to load ({})", style, message),
        }
    }
}
