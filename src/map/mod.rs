//! Map widget abstraction
//!
//! The controller talks to the map only through [`MapView`]: add and remove
//! overlay layers, move markers, and steer the viewport. [`scene::MapScene`]
//! is the in-process implementation whose snapshots a browser front-end
//! mirrors onto a real tile map.

pub mod scene;

use crate::coord::{Bounds, Coordinate};
use serde::{Deserialize, Serialize};

/// Opaque handle of a rendered layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u64);

/// Popup bound to a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub text: String,
    /// Shown immediately rather than on click
    pub open: bool,
}

/// A renderable overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Marker {
        at: Coordinate,
        /// CSS class of the marker icon
        icon: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        popup: Option<Popup>,
    },
    Circle {
        center: Coordinate,
        radius_m: f64,
        color: String,
        fill_opacity: f64,
    },
    Polyline {
        path: Vec<Coordinate>,
        color: String,
        weight: u32,
        class: String,
    },
}

/// Which kind of layer, for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Marker,
    Circle,
    Polyline,
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Marker { .. } => LayerKind::Marker,
            Layer::Circle { .. } => LayerKind::Circle,
            Layer::Polyline { .. } => LayerKind::Polyline,
        }
    }
}

/// How the viewport was last positioned
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    /// Centered on a point at a zoom level; `animate` asks for a fly-to
    Center {
        center: Coordinate,
        zoom: u8,
        animate: bool,
    },
    /// Fitted to a box with pixel padding on each axis
    Fit { bounds: Bounds, padding: [u32; 2] },
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::Center {
            center: Coordinate::new(0.0, 0.0),
            zoom: 2,
            animate: false,
        }
    }
}

/// Trait for map widgets
///
/// Methods take `&self`; implementations synchronize internally so the
/// animation task can move markers while the controller renders.
pub trait MapView: Send + Sync + 'static {
    /// Add a layer and return its handle
    fn add_layer(&self, layer: Layer) -> LayerId;

    /// Remove a layer; unknown handles are ignored
    fn remove_layer(&self, id: LayerId);

    /// Move a marker; unknown handles and non-marker layers are ignored
    fn set_marker_position(&self, id: LayerId, at: Coordinate);

    /// Center the map on a point
    fn set_view(&self, center: Coordinate, zoom: u8, animate: bool);

    /// Fit the viewport to a bounding box
    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]);
}
