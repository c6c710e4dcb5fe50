//! In-memory map scene
//!
//! Keeps every rendered layer and the current viewport. Snapshots are
//! serialized for the browser front-end and inspected by tests.

use crate::coord::{Bounds, Coordinate};
use crate::map::{Layer, LayerId, LayerKind, MapView, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A rendered layer together with its handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayer {
    pub id: LayerId,
    #[serde(flatten)]
    pub layer: Layer,
}

/// Point-in-time copy of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Bumped on every mutation so clients can skip unchanged frames
    pub revision: u64,
    pub viewport: Viewport,
    pub layers: Vec<SceneLayer>,
}

impl SceneSnapshot {
    /// Number of layers of `kind`
    pub fn count(&self, kind: LayerKind) -> usize {
        self.layers.iter().filter(|l| l.layer.kind() == kind).count()
    }

    /// Markers using the given icon class
    pub fn markers_with_icon(&self, icon_class: &str) -> Vec<&SceneLayer> {
        self.layers
            .iter()
            .filter(|l| matches!(&l.layer, Layer::Marker { icon, .. } if icon == icon_class))
            .collect()
    }

    /// Look up a layer by handle
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id).map(|l| &l.layer)
    }
}

#[derive(Debug, Default)]
struct SceneState {
    next_id: u64,
    revision: u64,
    viewport: Viewport,
    layers: BTreeMap<LayerId, Layer>,
}

/// Thread-safe in-memory [`MapView`]
#[derive(Debug, Default)]
pub struct MapScene {
    state: Mutex<SceneState>,
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SceneState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Copy the current scene
    pub fn snapshot(&self) -> SceneSnapshot {
        self.with_state(|s| SceneSnapshot {
            revision: s.revision,
            viewport: s.viewport,
            layers: s
                .layers
                .iter()
                .map(|(id, layer)| SceneLayer {
                    id: *id,
                    layer: layer.clone(),
                })
                .collect(),
        })
    }
}

impl MapView for MapScene {
    fn add_layer(&self, layer: Layer) -> LayerId {
        self.with_state(|s| {
            s.next_id += 1;
            s.revision += 1;
            let id = LayerId(s.next_id);
            s.layers.insert(id, layer);
            id
        })
    }

    fn remove_layer(&self, id: LayerId) {
        self.with_state(|s| {
            if s.layers.remove(&id).is_some() {
                s.revision += 1;
            }
        })
    }

    fn set_marker_position(&self, id: LayerId, to: Coordinate) {
        self.with_state(|s| {
            if let Some(Layer::Marker { at, .. }) = s.layers.get_mut(&id) {
                *at = to;
                s.revision += 1;
            }
        })
    }

    fn set_view(&self, center: Coordinate, zoom: u8, animate: bool) {
        self.with_state(|s| {
            s.viewport = Viewport::Center {
                center,
                zoom,
                animate,
            };
            s.revision += 1;
        })
    }

    fn fit_bounds(&self, bounds: Bounds, padding: [u32; 2]) {
        self.with_state(|s| {
            s.viewport = Viewport::Fit { bounds, padding };
            s.revision += 1;
        })
    }
}
