//! Human-readable text output formatter

use crate::controller::ViewState;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::map::{Layer, Viewport};

/// Text formatter - outputs a human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, view: &ViewState) -> Result<String> {
        let mut output = String::new();

        if let Some(alert) = &view.panel.alert {
            output.push_str(&format!("Alert: {}\n", alert));
        }
        if !view.panel.status.is_empty() {
            output.push_str(&format!("Status: {}\n", view.panel.status));
        }
        if !view.panel.distance_result.is_empty() {
            output.push_str(&format!("{}\n", view.panel.distance_result));
        }

        if let Some(fix) = &view.user_location {
            output.push_str(&format!(
                "You are here: {} ±{:.0} m\n",
                fix.coord, fix.accuracy_m
            ));
        }

        if let Some(marker) = view.overlays.search_marker {
            if let Some(Layer::Marker { at, popup, .. }) = view.scene.get(marker) {
                let name = popup.as_ref().map(|p| p.text.as_str()).unwrap_or("");
                output.push_str(&format!("Place: {}\n", name));
                output.push_str(&format!("  at {}\n", at));
            }
        }

        if let Some(line) = view.overlays.route_line {
            if let Some(Layer::Polyline { path, .. }) = view.scene.get(line) {
                output.push_str(&format!("Route: {} points\n", path.len()));
                if let (Some(first), Some(last)) = (path.first(), path.last()) {
                    output.push_str(&format!("  from {}\n  to   {}\n", first, last));
                }
            }
        }

        match view.scene.viewport {
            Viewport::Center { center, zoom, .. } => {
                output.push_str(&format!("Map: centered on {} at zoom {}\n", center, zoom));
            }
            Viewport::Fit { bounds, .. } => {
                output.push_str(&format!(
                    "Map: fitted to {} - {}\n",
                    bounds.south_west, bounds.north_east
                ));
            }
        }

        Ok(output)
    }
}
