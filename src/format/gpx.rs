//! GPX output formatter
//!
//! Search results and the user's fix become waypoints, the route becomes a
//! track.

use crate::controller::ViewState;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::map::Layer;

/// GPX formatter - outputs a GPX 1.1 document
pub struct GpxFormatter;

/// Escape the five XML special characters
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and route track"
    }

    fn format(&self, view: &ViewState) -> Result<String> {
        let mut gpx = String::new();

        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="mapnav">"#);
        gpx.push('\n');

        if let Some(fix) = &view.user_location {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                fix.coord.lat, fix.coord.lng
            ));
            gpx.push('\n');
            gpx.push_str("    <name>My Location</name>\n");
            gpx.push_str(&format!("    <desc>accuracy: {:.0} m</desc>\n", fix.accuracy_m));
            gpx.push_str("  </wpt>\n");
        }

        if let Some(Layer::Marker { at, popup, .. }) =
            view.overlays.search_marker.and_then(|id| view.scene.get(id))
        {
            gpx.push_str(&format!(r#"  <wpt lat="{}" lon="{}">"#, at.lat, at.lng));
            gpx.push('\n');
            if let Some(popup) = popup {
                gpx.push_str(&format!("    <name>{}</name>\n", escape(&popup.text)));
            }
            gpx.push_str("  </wpt>\n");
        }

        if let Some(Layer::Polyline { path, .. }) =
            view.overlays.route_line.and_then(|id| view.scene.get(id))
        {
            gpx.push_str("  <trk>\n");
            gpx.push_str("    <name>Route</name>\n");
            if !view.panel.distance_result.is_empty() {
                gpx.push_str(&format!(
                    "    <desc>{}</desc>\n",
                    escape(&view.panel.distance_result)
                ));
            }
            gpx.push_str("    <trkseg>\n");
            for point in path {
                gpx.push_str(&format!(
                    "      <trkpt lat=\"{}\" lon=\"{}\"/>\n",
                    point.lat, point.lng
                ));
            }
            gpx.push_str("    </trkseg>\n");
            gpx.push_str("  </trk>\n");
        }

        gpx.push_str("</gpx>\n");

        Ok(gpx)
    }
}
