//! JSON output formatter

use crate::controller::ViewState;
use crate::error::Result;
use crate::format::OutputFormatter;

/// JSON formatter - outputs the full view as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full view as JSON"
    }

    fn format(&self, view: &ViewState) -> Result<String> {
        Ok(serde_json::to_string_pretty(view)?)
    }
}
