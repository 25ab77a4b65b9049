//! Performance reports produced by an engine or the remote backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Performance data of a finished (or partially finished) run.
///
/// The engine owns the layout; this type only carries the document and knows
/// how to render it for a terminal or persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceReport(Value);

impl PerformanceReport {
    pub fn new(data: Value) -> Self {
        Self(data)
    }

    pub fn data(&self) -> &Value {
        &self.0
    }

    /// Generate a text summary.
    ///
    /// Scalar top-level fields are listed as metrics; arrays are reported by
    /// length (daily rows, transactions, ...).
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                    PERFORMANCE REPORT                      \n");
        s.push_str("═══════════════════════════════════════════════════════════\n");

        match &self.0 {
            Value::Object(fields) => {
                let mut series = Vec::new();
                for (key, value) in fields {
                    match value {
                        Value::Array(rows) => series.push((key, rows.len())),
                        Value::Object(_) => series.push((key, 1)),
                        scalar => s.push_str(&format!("  {:<22} {}\n", key, render_scalar(scalar))),
                    }
                }
                if !series.is_empty() {
                    s.push_str("───────────────────────────────────────────────────────────\n");
                    for (key, len) in series {
                        s.push_str(&format!("  {:<22} {} rows\n", key, len));
                    }
                }
            }
            Value::Array(rows) => {
                s.push_str(&format!("  {} rows\n", rows.len()));
            }
            scalar => {
                s.push_str(&format!("  {}\n", render_scalar(scalar)));
            }
        }

        s.push_str("═══════════════════════════════════════════════════════════");
        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
