use serde_json::Value;

use crate::error::ParseError;
use crate::models::{Dependency, Ecosystem};

/// Analyzer for `package.json`.
///
/// Only the top-level `dependencies` map is read; dev, peer and optional
/// dependencies are not runtime dependencies of the package.
pub struct NodeAnalyzer;

impl super::Analyzer for NodeAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Node
    }

    fn analyze(&self, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let json: Value = serde_json::from_str(content)?;
        let mut deps = Vec::new();

        let Some(pkgs) = json.get("dependencies").and_then(|v| v.as_object()) else {
            return Ok(deps);
        };

        // Object keys are unique after parsing, so no per-file dedup is needed.
        for (name, range) in pkgs {
            match range.as_str() {
                Some(range) if !range.is_empty() => {
                    deps.push(Dependency::new(Ecosystem::Node, name.as_str(), range));
                }
                _ => tracing::trace!(package = %name, "skipping dependency without a version range"),
            }
        }

        Ok(deps)
    }
}
