use serde::Serialize;

use crate::models::{Ecosystem, EcosystemOutcome, ScanReport};

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    repository: &'a str,
    /// Composite keys, sorted.
    dependencies: Vec<String>,
    ecosystems: Vec<JsonEcosystem>,
}

#[derive(Debug, Serialize)]
struct JsonEcosystem {
    ecosystem: Ecosystem,
    status: &'static str,
    manifests: usize,
    dependencies: usize,
    errors: Vec<JsonError>,
}

#[derive(Debug, Serialize)]
struct JsonError {
    path: String,
    message: String,
}

/// Serialize a scan report as pretty-printed JSON.
pub fn render(report: &ScanReport) -> serde_json::Result<String> {
    let ecosystems = report
        .ecosystems
        .iter()
        .map(|r| JsonEcosystem {
            ecosystem: r.ecosystem,
            status: match r.outcome {
                EcosystemOutcome::Absent => "absent",
                EcosystemOutcome::Collected { .. } => "ok",
                EcosystemOutcome::Failed { .. } => "failed",
            },
            manifests: r.outcome.manifests(),
            dependencies: r.outcome.dependencies().len(),
            errors: r
                .outcome
                .errors()
                .iter()
                .map(|e| JsonError {
                    path: e.path.clone(),
                    message: e.kind.to_string(),
                })
                .collect(),
        })
        .collect();

    let json = JsonReport {
        repository: &report.repository,
        dependencies: report.keys(),
        ecosystems,
    };

    serde_json::to_string_pretty(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ManifestError, SourceError};
    use crate::models::{Dependency, EcosystemReport};
    use serde_json::Value;

    #[test]
    fn test_json_shape() {
        let report = ScanReport {
            repository: "web".to_string(),
            ecosystems: vec![
                EcosystemReport {
                    ecosystem: Ecosystem::Node,
                    outcome: EcosystemOutcome::Collected {
                        manifests: 1,
                        dependencies: vec![Dependency::new(Ecosystem::Node, "left-pad", "^1.0.0")],
                        skipped: vec![],
                    },
                },
                EcosystemReport {
                    ecosystem: Ecosystem::Maven,
                    outcome: EcosystemOutcome::Failed {
                        manifests: 1,
                        errors: vec![ManifestError::new(
                            "/pom.xml",
                            SourceError::NotFound("/pom.xml".to_string()),
                        )],
                    },
                },
            ],
        };

        let value: Value = serde_json::from_str(&render(&report).unwrap()).unwrap();
        assert_eq!(value["repository"], "web");
        assert_eq!(value["dependencies"], serde_json::json!(["left-pad@^1.0.0"]));
        assert_eq!(value["ecosystems"][0]["ecosystem"], "node");
        assert_eq!(value["ecosystems"][0]["status"], "ok");
        assert_eq!(value["ecosystems"][1]["status"], "failed");
        assert_eq!(value["ecosystems"][1]["errors"][0]["path"], "/pom.xml");
    }

    #[test]
    fn test_shared_key_listed_once() {
        let collected = |ecosystem| EcosystemReport {
            ecosystem,
            outcome: EcosystemOutcome::Collected {
                manifests: 1,
                dependencies: vec![Dependency::new(ecosystem, "github.com/foo/bar", "v1.2.3")],
                skipped: vec![],
            },
        };
        let report = ScanReport {
            repository: "mono".to_string(),
            ecosystems: vec![collected(Ecosystem::Node), collected(Ecosystem::Go)],
        };

        let value: Value = serde_json::from_str(&render(&report).unwrap()).unwrap();
        assert_eq!(value["dependencies"], serde_json::json!(["github.com/foo/bar@v1.2.3"]));
        assert_eq!(value["ecosystems"][0]["dependencies"], 1);
        assert_eq!(value["ecosystems"][1]["dependencies"], 1);
    }
}
