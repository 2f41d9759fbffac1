use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// One file of a full-recursion repository listing.
///
/// Paths are repository-relative and `/`-separated; both content sources
/// prefix them with `/` (`/src/App/App.csproj`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTreeEntry {
    pub path: String,
}

impl RepositoryTreeEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A package ecosystem whose manifests can be scanned.
///
/// Variant order is the order the aggregator runs them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    DotNet,
    Node,
    Go,
    Maven,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 4] = [
        Ecosystem::DotNet,
        Ecosystem::Node,
        Ecosystem::Go,
        Ecosystem::Maven,
    ];

    /// Filename suffix identifying this ecosystem's manifests.
    pub fn manifest_suffix(&self) -> &'static str {
        match self {
            Ecosystem::DotNet => ".csproj",
            Ecosystem::Node => "package.json",
            Ecosystem::Go => "go.mod",
            Ecosystem::Maven => "pom.xml",
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Ecosystem::DotNet => ".NET",
            Ecosystem::Node => "Node",
            Ecosystem::Go => "Go",
            Ecosystem::Maven => "Maven",
        };
        f.pad(name)
    }
}

/// A declared dependency extracted from one manifest.
///
/// Kept structured internally; the composite `name@version` /
/// `groupId:artifactId` string is only produced by [`Dependency::key`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: Option<String>,
}

impl Dependency {
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// A Maven-style coordinate carrying no version.
    pub fn unversioned(ecosystem: Ecosystem, name: impl Into<String>) -> Self {
        Self {
            ecosystem,
            name: name.into(),
            version: None,
        }
    }

    /// Composite display key: `name@version`, or the bare name when unversioned.
    pub fn key(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Result of running one ecosystem's locate → fetch → parse pipeline.
#[derive(Debug)]
pub enum EcosystemOutcome {
    /// No manifest of this kind exists in the repository.
    Absent,
    /// At least one manifest was parsed. `skipped` lists the ones that were not.
    Collected {
        manifests: usize,
        dependencies: Vec<Dependency>,
        skipped: Vec<ManifestError>,
    },
    /// Every matched manifest failed to fetch or parse.
    Failed {
        manifests: usize,
        errors: Vec<ManifestError>,
    },
}

impl EcosystemOutcome {
    pub fn dependencies(&self) -> &[Dependency] {
        match self {
            EcosystemOutcome::Collected { dependencies, .. } => dependencies,
            _ => &[],
        }
    }

    pub fn errors(&self) -> &[ManifestError] {
        match self {
            EcosystemOutcome::Collected { skipped, .. } => skipped,
            EcosystemOutcome::Failed { errors, .. } => errors,
            EcosystemOutcome::Absent => &[],
        }
    }

    pub fn manifests(&self) -> usize {
        match self {
            EcosystemOutcome::Absent => 0,
            EcosystemOutcome::Collected { manifests, .. }
            | EcosystemOutcome::Failed { manifests, .. } => *manifests,
        }
    }
}

#[derive(Debug)]
pub struct EcosystemReport {
    pub ecosystem: Ecosystem,
    pub outcome: EcosystemOutcome,
}

/// Everything one scan of one repository produced.
#[derive(Debug)]
pub struct ScanReport {
    pub repository: String,
    pub ecosystems: Vec<EcosystemReport>,
}

impl ScanReport {
    /// Unique dependencies across all ecosystems, sorted by composite key.
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut set = BTreeSet::new();
        for report in &self.ecosystems {
            set.extend(report.outcome.dependencies().iter().cloned());
        }

        let mut deps: Vec<Dependency> = set.into_iter().collect();
        deps.sort_by(|a, b| a.key().cmp(&b.key()).then(a.ecosystem.cmp(&b.ecosystem)));
        deps
    }

    /// Unique composite keys across all ecosystems, sorted.
    ///
    /// A `name@version` declared by more than one ecosystem appears once.
    pub fn keys(&self) -> Vec<String> {
        let keys: BTreeSet<String> = self
            .ecosystems
            .iter()
            .flat_map(|r| r.outcome.dependencies())
            .map(Dependency::key)
            .collect();
        keys.into_iter().collect()
    }

    pub fn errors(&self) -> Vec<&ManifestError> {
        self.ecosystems
            .iter()
            .flat_map(|r| r.outcome.errors())
            .collect()
    }

    /// True when any ecosystem lost all of its manifests to errors.
    pub fn has_failures(&self) -> bool {
        self.ecosystems
            .iter()
            .any(|r| matches!(r.outcome, EcosystemOutcome::Failed { .. }))
    }

    /// True when some manifests were skipped or failed but data was still returned.
    pub fn is_partial(&self) -> bool {
        !self.errors().is_empty()
    }
}
