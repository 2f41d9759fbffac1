//! Runs the locate → fetch → parse pipeline for every ecosystem and merges
//! the results into one [`ScanReport`].

use std::collections::HashSet;

use futures::stream::{self, StreamExt};

use crate::analyzer::{self, Analyzer};
use crate::error::{ManifestError, ScanError};
use crate::locator::locate;
use crate::models::{
    Dependency, Ecosystem, EcosystemOutcome, EcosystemReport, RepositoryTreeEntry, ScanReport,
};
use crate::source::ContentSource;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Manifests fetched in parallel within one ecosystem.
    pub concurrency: usize,
    /// Ecosystems to run, in the order given.
    pub ecosystems: Vec<Ecosystem>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            ecosystems: Ecosystem::ALL.to_vec(),
        }
    }
}

/// List the repository tree and aggregate its dependencies.
///
/// Only a failed tree listing is fatal; per-manifest failures end up in the
/// report.
pub async fn get_dependencies<S>(
    source: &S,
    repository_id: &str,
    options: &ScanOptions,
) -> Result<ScanReport, ScanError>
where
    S: ContentSource + ?Sized,
{
    let entries = source
        .list_tree(repository_id)
        .await
        .map_err(|source| ScanError::TreeListing {
            repository: repository_id.to_string(),
            source,
        })?;

    Ok(aggregate(source, repository_id, &entries, options).await)
}

/// Aggregate dependencies from an already-listed tree.
pub async fn aggregate<S>(
    source: &S,
    repository_id: &str,
    entries: &[RepositoryTreeEntry],
    options: &ScanOptions,
) -> ScanReport
where
    S: ContentSource + ?Sized,
{
    let mut ecosystems = Vec::with_capacity(options.ecosystems.len());

    for &ecosystem in &options.ecosystems {
        let outcome = scan_ecosystem(source, repository_id, entries, ecosystem, options).await;
        ecosystems.push(EcosystemReport { ecosystem, outcome });
    }

    ScanReport {
        repository: repository_id.to_string(),
        ecosystems,
    }
}

async fn scan_ecosystem<S>(
    source: &S,
    repository_id: &str,
    entries: &[RepositoryTreeEntry],
    ecosystem: Ecosystem,
    options: &ScanOptions,
) -> EcosystemOutcome
where
    S: ContentSource + ?Sized,
{
    let manifests = locate(entries, ecosystem.manifest_suffix());
    if manifests.is_empty() {
        tracing::debug!(%ecosystem, "no manifests found");
        return EcosystemOutcome::Absent;
    }

    tracing::info!(%ecosystem, manifests = manifests.len(), "scanning manifests");
    let analyzer = analyzer::for_ecosystem(ecosystem);

    // `buffered` yields in input order, so the merge is deterministic.
    let results: Vec<Result<Vec<Dependency>, ManifestError>> = stream::iter(manifests.iter())
        .map(|entry| scan_manifest(source, repository_id, &entry.path, analyzer))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let mut dependencies = Vec::new();
    let mut seen: HashSet<Dependency> = HashSet::new();
    let mut errors = Vec::new();
    let mut parsed = 0usize;

    for result in results {
        match result {
            Ok(deps) => {
                parsed += 1;
                for dep in deps {
                    if seen.insert(dep.clone()) {
                        dependencies.push(dep);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(%ecosystem, error = %e, "skipping manifest");
                errors.push(e);
            }
        }
    }

    if parsed == 0 {
        EcosystemOutcome::Failed {
            manifests: manifests.len(),
            errors,
        }
    } else {
        EcosystemOutcome::Collected {
            manifests: manifests.len(),
            dependencies,
            skipped: errors,
        }
    }
}

async fn scan_manifest<S>(
    source: &S,
    repository_id: &str,
    path: &str,
    analyzer: &dyn Analyzer,
) -> Result<Vec<Dependency>, ManifestError>
where
    S: ContentSource + ?Sized,
{
    let bytes = source
        .file_content(repository_id, path)
        .await
        .map_err(|e| ManifestError::new(path, e))?;

    let deps = analyzer
        .analyze(&analyzer::decode(&bytes))
        .map_err(|e| ManifestError::new(path, e))?;

    tracing::debug!(
        ecosystem = %analyzer.ecosystem(),
        path,
        dependencies = deps.len(),
        "parsed manifest"
    );
    Ok(deps)
}
