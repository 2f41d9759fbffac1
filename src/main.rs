//! `repo-insights`: list the dependencies a repository declares.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. Pick a content source: a local working tree or an Azure DevOps repository ([`source`]).
//! 3. List the tree and run each ecosystem's pipeline ([`aggregator::get_dependencies`]):
//!    locate manifests ([`locator`]), fetch them, parse them ([`analyzer`]).
//! 4. Render the report ([`report`]).
//! 5. Exit `0`, or `1` when an ecosystem had no readable manifest.

mod aggregator;
mod analyzer;
mod cli;
mod config;
mod error;
mod locator;
mod models;
mod report;
mod source;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use aggregator::{get_dependencies, ScanOptions};
use cli::{Cli, ReportFormat};
use config::{load_config, Config};
use models::Ecosystem;
use source::azure::{friendly_branch_name, AzureDevOpsSource, AzureSettings};
use source::local::LocalSource;
use source::ContentSource;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;
    let options = scan_options(&cli, &config);

    let (source, repository_id, target): (Box<dyn ContentSource>, String, String) =
        match &cli.repo {
            Some(repo) => {
                let source = azure_source(&cli, &config, repo).await?;
                let target = format!(
                    "{} ({})",
                    repo,
                    source.branch().unwrap_or("default branch")
                );
                (Box::new(source) as Box<dyn ContentSource>, repo.clone(), target)
            }
            None => {
                let id = path.to_string_lossy().into_owned();
                (Box::new(LocalSource::new()) as Box<dyn ContentSource>, id.clone(), id)
            }
        };

    let spinner = if !cli.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Scanning {}", target));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = get_dependencies(source.as_ref(), &repository_id, &options).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = result.with_context(|| format!("Scan of {} failed", target))?;
    if report.is_partial() {
        tracing::warn!(
            skipped = report.errors().len(),
            "some manifests could not be read; results are partial"
        );
    }

    match cli.report {
        ReportFormat::Terminal => report::terminal::render(&report, &target, cli.quiet),
        ReportFormat::Json => println!("{}", report::json::render(&report)?),
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

/// Merge config-file scan settings with CLI overrides.
fn scan_options(cli: &Cli, config: &Config) -> ScanOptions {
    let excluded: Vec<Ecosystem> = cli
        .exclude_lang
        .iter()
        .map(Ecosystem::from)
        .chain(config.scan.exclude.iter().copied())
        .collect();

    ScanOptions {
        concurrency: cli.concurrency.unwrap_or(config.scan.concurrency),
        ecosystems: Ecosystem::ALL
            .into_iter()
            .filter(|e| !excluded.contains(e))
            .collect(),
    }
}

/// Build an Azure DevOps source pinned to the requested or default branch.
async fn azure_source(cli: &Cli, config: &Config, repo: &str) -> Result<AzureDevOpsSource> {
    let Some(organization) = cli.org.clone().or_else(|| config.azure.organization.clone()) else {
        bail!("--org is required for remote scans (or set [azure] organization in config)");
    };
    let Some(project) = cli.project.clone().or_else(|| config.azure.project.clone()) else {
        bail!("--project is required for remote scans (or set [azure] project in config)");
    };

    let source = AzureDevOpsSource::new(AzureSettings {
        organization,
        project,
        token: cli.token.clone(),
        branch: None,
        api_version: config.azure.api_version.clone(),
        timeout: Duration::from_secs(config.azure.timeout_secs),
    })?;

    if let Some(branch) = &cli.branch {
        return Ok(source.with_branch(branch));
    }

    let repository = source
        .repository(repo)
        .await
        .with_context(|| format!("Failed to look up repository {}", repo))?;
    tracing::info!(id = %repository.id, name = %repository.name, "resolved repository");

    Ok(match repository.default_branch.as_deref() {
        Some(branch) => {
            tracing::debug!(branch = friendly_branch_name(branch), "using default branch");
            source.with_branch(branch)
        }
        None => source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_options_merge_excludes() {
        let cli = Cli::try_parse_from(["repo-insights", "--exclude-lang", "node", "--concurrency", "2"])
            .unwrap();
        let mut config = Config::default();
        config.scan.exclude = vec![Ecosystem::Maven];

        let options = scan_options(&cli, &config);
        assert_eq!(options.concurrency, 2);
        assert_eq!(options.ecosystems, vec![Ecosystem::DotNet, Ecosystem::Go]);
    }

    #[test]
    fn test_scan_options_config_concurrency() {
        let cli = Cli::try_parse_from(["repo-insights"]).unwrap();
        let mut config = Config::default();
        config.scan.concurrency = 9;

        let options = scan_options(&cli, &config);
        assert_eq!(options.concurrency, 9);
        assert_eq!(options.ecosystems, Ecosystem::ALL.to_vec());
    }
}
