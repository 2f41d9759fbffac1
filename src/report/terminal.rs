use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{Dependency, EcosystemOutcome, ScanReport};

pub const NO_DEPENDENCIES: &str =
    "No dependencies found. The supported repository types are: .NET, Node, Go, Maven";

/// Render a colored terminal report.
pub fn render(report: &ScanReport, target: &str, quiet: bool) {
    if quiet {
        for key in report.keys() {
            println!("{}", key);
        }
        return;
    }

    let deps = report.dependencies();

    println!(
        "\n {} v{}",
        "repo-insights".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", target);

    for line in summary_lines(report) {
        println!("  {}", line);
    }
    println!();

    if deps.is_empty() {
        println!(" {}\n", NO_DEPENDENCIES.dimmed());
    } else {
        println!(" {}\n", format!("Dependencies ({})", deps.len()).bold());
        println!("{}\n", dependency_table(&deps));
    }

    let errors = report.errors();
    if !errors.is_empty() {
        println!(" {} Manifests that could not be read:\n", "[WARN]".yellow().bold());
        for error in errors {
            println!("  {} {}", "⚠".yellow(), error);
        }
        println!();
    }
}

fn summary_lines(report: &ScanReport) -> Vec<String> {
    report
        .ecosystems
        .iter()
        .map(|r| match &r.outcome {
            EcosystemOutcome::Absent => format!("{} {:<6} no manifests", "·".dimmed(), r.ecosystem),
            EcosystemOutcome::Collected {
                manifests,
                dependencies,
                skipped,
            } => {
                let mut line = format!(
                    "{} {:<6} {} dependencies from {} manifest(s)",
                    "✓".green(),
                    r.ecosystem,
                    dependencies.len(),
                    manifests
                );
                if !skipped.is_empty() {
                    line.push_str(&format!(", {} skipped", skipped.len()).yellow().to_string());
                }
                line
            }
            EcosystemOutcome::Failed { manifests, .. } => format!(
                "{} {:<6} {}",
                "✗".red(),
                r.ecosystem,
                format!("all {} manifest(s) failed", manifests).red()
            ),
        })
        .collect()
}

fn dependency_table(deps: &[Dependency]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Dependency").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("Ecosystem").add_attribute(Attribute::Bold),
        ]);

    for dep in deps {
        let version = match &dep.version {
            Some(v) => Cell::new(v),
            None => Cell::new("—").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&dep.name),
            version,
            Cell::new(dep.ecosystem.to_string()),
        ]);
    }

    table
}
