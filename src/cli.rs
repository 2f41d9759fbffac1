use std::path::PathBuf;

use clap::Parser;

use crate::models::Ecosystem;

#[derive(Parser, Debug)]
#[command(
    name = "repo-insights",
    about = "List the .NET, Node, Go and Maven dependencies declared in a repository",
    version
)]
pub struct Cli {
    /// Local repository path to scan (ignored when --repo is given)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Azure DevOps repository name or id; switches to a remote scan
    #[arg(long)]
    pub repo: Option<String>,

    /// Azure DevOps organization URL [default: from config]
    #[arg(long, value_name = "URL")]
    pub org: Option<String>,

    /// Azure DevOps project [default: from config]
    #[arg(long)]
    pub project: Option<String>,

    /// Branch to read [default: the repository's default branch]
    #[arg(long)]
    pub branch: Option<String>,

    /// Personal access token for Azure DevOps
    #[arg(long, env = "AZURE_DEVOPS_PAT", hide_env_values = true)]
    pub token: Option<String>,

    /// Config file [default: ./.repo-insights/config.toml, fallback ~/.config/repo-insights/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Exclude an ecosystem from scanning (repeatable)
    #[arg(long = "exclude-lang", value_name = "LANG")]
    pub exclude_lang: Vec<EcosystemArg>,

    /// Manifests fetched in parallel per ecosystem [default: from config, 4]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Only print the dependency list
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum EcosystemArg {
    Dotnet,
    Node,
    Go,
    Maven,
}

impl From<&EcosystemArg> for Ecosystem {
    fn from(arg: &EcosystemArg) -> Self {
        match arg {
            EcosystemArg::Dotnet => Ecosystem::DotNet,
            EcosystemArg::Node => Ecosystem::Node,
            EcosystemArg::Go => Ecosystem::Go,
            EcosystemArg::Maven => Ecosystem::Maven,
        }
    }
}
