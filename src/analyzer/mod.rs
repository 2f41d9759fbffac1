use std::borrow::Cow;

use crate::error::ParseError;
use crate::models::{Dependency, Ecosystem};

pub mod dotnet;
pub mod go;
pub mod maven;
pub mod node;

/// Extracts declared dependencies from the text of one manifest file.
///
/// Analyzers hold no state between calls; the same instance can serve any
/// number of scans.
pub trait Analyzer: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    fn analyze(&self, content: &str) -> Result<Vec<Dependency>, ParseError>;
}

/// The analyzer responsible for `ecosystem`'s manifests.
pub fn for_ecosystem(ecosystem: Ecosystem) -> &'static dyn Analyzer {
    match ecosystem {
        Ecosystem::DotNet => &dotnet::DotNetAnalyzer,
        Ecosystem::Node => &node::NodeAnalyzer,
        Ecosystem::Go => &go::GoAnalyzer,
        Ecosystem::Maven => &maven::MavenAnalyzer,
    }
}

/// Decode manifest bytes as UTF-8, replacing invalid sequences and dropping a
/// leading byte-order mark.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(rest) => Cow::Owned(rest.to_string()),
            None => Cow::Owned(s),
        },
    }
}
