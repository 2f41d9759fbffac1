//! `go.mod` parsing.
//!
//! Only `require` directives are read, in both the block form
//!
//! ```text
//! require (
//! 	github.com/foo/bar v1.2.3
//! )
//! ```
//!
//! and the single-line form `require github.com/foo/bar v1.2.3`. Anything
//! after the module path is kept verbatim as the version, so trailing
//! comments such as `// indirect` stay part of it.

use std::collections::HashSet;

use crate::error::ParseError;
use crate::models::{Dependency, Ecosystem};

pub struct GoAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    InRequireBlock,
}

impl super::Analyzer for GoAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn analyze(&self, content: &str) -> Result<Vec<Dependency>, ParseError> {
        Ok(parse_go_mod(content))
    }
}

fn parse_go_mod(content: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut state = ScanState::Scanning;

    let mut push = |decl: &str| {
        if let Some((module, version)) = split_declaration(decl) {
            if seen.insert((module.to_string(), version.to_string())) {
                deps.push(Dependency::new(Ecosystem::Go, module, version));
            }
        }
    };

    for line in content.lines() {
        let line = line.trim();

        state = match state {
            ScanState::Scanning => match require_directive(line) {
                Some("(") => ScanState::InRequireBlock,
                Some(decl) => {
                    push(decl);
                    ScanState::Scanning
                }
                None => ScanState::Scanning,
            },
            ScanState::InRequireBlock => {
                if line.starts_with(')') {
                    ScanState::Scanning
                } else {
                    if !line.is_empty() && !line.starts_with("//") {
                        push(line);
                    }
                    ScanState::InRequireBlock
                }
            }
        };
    }

    if state == ScanState::InRequireBlock {
        tracing::debug!("go.mod ended inside an unterminated require block");
    }

    deps
}

/// Text following a `require` keyword, or `None` for any other directive.
fn require_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("require")?;
    if rest.starts_with('(') {
        return Some("(");
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let rest = rest.trim_start();
    if rest.starts_with('(') {
        Some("(")
    } else if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Split `module version...` at the first whitespace.
fn split_declaration(decl: &str) -> Option<(&str, &str)> {
    let (module, version) = decl.split_once(char::is_whitespace)?;
    let version = version.trim();
    if module.is_empty() || version.is_empty() {
        return None;
    }
    Some((module, version))
}
