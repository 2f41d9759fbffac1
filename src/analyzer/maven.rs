use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::models::{Dependency, Ecosystem};

/// Analyzer for Maven `pom.xml` files.
///
/// Reads the first `<dependencies>` element in document order, wherever it
/// is nested, and emits each `<dependency>` as `groupId:artifactId`. Versions
/// are not recorded: POMs often leave them to a parent or an imported BOM.
pub struct MavenAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    GroupId,
    ArtifactId,
}

#[derive(Default)]
struct Coordinates {
    group_id: Option<String>,
    artifact_id: Option<String>,
}

impl super::Analyzer for MavenAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn analyze(&self, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut deps = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut buf = Vec::new();

        let mut depth: usize = 0;
        let mut dependencies_depth: Option<usize> = None;
        let mut dependency_depth: Option<usize> = None;
        let mut current = Coordinates::default();
        let mut capture: Option<Field> = None;
        let mut text = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    depth += 1;
                    let name = e.name();
                    let name = name.local_name();

                    if dependencies_depth.is_none() {
                        if name.as_ref() == b"dependencies" {
                            dependencies_depth = Some(depth);
                        }
                    } else if dependency_depth.is_none() {
                        if name.as_ref() == b"dependency" {
                            dependency_depth = Some(depth);
                            current = Coordinates::default();
                        }
                    } else if capture.is_none() {
                        // First occurrence wins, as with a descendant lookup.
                        capture = match name.as_ref() {
                            b"groupId" if current.group_id.is_none() => Some(Field::GroupId),
                            b"artifactId" if current.artifact_id.is_none() => {
                                Some(Field::ArtifactId)
                            }
                            _ => None,
                        };
                        text.clear();
                    }
                }
                Event::Empty(ref e) => {
                    // A self-closing first <dependencies/> ends the search.
                    if dependencies_depth.is_none()
                        && e.name().local_name().as_ref() == b"dependencies"
                    {
                        break;
                    }
                }
                Event::Text(ref e) if capture.is_some() => {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
                Event::CData(ref e) if capture.is_some() => {
                    text.push_str(&String::from_utf8_lossy(e));
                }
                Event::End(ref e) => {
                    let name = e.name();
                    let name = name.local_name();

                    match (capture, name.as_ref()) {
                        (Some(Field::GroupId), b"groupId") => {
                            current.group_id = Some(text.trim().to_string());
                            capture = None;
                        }
                        (Some(Field::ArtifactId), b"artifactId") => {
                            current.artifact_id = Some(text.trim().to_string());
                            capture = None;
                        }
                        _ => {}
                    }

                    if dependency_depth == Some(depth) {
                        let coordinates = std::mem::take(&mut current);
                        match (coordinates.group_id, coordinates.artifact_id) {
                            (Some(group_id), Some(artifact_id))
                                if !group_id.is_empty() && !artifact_id.is_empty() =>
                            {
                                let key = format!("{}:{}", group_id, artifact_id);
                                if seen.insert(key.clone()) {
                                    deps.push(Dependency::unversioned(Ecosystem::Maven, key));
                                }
                            }
                            _ => tracing::trace!("skipping dependency without groupId/artifactId"),
                        }
                        dependency_depth = None;
                        capture = None;
                    } else if dependencies_depth == Some(depth) {
                        break;
                    }

                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(deps)
    }
}
