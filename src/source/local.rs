use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;

use crate::error::SourceError;
use crate::models::RepositoryTreeEntry;

/// Reads a repository from a directory on disk.
///
/// The repository id is the directory path. Files ignored by `.gitignore`
/// are left out of the listing so a working tree looks like its commit.
#[derive(Default)]
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl super::ContentSource for LocalSource {
    async fn list_tree(&self, repository_id: &str) -> Result<Vec<RepositoryTreeEntry>, SourceError> {
        let root = PathBuf::from(repository_id);
        if !root.is_dir() {
            return Err(SourceError::NotFound(repository_id.to_string()));
        }

        tokio::task::spawn_blocking(move || walk(&root))
            .await
            .map_err(|e| SourceError::Io(std::io::Error::other(e)))
    }

    async fn file_content(&self, repository_id: &str, path: &str) -> Result<Vec<u8>, SourceError> {
        let full = Path::new(repository_id).join(path.trim_start_matches('/'));
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(full.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn walk(root: &Path) -> Vec<RepositoryTreeEntry> {
    let mut entries = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|e| e.file_name() != ".git")
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        entries.push(RepositoryTreeEntry::new(format!("/{}", path.join("/"))));
    }

    tracing::debug!(root = %root.display(), files = entries.len(), "listed working tree");
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ContentSource;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/package.json"), "{}").unwrap();
        fs::create_dir_all(root.join("svc")).unwrap();
        fs::write(root.join("svc/go.mod"), "module svc").unwrap();
        fs::write(root.join(".gitignore"), "node_modules/\n").unwrap();
        fs::create_dir_all(root.join("web/node_modules/left-pad")).unwrap();
        fs::write(root.join("web/node_modules/left-pad/package.json"), "{}").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/config"), "[core]").unwrap();

        tmp
    }

    #[tokio::test]
    async fn test_list_tree_relative_slash_paths() {
        let tmp = setup();
        let id = tmp.path().to_string_lossy().into_owned();

        let entries = LocalSource::new().list_tree(&id).await.unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();

        assert!(paths.contains(&"/web/package.json"));
        assert!(paths.contains(&"/svc/go.mod"));
        assert!(paths.contains(&"/.gitignore"));
        assert!(!paths.iter().any(|p| p.contains("node_modules")));
        assert!(!paths.iter().any(|p| p.starts_with("/.git/")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = setup();
        let locked = tmp.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("pom.xml"), "<project/>").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let id = tmp.path().to_string_lossy().into_owned();
        let result = LocalSource::new().list_tree(&id).await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let entries = result.unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"/web/package.json"));
        assert!(paths.contains(&"/svc/go.mod"));
    }

    #[tokio::test]
    async fn test_file_content_reads_bytes() {
        let tmp = setup();
        let id = tmp.path().to_string_lossy().into_owned();

        let bytes = LocalSource::new()
            .file_content(&id, "/svc/go.mod")
            .await
            .unwrap();
        assert_eq!(bytes, b"module svc");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let tmp = setup();
        let id = tmp.path().to_string_lossy().into_owned();

        let err = LocalSource::new()
            .file_content(&id, "/nope/pom.xml")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let err = LocalSource::new()
            .list_tree("/definitely/not/a/repo")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
