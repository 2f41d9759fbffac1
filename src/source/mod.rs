//! Content sources: where repository listings and file bytes come from.
//!
//! - [`local`]: a working tree on disk.
//! - [`azure`]: a Git repository hosted on Azure DevOps, via its REST API.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::RepositoryTreeEntry;

pub mod azure;
pub mod local;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Full recursive listing of the repository's files (folders excluded).
    async fn list_tree(&self, repository_id: &str) -> Result<Vec<RepositoryTreeEntry>, SourceError>;

    /// Raw bytes of one file. Never cached.
    async fn file_content(&self, repository_id: &str, path: &str) -> Result<Vec<u8>, SourceError>;
}
