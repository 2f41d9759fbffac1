use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use crate::error::SourceError;
use crate::models::RepositoryTreeEntry;

pub const DEFAULT_API_VERSION: &str = "7.1";

/// Connection settings for an Azure DevOps project.
#[derive(Debug, Clone)]
pub struct AzureSettings {
    /// Organization URL, e.g. `https://dev.azure.com/contoso`.
    pub organization: String,
    pub project: String,
    /// Personal access token, sent as Basic auth with an empty user name.
    pub token: Option<String>,
    /// Branch to read; `None` reads the repository's default branch.
    pub branch: Option<String>,
    pub api_version: String,
    pub timeout: Duration,
}

/// Repository metadata returned by `GET .../git/repositories/{repo}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemList {
    #[serde(default)]
    value: Vec<GitItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitItem {
    path: String,
    #[serde(default)]
    is_folder: bool,
}

/// Reads repositories through the Azure DevOps Git Items REST API.
pub struct AzureDevOpsSource {
    client: Client,
    settings: AzureSettings,
}

impl AzureDevOpsSource {
    pub fn new(settings: AzureSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("repo-insights/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Pin reads to `branch` (friendly or `refs/heads/` form).
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.settings.branch = Some(friendly_branch_name(branch).to_string());
        self
    }

    pub fn branch(&self) -> Option<&str> {
        self.settings.branch.as_deref()
    }

    /// Look up a repository by name or id.
    pub async fn repository(&self, repository_id: &str) -> Result<GitRepository, SourceError> {
        let url = self.repository_url(repository_id)?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        Ok(response.json().await?)
    }

    fn repository_url(&self, repository_id: &str) -> Result<Url, SourceError> {
        let base = format!(
            "{}/{}/_apis/git/repositories/{}",
            self.settings.organization.trim_end_matches('/'),
            self.settings.project,
            repository_id
        );
        parse_url(&base, &[("api-version", self.settings.api_version.as_str())])
    }

    fn items_url(&self, repository_id: &str, extra: &[(&str, &str)]) -> Result<Url, SourceError> {
        let base = format!(
            "{}/{}/_apis/git/repositories/{}/items",
            self.settings.organization.trim_end_matches('/'),
            self.settings.project,
            repository_id
        );

        let mut params: Vec<(&str, &str)> = extra.to_vec();
        if let Some(branch) = &self.settings.branch {
            params.push(("versionDescriptor.version", branch.as_str()));
            params.push(("versionDescriptor.versionType", "branch"));
        }
        params.push(("api-version", self.settings.api_version.as_str()));

        parse_url(&base, &params)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<reqwest::Response, SourceError> {
        let request = match &self.settings.token {
            Some(token) => request.basic_auth("", Some(token)),
            None => request,
        };

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(SourceError::NotFound(url.to_string())),
            status => Err(SourceError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

#[async_trait]
impl super::ContentSource for AzureDevOpsSource {
    async fn list_tree(&self, repository_id: &str) -> Result<Vec<RepositoryTreeEntry>, SourceError> {
        let url = self.items_url(repository_id, &[("recursionLevel", "Full")])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let items: ItemList = response.json().await?;

        let entries: Vec<RepositoryTreeEntry> = items
            .value
            .into_iter()
            .filter(|item| !item.is_folder)
            .map(|item| RepositoryTreeEntry::new(item.path))
            .collect();

        tracing::debug!(repository = repository_id, files = entries.len(), "listed repository tree");
        Ok(entries)
    }

    async fn file_content(&self, repository_id: &str, path: &str) -> Result<Vec<u8>, SourceError> {
        let url = self.items_url(repository_id, &[("path", path), ("$format", "octetStream")])?;
        let response = self
            .send(
                self.client
                    .get(url.clone())
                    .header("Accept", "application/octet-stream"),
                &url,
            )
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn parse_url(base: &str, params: &[(&str, &str)]) -> Result<Url, SourceError> {
    Url::parse_with_params(base, params).map_err(|e| SourceError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Strip the `refs/heads/` prefix from a branch ref.
pub fn friendly_branch_name(branch: &str) -> &str {
    branch.strip_prefix("refs/heads/").unwrap_or(branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(branch: Option<&str>) -> AzureSettings {
        AzureSettings {
            organization: "https://dev.azure.com/contoso/".to_string(),
            project: "Fabrikam Fiber".to_string(),
            token: None,
            branch: branch.map(str::to_string),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_friendly_branch_name() {
        assert_eq!(friendly_branch_name("refs/heads/main"), "main");
        assert_eq!(friendly_branch_name("refs/heads/feature/x"), "feature/x");
        assert_eq!(friendly_branch_name("develop"), "develop");
    }

    #[test]
    fn test_tree_url_without_branch() {
        let source = AzureDevOpsSource::new(settings(None)).unwrap();
        let url = source
            .items_url("web", &[("recursionLevel", "Full")])
            .unwrap();

        assert_eq!(url.path(), "/contoso/Fabrikam%20Fiber/_apis/git/repositories/web/items");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("recursionLevel".to_string(), "Full".to_string()),
                ("api-version".to_string(), "7.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_content_url_pins_branch() {
        let source = AzureDevOpsSource::new(settings(None))
            .unwrap()
            .with_branch("refs/heads/release/2.0");
        assert_eq!(source.branch(), Some("release/2.0"));

        let url = source
            .items_url("web", &[("path", "/src/go.mod"), ("$format", "octetStream")])
            .unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("path".to_string(), "/src/go.mod".to_string())));
        assert!(query.contains(&(
            "versionDescriptor.version".to_string(),
            "release/2.0".to_string()
        )));
        assert!(query.contains(&(
            "versionDescriptor.versionType".to_string(),
            "branch".to_string()
        )));
    }

    #[test]
    fn test_bad_organization_is_invalid_url() {
        let mut bad = settings(None);
        bad.organization = "dev.azure.com/contoso".to_string();
        let source = AzureDevOpsSource::new(bad).unwrap();

        let err = source.items_url("web", &[]).unwrap_err();
        assert!(matches!(err, SourceError::InvalidUrl { .. }));
        assert!(err.to_string().contains("dev.azure.com/contoso"));
    }

    #[test]
    fn test_item_list_drops_folders() {
        let payload = r#"{
  "count": 3,
  "value": [
    { "objectId": "a", "gitObjectType": "tree", "path": "/", "isFolder": true },
    { "objectId": "b", "gitObjectType": "tree", "path": "/src", "isFolder": true },
    { "objectId": "c", "gitObjectType": "blob", "path": "/src/App.csproj" }
  ]
}"#;
        let items: ItemList = serde_json::from_str(payload).unwrap();
        let files: Vec<&str> = items
            .value
            .iter()
            .filter(|i| !i.is_folder)
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(files, vec!["/src/App.csproj"]);
    }

    #[test]
    fn test_repository_payload() {
        let payload = r#"{
  "id": "5febef5a-833d-4e14-b9c0-14cb638f91e6",
  "name": "web",
  "defaultBranch": "refs/heads/main",
  "size": 1024
}"#;
        let repo: GitRepository = serde_json::from_str(payload).unwrap();
        assert_eq!(repo.name, "web");
        assert_eq!(repo.default_branch.as_deref().map(friendly_branch_name), Some("main"));
    }
}
