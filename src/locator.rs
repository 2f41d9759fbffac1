use crate::models::RepositoryTreeEntry;

/// Select the entries whose path ends with `suffix`, keeping listing order.
///
/// Matching is case-sensitive. An empty result means the ecosystem is not
/// present in the repository.
pub fn locate<'a>(entries: &'a [RepositoryTreeEntry], suffix: &str) -> Vec<&'a RepositoryTreeEntry> {
    entries.iter().filter(|e| e.path.ends_with(suffix)).collect()
}
