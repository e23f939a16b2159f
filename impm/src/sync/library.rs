use std::path::PathBuf;

use immich_core::{ImmichClient, Library};

use super::SyncError;
use super::aliases::PathAliases;

/// A library import path that is reachable on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    /// The import path as the server knows it.
    pub import_path: String,
    /// Where that path is mounted locally.
    pub local: PathBuf,
}

pub async fn find_library(client: &ImmichClient, name: &str) -> Result<Library, SyncError> {
    client
        .list_libraries()
        .await?
        .into_iter()
        .find(|library| library.name == name)
        .ok_or_else(|| SyncError::LibraryNotFound(name.to_string()))
}

pub async fn search_paths(
    library: &Library,
    aliases: &PathAliases,
) -> Result<Vec<SearchPath>, SyncError> {
    let import_paths = library
        .import_paths
        .as_ref()
        .ok_or_else(|| SyncError::MissingImportPaths(library.name.clone()))?;

    let mut accessible = Vec::with_capacity(import_paths.len());
    for import_path in import_paths {
        let local = aliases.resolve_path(import_path);
        match tokio::fs::metadata(&local).await {
            Ok(_) => {
                tracing::info!(path = %import_path, "import path exists");
                accessible.push(SearchPath {
                    import_path: import_path.clone(),
                    local,
                });
            }
            Err(err) => {
                tracing::error!(
                    path = %import_path,
                    local = %local.display(),
                    "import path does not exist: {err}"
                );
            }
        }
    }
    Ok(accessible)
}

/// Locates the configured library, optionally triggers a scan, and returns
/// the import paths that can be searched locally.
pub async fn prepare_library(
    client: &ImmichClient,
    library_name: &str,
    aliases: &PathAliases,
    scan: bool,
) -> Result<Vec<SearchPath>, SyncError> {
    let library = find_library(client, library_name).await?;
    if scan {
        tracing::info!(library = %library.name, id = %library.id, "scanning library");
        client.scan_library(&library.id).await?;
    }
    search_paths(&library, aliases).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn inaccessible_import_paths_are_excluded() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("Projects");
        std::fs::create_dir_all(&present).unwrap();
        let aliases = PathAliases::new(vec![(
            "/usr/src/app/external".into(),
            dir.path().to_string_lossy().into_owned(),
        )]);
        let library = Library {
            id: "lib-1".into(),
            name: "Archive".into(),
            import_paths: Some(vec![
                "/usr/src/app/external/Projects".into(),
                "/usr/src/app/external/Missing".into(),
            ]),
        };

        let paths = search_paths(&library, &aliases).await.unwrap();

        assert_eq!(
            paths,
            vec![SearchPath {
                import_path: "/usr/src/app/external/Projects".into(),
                local: present,
            }]
        );
    }

    #[tokio::test]
    async fn missing_import_paths_is_fatal() {
        let library = Library {
            id: "lib-1".into(),
            name: "Archive".into(),
            import_paths: None,
        };
        let err = search_paths(&library, &PathAliases::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingImportPaths(name) if name == "Archive"));
    }
}
