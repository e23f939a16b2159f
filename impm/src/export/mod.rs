pub mod resolve_script;

use std::path::{Path, PathBuf};

use glob::Pattern;
use immich_core::{Album, ImmichClient};

use crate::config::SyncConfig;
use crate::sync::SyncError;
use crate::sync::aliases::PathAliases;
use crate::sync::library::prepare_library;
use crate::sync::projects::{DiscoveredProject, discover, filter_projects};
use resolve_script::ResolveImportScript;

pub const DEFAULT_EXPORT_DIR: &str = "scripts";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub filter: Option<Pattern>,
    pub out_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filter: None,
            out_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
        }
    }
}

/// Writes one Resolve import script per project from the albums already on
/// the server.
pub struct Exporter {
    client: ImmichClient,
    library_name: String,
    aliases: PathAliases,
}

impl Exporter {
    pub fn new(client: ImmichClient, library_name: impl Into<String>, aliases: PathAliases) -> Self {
        Self {
            client,
            library_name: library_name.into(),
            aliases,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = ImmichClient::new(&config.base_url, config.api_key.clone())?;
        Ok(Self::new(
            client,
            config.library_name.clone(),
            config.aliases.clone(),
        ))
    }

    /// Returns the scripts written.
    pub async fn run(&self, options: &ExportOptions) -> Result<Vec<PathBuf>, SyncError> {
        let search_paths =
            prepare_library(&self.client, &self.library_name, &self.aliases, false).await?;
        let albums = self.client.list_albums().await?;
        let roots: Vec<&Path> = search_paths.iter().map(|p| p.local.as_path()).collect();
        let projects = filter_projects(discover(&roots), options.filter.as_ref());

        let mut written = Vec::new();
        for project in &projects {
            if let Some(path) = self.export_project(project, &albums, &options.out_dir).await? {
                written.push(path);
            }
        }
        Ok(written)
    }

    async fn export_project(
        &self,
        project: &DiscoveredProject,
        albums: &[Album],
        out_dir: &Path,
    ) -> Result<Option<PathBuf>, SyncError> {
        let name = project.name();
        let owned: Vec<&Album> = albums
            .iter()
            .filter(|album| album.album_name.starts_with(name))
            .collect();
        tracing::info!(project = %name, count = owned.len(), "exporting albums");

        let mut script = ResolveImportScript::new();
        for album in owned {
            let detail = self.client.get_album_info(&album.id).await?;
            let files: Vec<String> = detail
                .assets
                .iter()
                .map(|asset| self.aliases.resolve(&asset.original_path))
                .collect();
            if files.is_empty() {
                tracing::warn!(project = %name, album = %detail.album_name, "album has no assets");
                continue;
            }

            let folder = folder_name(name, &detail.album_name);
            let added = if folder.is_empty() {
                script.add_files_to_root(&files)
            } else {
                script.create_subfolder_with_files(&folder, &files)
            };
            if let Err(err) = added {
                tracing::warn!(project = %name, album = %detail.album_name, "skipping album: {err}");
            }
        }

        if script.operation_count() == 0 {
            tracing::info!(project = %name, "nothing to export");
            return Ok(None);
        }

        let target = script_path(out_dir, name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tracing::info!(project = %name, path = %target.display(), "writing script");
        tokio::fs::write(&target, script.render()).await?;
        Ok(Some(target))
    }
}

/// `"Trip / Export"` owned by `"Trip"` -> `"Export"`; the primary album maps
/// to an empty name.
pub fn folder_name(project_name: &str, album_name: &str) -> String {
    album_name
        .replacen(project_name, "", 1)
        .replacen(" /", "", 1)
        .trim()
        .to_string()
}

/// `"2024 / Trip"` -> `<out_dir>/2024/Trip.py`.
pub fn script_path(out_dir: &Path, project_name: &str) -> PathBuf {
    out_dir.join(format!("{}.py", project_name.replacen(" / ", "/", 1)))
}
