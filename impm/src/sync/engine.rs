use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt};
use glob::Pattern;
use immich_core::ImmichClient;
use walkdir::WalkDir;

use super::SyncError;
use super::albums::{AddSummary, AlbumCatalog, ResolvedAsset, assign_members};
use super::aliases::PathAliases;
use super::library::prepare_library;
use super::projects::{DiscoveredProject, discover, filter_projects};
use super::proxy::{AssetWithProxy, DEFAULT_UPDATE_SCRIPT, proxy_path_for, write_update_script};
use crate::config::SyncConfig;

const MAX_CONCURRENT_LOOKUPS: usize = 16;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub filter: Option<Pattern>,
    pub scan: bool,
    pub update_script: PathBuf,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            filter: None,
            scan: true,
            update_script: PathBuf::from(DEFAULT_UPDATE_SCRIPT),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub projects: usize,
    pub albums_created: usize,
    pub albums_failed: usize,
    pub assets_added: usize,
    pub assets_already_present: usize,
    pub assets_failed: usize,
    pub proxies: Vec<AssetWithProxy>,
}

#[derive(Debug, Default)]
struct FileMatch {
    assets: Vec<ResolvedAsset>,
    proxies: Vec<AssetWithProxy>,
}

pub struct SyncEngine {
    client: ImmichClient,
    library_name: String,
    aliases: PathAliases,
    file_extensions: Vec<String>,
}

impl SyncEngine {
    pub fn new(
        client: ImmichClient,
        library_name: impl Into<String>,
        aliases: PathAliases,
        file_extensions: Vec<String>,
    ) -> Self {
        Self {
            client,
            library_name: library_name.into(),
            aliases,
            file_extensions,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = ImmichClient::new(&config.base_url, config.api_key.clone())?;
        Ok(Self::new(
            client,
            config.library_name.clone(),
            config.aliases.clone(),
            config.file_extensions.clone(),
        ))
    }

    /// Converges every discovered project's albums with its directory tree.
    ///
    /// Library lookup and the album snapshot are fatal when they fail; after
    /// that, failures are confined to the file or album they concern.
    pub async fn run(&self, options: &SyncOptions) -> Result<SyncReport, SyncError> {
        let search_paths =
            prepare_library(&self.client, &self.library_name, &self.aliases, options.scan).await?;
        let mut catalog = AlbumCatalog::fetch(&self.client).await?;

        let roots: Vec<&Path> = search_paths.iter().map(|p| p.local.as_path()).collect();
        let projects = filter_projects(discover(&roots), options.filter.as_ref());

        let mut report = SyncReport::default();
        for project in &projects {
            self.sync_project(project, &mut catalog, &mut report).await;
            report.projects += 1;
        }
        report.albums_created = catalog.created();

        if !report.proxies.is_empty() {
            tracing::info!(
                count = report.proxies.len(),
                path = %options.update_script.display(),
                "found assets with proxies, writing update script"
            );
            write_update_script(&options.update_script, &report.proxies).await?;
        }

        tracing::info!(
            projects = report.projects,
            albums_created = report.albums_created,
            added = report.assets_added,
            already_present = report.assets_already_present,
            failed = report.assets_failed,
            "sync finished"
        );
        Ok(report)
    }

    pub async fn sync_project(
        &self,
        project: &DiscoveredProject,
        catalog: &mut AlbumCatalog,
        report: &mut SyncReport,
    ) {
        let name = project.name();
        tracing::info!(
            project = %name,
            root = %project.root.display(),
            "found project definition"
        );

        let files = self.list_media_files(&project.root);
        tracing::info!(project = %name, count = files.len(), "found files");

        let matches: Vec<FileMatch> = stream::iter(files.iter())
            .map(|file| self.match_file(name, file))
            .buffered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;
        let mut assets = Vec::new();
        for matched in matches {
            assets.extend(matched.assets);
            report.proxies.extend(matched.proxies);
        }
        tracing::info!(project = %name, count = assets.len(), "found existing assets");

        let targets = project.album_targets();
        let members = assign_members(&targets, &assets);
        for (target, ids) in targets.iter().zip(members) {
            let album = match catalog.find_or_create(&self.client, &target.name).await {
                Ok(album) => album,
                Err(err) => {
                    tracing::error!(
                        project = %name,
                        album = %target.name,
                        "failed to find or create album: {err}"
                    );
                    report.albums_failed += 1;
                    continue;
                }
            };
            if ids.is_empty() {
                tracing::info!(project = %name, album = %target.name, "no assets to add");
                continue;
            }

            let responses = match self.client.add_assets_to_album(&album.id, &ids).await {
                Ok(responses) => responses,
                Err(err) => {
                    tracing::error!(
                        project = %name,
                        album = %target.name,
                        "failed to add assets: {err}"
                    );
                    report.albums_failed += 1;
                    report.assets_failed += ids.len();
                    continue;
                }
            };
            let summary = AddSummary::from_responses(&responses);
            tracing::info!(
                project = %name,
                album = %target.name,
                added = summary.added,
                already_present = summary.already_present,
                "successfully added {} assets",
                summary.succeeded()
            );
            if summary.failed > 0 {
                tracing::warn!(
                    project = %name,
                    album = %target.name,
                    "failed to add {} assets, error summary: {:?}",
                    summary.failed,
                    summary.errors
                );
            }
            report.assets_added += summary.added;
            report.assets_already_present += summary.already_present;
            report.assets_failed += summary.failed;
        }
    }

    /// Files under `root` whose name ends with a configured extension, sorted.
    pub fn list_media_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(root = %root.display(), "skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                self.file_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
            })
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    }

    async fn match_file(&self, project: &str, file: &Path) -> FileMatch {
        let remote_path = self.aliases.unresolve_path(file);
        let found = match self.client.search_metadata_by_path(&remote_path).await {
            Ok(found) => found,
            Err(err) => {
                tracing::error!(
                    project = %project,
                    file = %file.display(),
                    "error searching metadata: {err}"
                );
                return FileMatch::default();
            }
        };
        // The server's path search is looser than equality.
        let (found, near_misses): (Vec<_>, Vec<_>) = found
            .into_iter()
            .partition(|asset| asset.original_path == remote_path);
        if !near_misses.is_empty() {
            tracing::debug!(
                project = %project,
                file = %file.display(),
                ignored = near_misses.len(),
                "ignoring search hits with a different original path"
            );
        }

        let mut matched = FileMatch::default();
        if let Some(proxy) = proxy_path_for(file)
            && tokio::fs::try_exists(&proxy).await.unwrap_or(false)
        {
            let encoded_video_path = self.aliases.unresolve_path(&proxy);
            tracing::debug!(project = %project, proxy = %encoded_video_path, "found proxy");
            matched.proxies = found
                .iter()
                .map(|asset| AssetWithProxy {
                    id: asset.id.clone(),
                    encoded_video_path: encoded_video_path.clone(),
                })
                .collect();
        }
        matched.assets = found
            .into_iter()
            .map(|asset| ResolvedAsset {
                id: asset.id,
                path: file.to_path_buf(),
            })
            .collect();
        matched
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
