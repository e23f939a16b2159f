use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use immich_core::{Album, BulkIdResponse, ImmichClient, ImmichError};

use super::projects::AlbumTarget;

/// Snapshot of the server's albums, fetched once per run.
///
/// Albums created through [`AlbumCatalog::find_or_create`] are appended, so a
/// name is created at most once per run. Two runs racing each other can still
/// both create the same album: the catalog assumes a single writer.
#[derive(Debug, Default)]
pub struct AlbumCatalog {
    albums: Vec<Album>,
    created: usize,
}

impl AlbumCatalog {
    pub fn new(albums: Vec<Album>) -> Self {
        Self {
            albums,
            created: 0,
        }
    }

    pub async fn fetch(client: &ImmichClient) -> Result<Self, ImmichError> {
        Ok(Self::new(client.list_albums().await?))
    }

    pub fn find(&self, name: &str) -> Option<&Album> {
        self.albums.iter().find(|album| album.album_name == name)
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub async fn find_or_create(
        &mut self,
        client: &ImmichClient,
        name: &str,
    ) -> Result<Album, ImmichError> {
        if let Some(album) = self.find(name) {
            return Ok(album.clone());
        }
        tracing::info!(album = %name, "creating album");
        let album = client.create_album(name).await?;
        self.albums.push(album.clone());
        self.created += 1;
        Ok(album)
    }
}

/// A remote asset matched to the local file it was imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub id: String,
    pub path: PathBuf,
}

/// Splits matched assets across a project's albums by directory.
///
/// Each sub-album receives the assets whose file lies under its root. The
/// primary album receives the assets no sub-album claimed. Overlapping
/// sub-album roots yield the same asset in several sub-albums.
pub fn assign_members(targets: &[AlbumTarget], assets: &[ResolvedAsset]) -> Vec<Vec<String>> {
    let mut members = vec![Vec::new(); targets.len()];
    for asset in assets {
        let mut claimed = false;
        for (index, target) in targets.iter().enumerate() {
            if !target.primary && is_under(&asset.path, &target.root) {
                members[index].push(asset.id.clone());
                claimed = true;
            }
        }
        if claimed {
            continue;
        }
        for (index, target) in targets.iter().enumerate() {
            if target.primary && is_under(&asset.path, &target.root) {
                members[index].push(asset.id.clone());
            }
        }
    }
    members
}

fn is_under(path: &Path, root: &Path) -> bool {
    path.starts_with(root) && path != root
}

/// Outcome of one bulk add, with failures grouped by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSummary {
    pub added: usize,
    pub already_present: usize,
    pub failed: usize,
    pub errors: BTreeMap<String, usize>,
}

impl AddSummary {
    pub fn from_responses(responses: &[BulkIdResponse]) -> Self {
        let mut summary = Self::default();
        for response in responses {
            if response.success {
                summary.added += 1;
            } else if response.is_present() {
                summary.already_present += 1;
            } else {
                summary.failed += 1;
                let reason = response
                    .error
                    .map(|error| error.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                *summary.errors.entry(reason).or_default() += 1;
            }
        }
        summary
    }

    pub fn succeeded(&self) -> usize {
        self.added + self.already_present
    }
}
