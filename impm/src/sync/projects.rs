use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Deserializer, Serialize};
use walkdir::WalkDir;

pub const PROJECT_FILE_NAME: &str = "immich-project.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDefinition {
    pub name: String,
    #[serde(default, deserialize_with = "skip_null_entries")]
    pub sub_albums: Vec<SubAlbum>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubAlbum {
    pub suffix: String,
    pub path: String,
}

fn skip_null_entries<'de, D>(deserializer: D) -> Result<Vec<SubAlbum>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<Option<SubAlbum>>> = Option::deserialize(deserializer)?;
    Ok(entries.unwrap_or_default().into_iter().flatten().collect())
}

/// A definition file found on disk; its directory is the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredProject {
    pub definition_path: PathBuf,
    pub root: PathBuf,
    pub definition: ProjectDefinition,
}

/// An album the project owns, with the directory that decides membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTarget {
    pub name: String,
    pub root: PathBuf,
    pub primary: bool,
}

impl DiscoveredProject {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Primary album first, then one album per sub-album in declaration order.
    pub fn album_targets(&self) -> Vec<AlbumTarget> {
        let mut targets = Vec::with_capacity(self.definition.sub_albums.len() + 1);
        targets.push(AlbumTarget {
            name: self.definition.name.clone(),
            root: self.root.clone(),
            primary: true,
        });
        for sub in &self.definition.sub_albums {
            targets.push(AlbumTarget {
                name: format!("{}{}", self.definition.name, sub.suffix),
                root: self.root.join(sub.path.trim_start_matches('/')),
                primary: false,
            });
        }
        targets
    }
}

/// Walks every root for definition files. Unreadable or malformed
/// definitions are logged and skipped.
pub fn discover<P: AsRef<Path>>(roots: &[P]) -> Vec<DiscoveredProject> {
    let mut projects = Vec::new();
    for root in roots {
        let root = root.as_ref();
        let mut found: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(root = %root.display(), "skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == PROJECT_FILE_NAME)
            .map(|entry| entry.into_path())
            .collect();
        found.sort();

        for definition_path in found {
            match load_definition(&definition_path) {
                Ok(definition) => {
                    let root = definition_path
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    projects.push(DiscoveredProject {
                        definition_path,
                        root,
                        definition,
                    });
                }
                Err(err) => {
                    tracing::error!(
                        path = %definition_path.display(),
                        "failed to load project definition: {err:#}"
                    );
                }
            }
        }
    }
    projects
}

pub fn load_definition(path: &Path) -> anyhow::Result<ProjectDefinition> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Keeps projects whose name matches `pattern`; no pattern keeps everything.
pub fn filter_projects(
    projects: Vec<DiscoveredProject>,
    pattern: Option<&Pattern>,
) -> Vec<DiscoveredProject> {
    let Some(pattern) = pattern else {
        return projects;
    };
    projects
        .into_iter()
        .filter(|project| {
            let keep = pattern.matches(project.name());
            if !keep {
                tracing::info!(project = %project.name(), "skipping project");
            }
            keep
        })
        .collect()
}
