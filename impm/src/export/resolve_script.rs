//! Renders a DaVinci Resolve Python script that imports media into the
//! current project's media pool.
//!
//! The output format belongs to Resolve's scripting API. Folder names and
//! paths are pasted into double-quoted Python strings without escaping.

use thiserror::Error;

const OPERATIONS_PLACEHOLDER: &str = "{operations}";

const SCRIPT_TEMPLATE: &str = r#"#!/usr/bin/env python
import DaVinciResolveScript as dvr_script

def get_media_pool():
  """Initialize connection to Resolve and get media pool."""
  resolve = dvr_script.scriptapp("Resolve")
  project_manager = resolve.GetProjectManager()
  current_project = project_manager.GetCurrentProject()
  if not current_project:
      raise Exception("No project is currently open")
  return current_project.GetMediaPool()

def main():
  try:
    media_pool = get_media_pool()
    root_folder = media_pool.GetRootFolder()
{operations}
  except Exception as e:
    print(f"Error: {str(e)}")
    return False
  return True

if __name__ == "__main__":
  main()
"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("file path list cannot be empty")]
    NoFiles,
    #[error("folder name cannot be empty")]
    EmptyFolderName,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveImportScript {
    /// Python blocks, one per import operation, in insertion order.
    operations: Vec<String>,
}

impl ResolveImportScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_files_to_root(&mut self, file_paths: &[String]) -> Result<(), ScriptError> {
        if file_paths.is_empty() {
            return Err(ScriptError::NoFiles);
        }
        let paths = quote_paths(file_paths);
        let code = format!(
            r#"    # Import files to root folder
    print("Importing files to root folder...")
    media_pool.SetCurrentFolder(root_folder)
    clips = media_pool.ImportMedia([{paths}])
    if not clips:
      print("Failed to import some or all files to root folder")
"#
        );
        self.operations.push(code);
        Ok(())
    }

    pub fn create_subfolder_with_files(
        &mut self,
        folder_name: &str,
        file_paths: &[String],
    ) -> Result<(), ScriptError> {
        let folder = folder_name.trim();
        if folder.is_empty() {
            return Err(ScriptError::EmptyFolderName);
        }
        if file_paths.is_empty() {
            return Err(ScriptError::NoFiles);
        }
        let paths = quote_paths(file_paths);
        let code = format!(
            r#"    # Create subfolder and import files
    print("Checking if subfolder '{folder}' exists...")
    existing_folders = root_folder.GetSubFolderList()
    if "{folder}" in [folder.GetName() for folder in existing_folders]:
      new_folder = next(folder for folder in existing_folders if folder.GetName() == "{folder}")
      print("Subfolder '{folder}' already exists.")
    else:
      print("Creating subfolder '{folder}'...")
      new_folder = media_pool.AddSubFolder(root_folder, "{folder}")
      if not new_folder:
        raise Exception("Failed to create subfolder: {folder}")
    media_pool.SetCurrentFolder(new_folder)
    clips = media_pool.ImportMedia([{paths}])
    if not clips:
      print("Failed to import some or all files to subfolder")
    media_pool.SetCurrentFolder(root_folder)
"#
        );
        self.operations.push(code);
        Ok(())
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn render(&self) -> String {
        let operations = if self.operations.is_empty() {
            "    pass\n".to_string()
        } else {
            self.operations.join("\n")
        };
        SCRIPT_TEMPLATE.replace(
            &format!("{OPERATIONS_PLACEHOLDER}\n"),
            &operations,
        )
    }
}

fn quote_paths(paths: &[String]) -> String {
    paths
        .iter()
        .map(|path| format!("\"{path}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
