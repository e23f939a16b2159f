use std::path::{Path, PathBuf};

pub const PROXY_DIR_NAME: &str = "Proxy";
pub const PROXY_EXTENSION: &str = "mov";
pub const DEFAULT_UPDATE_SCRIPT: &str = "update-encoded-video-path.sql";

/// An asset whose `encodedVideoPath` should point at a proxy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWithProxy {
    pub id: String,
    /// Proxy path as the server sees it (alias applied).
    pub encoded_video_path: String,
}

/// `dir/clip.MOV` -> `dir/Proxy/clip.mov`.
pub fn proxy_path_for(file: &Path) -> Option<PathBuf> {
    let stem = file.file_stem()?;
    let dir = file.parent()?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(PROXY_EXTENSION);
    Some(dir.join(PROXY_DIR_NAME).join(name))
}

/// One `UPDATE` per asset. Values are substituted verbatim: an id or path
/// containing `'` produces a broken statement.
pub fn render_update_statements(assets: &[AssetWithProxy]) -> String {
    let mut sql = String::new();
    for asset in assets {
        sql.push_str(&format!(
            "UPDATE assets SET \"encodedVideoPath\" = '{}' WHERE id = '{}';\n",
            asset.encoded_video_path, asset.id
        ));
    }
    sql
}

/// Overwrites `target` with the statements for `assets`.
pub async fn write_update_script(
    target: &Path,
    assets: &[AssetWithProxy],
) -> std::io::Result<()> {
    tokio::fs::write(target, render_update_statements(assets)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn proxy_lives_in_sibling_proxy_dir_with_lowercase_mov() {
        assert_eq!(
            proxy_path_for(Path::new("/media/Trip/clip.MOV")),
            Some(PathBuf::from("/media/Trip/Proxy/clip.mov"))
        );
        assert_eq!(
            proxy_path_for(Path::new("/media/Trip/a.b.MP4")),
            Some(PathBuf::from("/media/Trip/Proxy/a.b.mov"))
        );
    }

    #[test]
    fn renders_one_statement_per_asset() {
        let sql = render_update_statements(&[
            AssetWithProxy {
                id: "a1".into(),
                encoded_video_path: "/usr/src/app/external/Trip/Proxy/clip.mov".into(),
            },
            AssetWithProxy {
                id: "a2".into(),
                encoded_video_path: "/x/Proxy/b.mov".into(),
            },
        ]);
        assert_eq!(
            sql,
            "UPDATE assets SET \"encodedVideoPath\" = '/usr/src/app/external/Trip/Proxy/clip.mov' WHERE id = 'a1';\n\
             UPDATE assets SET \"encodedVideoPath\" = '/x/Proxy/b.mov' WHERE id = 'a2';\n"
        );
        assert_eq!(render_update_statements(&[]), "");
    }

    #[tokio::test]
    async fn write_replaces_previous_contents() {
        let dir = tempdir().unwrap();
        let target = dir.path().join(DEFAULT_UPDATE_SCRIPT);
        std::fs::write(&target, "stale\nstale\nstale\n").unwrap();

        write_update_script(
            &target,
            &[AssetWithProxy {
                id: "a1".into(),
                encoded_video_path: "/p.mov".into(),
            }],
        )
        .await
        .unwrap();

        let written = std::fs::read_to_string(&target).unwrap();
        assert_eq!(
            written,
            "UPDATE assets SET \"encodedVideoPath\" = '/p.mov' WHERE id = 'a1';\n"
        );
    }
}
