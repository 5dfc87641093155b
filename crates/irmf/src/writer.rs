//! Persists a generated artifact set to the destination directory tree.
//! Directory creation is idempotent. Texture-asset downloads run through an
//! injected fetch closure and are best-effort: a failed texture is logged
//! and skipped, since the primary project artifacts stay usable without it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::generate::{ProjectArtifacts, VERTEX_SHADER, VERTEX_SHADER_PATH};
use crate::ImportError;

pub const README_FILE: &str = "README.txt";
pub const PROJECT_FILE: &str = "project.toml";
pub const SHADERS_DIR: &str = "shaders";

/// Writes every artifact under `destination` and returns the path of the
/// project document. Overlapping concurrent invocations are last-writer-wins;
/// no locking is attempted.
pub fn write_project<F>(
    destination: &Path,
    artifacts: &ProjectArtifacts,
    mut fetch_asset: F,
) -> Result<PathBuf, ImportError>
where
    F: FnMut(&str, &Path) -> anyhow::Result<()>,
{
    fs::create_dir_all(destination.join(SHADERS_DIR))?;

    fs::write(destination.join(README_FILE), &artifacts.readme)?;

    let project_path = destination.join(PROJECT_FILE);
    let project_toml = toml::to_string_pretty(&artifacts.project)?;
    fs::write(&project_path, project_toml)?;

    fs::write(destination.join(VERTEX_SHADER_PATH), VERTEX_SHADER)?;
    for (rel, source) in &artifacts.fragment_shaders {
        let path = destination.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, source)?;
    }

    for asset in &artifacts.assets {
        let dest = destination.join(&asset.destination_rel);
        match fetch_asset(&asset.url, &dest) {
            Ok(()) => debug!(url = %asset.url, path = %dest.display(), "texture asset exported"),
            Err(err) => warn!(
                url = %asset.url,
                path = %dest.display(),
                error = %err,
                "texture asset export failed; continuing without it"
            ),
        }
    }

    debug!(path = %project_path.display(), "project bundle written");
    Ok(project_path)
}
