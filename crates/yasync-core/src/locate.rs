//! Map a filesystem path to the monitored folder that contains it.

use std::path::{Path, PathBuf};

use tracing::debug;
use yasync_config::{FolderTable, paths};

/// Errors from folder lookup.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("{} is not inside any monitored folder", .0.display())]
    PathNotMonitored(PathBuf),

    #[error("{} has a component that is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),
}

/// Where a path lives from the daemon's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLocation {
    /// ID of the containing folder.
    pub folder_id: String,
    /// Path below the folder root, `/`-separated. `None` for the root itself.
    pub sub_path: Option<String>,
}

/// Locate `target` in `folders`.
///
/// `target` is normalized the same way as the folder table keys. The first
/// folder in table order that contains the target wins, even if a later
/// folder is nested deeper; callers with nested folders get the outer one
/// when it appears first in the configuration.
pub fn locate(folders: &FolderTable, target: &Path) -> Result<FolderLocation, LocateError> {
    let normalized = paths::normalize(target);
    locate_normalized(folders, &normalized)
}

/// Like [`locate`], for a target that is already normalized.
pub fn locate_normalized(
    folders: &FolderTable,
    target: &Path,
) -> Result<FolderLocation, LocateError> {
    for (root, folder) in folders.iter() {
        // Component-wise, so `/home/foo2` never matches `/home/foo`.
        let Ok(rest) = target.strip_prefix(root) else {
            continue;
        };

        // The daemon takes `sub` as a string; a lossy conversion would name
        // a different file.
        let mut segments = Vec::new();
        for component in rest.components() {
            let Some(name) = component.as_os_str().to_str() else {
                return Err(LocateError::NonUtf8Path(target.to_path_buf()));
            };
            segments.push(name);
        }
        let sub_path = segments.join("/");

        debug!(
            target = %target.display(),
            folder = %folder.id,
            sub = %sub_path,
            "located path"
        );

        return Ok(FolderLocation {
            folder_id: folder.id.clone(),
            sub_path: (!sub_path.is_empty()).then_some(sub_path),
        });
    }

    Err(LocateError::PathNotMonitored(target.to_path_buf()))
}
