//! Compare the local configuration file with the running daemon.

use std::fmt;
use std::path::{Path, PathBuf};

use yasync_config::{FolderTable, paths};

use crate::types::RemoteConfig;

/// One way in which the file and the daemon disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// In the file, unknown to the daemon.
    MissingOnServer { id: String, path: PathBuf },
    /// Known to the daemon, absent from the file.
    MissingLocally { id: String, path: PathBuf },
    PathMismatch {
        id: String,
        local: PathBuf,
        remote: PathBuf,
    },
    LabelMismatch {
        id: String,
        local: String,
        remote: String,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::MissingOnServer { id, path } => write!(
                f,
                "folder {id} ({}) is not known to the server",
                path.display()
            ),
            Discrepancy::MissingLocally { id, path } => write!(
                f,
                "folder {id} ({}) is served but missing from the config file",
                path.display()
            ),
            Discrepancy::PathMismatch { id, local, remote } => write!(
                f,
                "folder {id} path differs: config file has {}, server has {}",
                local.display(),
                remote.display()
            ),
            Discrepancy::LabelMismatch { id, local, remote } => write!(
                f,
                "folder {id} label differs: config file has {local:?}, server has {remote:?}"
            ),
        }
    }
}

/// Outcome of a consistency check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Number of distinct folder IDs seen on either side.
    pub folders_checked: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl CheckReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_consistent() {
            return writeln!(
                f,
                "Config file matches the running server ({} folders).",
                self.folders_checked
            );
        }
        writeln!(
            f,
            "Config file and running server disagree ({} issues):",
            self.discrepancies.len()
        )?;
        for issue in &self.discrepancies {
            writeln!(f, "  - {issue}")?;
        }
        Ok(())
    }
}

/// Compare local folders against the daemon's folder list by folder ID.
///
/// Local folders are reported in file order, then server-only folders in
/// server order. Remote paths are normalized before comparison.
pub fn compare(local: &FolderTable, remote: &RemoteConfig) -> CheckReport {
    let mut discrepancies = Vec::new();
    let mut seen = 0;

    for (local_path, folder) in local.iter() {
        seen += 1;
        match remote.folders.iter().find(|r| r.id == folder.id) {
            None => discrepancies.push(Discrepancy::MissingOnServer {
                id: folder.id.clone(),
                path: local_path.to_path_buf(),
            }),
            Some(remote_folder) => {
                let remote_path = paths::normalize(Path::new(&remote_folder.path));
                if remote_path != local_path {
                    discrepancies.push(Discrepancy::PathMismatch {
                        id: folder.id.clone(),
                        local: local_path.to_path_buf(),
                        remote: remote_path,
                    });
                }
                if remote_folder.label != folder.label {
                    discrepancies.push(Discrepancy::LabelMismatch {
                        id: folder.id.clone(),
                        local: folder.label.clone(),
                        remote: remote_folder.label.clone(),
                    });
                }
            }
        }
    }

    for remote_folder in &remote.folders {
        if local.find_by_id(&remote_folder.id).is_none() {
            seen += 1;
            discrepancies.push(Discrepancy::MissingLocally {
                id: remote_folder.id.clone(),
                path: PathBuf::from(&remote_folder.path),
            });
        }
    }

    CheckReport {
        folders_checked: seen,
        discrepancies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteFolder;
    use pretty_assertions::assert_eq;
    use yasync_config::FolderEntry;

    fn local() -> FolderTable {
        let mut table = FolderTable::new();
        table.insert(
            Path::new("/srv/docs"),
            FolderEntry {
                id: "docs".into(),
                label: "Documents".into(),
            },
        );
        table.insert(
            Path::new("/srv/music"),
            FolderEntry {
                id: "music".into(),
                label: "Music".into(),
            },
        );
        table
    }

    fn remote(folders: &[(&str, &str, &str)]) -> RemoteConfig {
        RemoteConfig {
            folders: folders
                .iter()
                .map(|(id, label, path)| RemoteFolder {
                    id: id.to_string(),
                    label: label.to_string(),
                    path: path.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_consistent() {
        let report = compare(
            &local(),
            &remote(&[
                ("music", "Music", "/srv/music/"),
                ("docs", "Documents", "/srv/docs"),
            ]),
        );
        assert!(report.is_consistent());
        assert_eq!(report.folders_checked, 2);

        let text = report.to_string();
        assert!(text.contains("matches the running server (2 folders)"));
    }

    #[test]
    fn test_detects_every_kind_of_drift() {
        let report = compare(
            &local(),
            &remote(&[
                ("docs", "Docs", "/srv/documents"),
                ("photos", "Photos", "/srv/photos"),
            ]),
        );
        assert_eq!(
            report.discrepancies,
            vec![
                Discrepancy::PathMismatch {
                    id: "docs".into(),
                    local: paths::normalize(Path::new("/srv/docs")),
                    remote: paths::normalize(Path::new("/srv/documents")),
                },
                Discrepancy::LabelMismatch {
                    id: "docs".into(),
                    local: "Documents".into(),
                    remote: "Docs".into(),
                },
                Discrepancy::MissingOnServer {
                    id: "music".into(),
                    path: paths::normalize(Path::new("/srv/music")),
                },
                Discrepancy::MissingLocally {
                    id: "photos".into(),
                    path: PathBuf::from("/srv/photos"),
                },
            ]
        );
        assert_eq!(report.folders_checked, 3);
        assert!(!report.is_consistent());

        let text = report.to_string();
        assert!(text.starts_with("Config file and running server disagree (4 issues):"));
        assert!(text.contains("folder photos (/srv/photos) is served but missing"));
    }

    #[test]
    fn test_empty_both_sides() {
        let report = compare(&FolderTable::new(), &RemoteConfig::default());
        assert!(report.is_consistent());
        assert_eq!(report.folders_checked, 0);
    }
}
