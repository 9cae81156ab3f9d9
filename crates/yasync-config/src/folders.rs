//! The monitored-folder table.

use std::path::{Path, PathBuf};

use crate::paths;

/// Identity of one monitored folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// Opaque folder ID used by the REST API.
    pub id: String,
    /// Human-readable label.
    pub label: String,
}

/// Monitored folders keyed by normalized absolute path.
///
/// Entries keep the order in which they were inserted (file order), which
/// decides the winner when more than one folder contains a lookup target.
/// Inserting a path that is already present replaces its entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderTable {
    entries: Vec<(PathBuf, FolderEntry)>,
}

impl FolderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a folder, normalizing `path` first.
    pub fn insert(&mut self, path: &Path, entry: FolderEntry) {
        let key = paths::normalize(path);
        let existing = self.entries.iter_mut().find(|(path, _)| *path == key);
        match existing {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    /// Find a folder by its ID.
    pub fn find_by_id(&self, id: &str) -> Option<(&Path, &FolderEntry)> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.id == id)
            .map(|(path, entry)| (path.as_path(), entry))
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &FolderEntry)> {
        self.entries
            .iter()
            .map(|(path, entry)| (path.as_path(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn entry(id: &str, label: &str) -> FolderEntry {
        FolderEntry {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_insert_normalizes_keys() {
        let tmp = TempDir::new().unwrap();
        let canonical = std::fs::canonicalize(tmp.path()).unwrap();

        let mut table = FolderTable::new();
        table.insert(&tmp.path().join("music/"), entry("m", "Music"));

        let (path, folder) = table.iter().next().unwrap();
        assert_eq!(path, canonical.join("music"));
        assert_eq!(folder.id, "m");
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut table = FolderTable::new();
        table.insert(Path::new("/srv/zeta"), entry("z", "Zeta"));
        table.insert(Path::new("/srv/alpha"), entry("a", "Alpha"));
        table.insert(Path::new("/srv/mid"), entry("m", "Mid"));

        let ids: Vec<&str> = table.iter().map(|(_, e)| e.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_path_replaces_entry() {
        let mut table = FolderTable::new();
        table.insert(Path::new("/srv/data"), entry("old", "Old"));
        table.insert(Path::new("/srv/other"), entry("o", "Other"));
        table.insert(Path::new("/srv/data/"), entry("new", "New"));

        assert_eq!(table.len(), 2);
        let ids: Vec<&str> = table.iter().map(|(_, e)| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "o"]);
    }

    #[test]
    fn test_find_by_id() {
        let mut table = FolderTable::new();
        table.insert(Path::new("/srv/data"), entry("abc", "Data"));
        let (_, folder) = table.find_by_id("abc").unwrap();
        assert_eq!(folder.label, "Data");
        assert!(table.find_by_id("nope").is_none());
        assert!(!table.is_empty());
    }
}
