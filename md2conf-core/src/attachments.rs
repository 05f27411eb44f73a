//! Attachment naming and the collision-checked attachment map.
//!
//! Confluence stores attachments flat, keyed by file name, so every local
//! resource path is reduced to its last segment. Two different source files
//! that reduce to the same name cannot both be uploaded.

use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Attachment name for a resource path: its final `/`-separated segment.
///
/// A bare file name is returned unchanged.
pub fn normalize_attachment_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Two distinct source paths share one attachment name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("attachment name '{name}' is claimed by both '{existing}' and '{conflicting}'; rename one of the files")]
pub struct NamingCollision {
    pub name: String,
    pub existing: String,
    pub conflicting: String,
}

/// Outcome of a successful [`AttachmentMap::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    New,
    /// The same original path was already recorded under this name.
    Existing,
}

/// Attachment name → original relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttachmentMap {
    entries: BTreeMap<String, String>,
}

impl AttachmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name → original`, refusing to remap a name to another path.
    pub fn insert(&mut self, name: &str, original: &str) -> Result<Inserted, NamingCollision> {
        match self.get(name) {
            Some(existing) if existing == original => Ok(Inserted::Existing),
            Some(existing) => Err(NamingCollision {
                name: name.to_string(),
                existing: existing.to_string(),
                conflicting: original.to_string(),
            }),
            None => {
                self.entries.insert(name.to_string(), original.to_string());
                Ok(Inserted::New)
            }
        }
    }

    /// Original path recorded for an attachment name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by attachment name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Resolve every original path against the document's directory.
    pub fn resolve(&self, source_dir: &Path) -> Vec<ResolvedAttachment> {
        self.iter()
            .map(|(name, original)| {
                let path = source_dir.join(original);
                let exists = path.is_file();
                ResolvedAttachment {
                    name: name.clone(),
                    original: original.clone(),
                    path,
                    exists,
                }
            })
            .collect()
    }
}

/// An attachment located on disk, ready for an uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAttachment {
    pub name: String,
    pub original: String,
    pub path: PathBuf,
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_is_basename() {
        assert_eq!(normalize_attachment_name("diagrams/a.png"), "a.png");
        assert_eq!(normalize_attachment_name("../up/deep/b.pdf"), "b.pdf");
        assert_eq!(normalize_attachment_name("c.txt"), "c.txt");
        assert_eq!(normalize_attachment_name("dir/"), "");
    }

    #[test]
    fn test_normalize_fixed_point() {
        for path in ["diagrams/a.png", "x/y/z.tar.gz", "plain.md", "./rel.png"] {
            let once = normalize_attachment_name(path);
            assert_eq!(normalize_attachment_name(once), once);
        }
    }

    #[test]
    fn test_insert_same_path_twice() {
        let mut map = AttachmentMap::new();
        assert_eq!(map.insert("a.png", "img/a.png"), Ok(Inserted::New));
        assert_eq!(map.insert("a.png", "img/a.png"), Ok(Inserted::Existing));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a.png"), Some("img/a.png"));
    }

    #[test]
    fn test_insert_collision_keeps_first() {
        let mut map = AttachmentMap::new();
        map.insert("a.png", "one/a.png").unwrap();
        let err = map.insert("a.png", "two/a.png").unwrap_err();

        assert_eq!(
            err,
            NamingCollision {
                name: "a.png".into(),
                existing: "one/a.png".into(),
                conflicting: "two/a.png".into(),
            }
        );
        let message = err.to_string();
        assert!(message.contains("one/a.png"));
        assert!(message.contains("two/a.png"));
        assert!(message.contains("'a.png'"));
        assert_eq!(map.get("a.png"), Some("one/a.png"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut map = AttachmentMap::new();
        map.insert("b.pdf", "docs/b.pdf").unwrap();
        map.insert("a.png", "a.png").unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a.png":"a.png","b.pdf":"docs/b.pdf"}"#);
    }

    #[test]
    fn test_resolve_against_source_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/a.png"), b"png").unwrap();

        let mut map = AttachmentMap::new();
        map.insert("a.png", "img/a.png").unwrap();
        map.insert("gone.pdf", "gone.pdf").unwrap();

        let resolved = map.resolve(dir.path());
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "a.png");
        assert_eq!(resolved[0].path, dir.path().join("img/a.png"));
        assert!(resolved[0].exists);
        assert_eq!(resolved[1].name, "gone.pdf");
        assert!(!resolved[1].exists);
    }
}
