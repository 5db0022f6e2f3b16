//! In-memory [`RemoteListing`] fake for tests.
//!
//! Models the remote hierarchy as parent → children adjacency, with
//! optional per-folder listing failures so callers can exercise the
//! catch-and-continue behavior of the sync loop.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::api::{DriveError, RemoteEntry, RemoteListing, FOLDER_MIME_TYPE};

/// An in-memory folder tree implementing [`RemoteListing`].
#[derive(Debug, Default)]
pub struct InMemoryListing {
    children: HashMap<String, Vec<RemoteEntry>>,
    failing: HashSet<String>,
    next_id: u32,
}

impl InMemoryListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder with a known id (typically a root or a patient
    /// folder the test addresses directly).
    pub fn add_folder(&mut self, id: &str) {
        self.children.entry(id.to_string()).or_default();
    }

    /// Add a child folder with a generated id, returning that id.
    pub fn add_subfolder(&mut self, parent: &str, name: &str) -> String {
        self.next_id += 1;
        let id = format!("folder-{}", self.next_id);
        self.add_subfolder_with_id(parent, &id, name);
        id
    }

    /// Add a child folder with an explicit id.
    pub fn add_subfolder_with_id(&mut self, parent: &str, id: &str, name: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(RemoteEntry {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: FOLDER_MIME_TYPE.to_string(),
            });
        self.children.entry(id.to_string()).or_default();
    }

    /// Add an image file under a folder.
    pub fn add_image(&mut self, parent: &str, id: &str, name: &str) {
        self.add_file(parent, id, name, "image/png");
    }

    /// Add an arbitrary file under a folder.
    pub fn add_file(&mut self, parent: &str, id: &str, name: &str, mime_type: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(RemoteEntry {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            });
    }

    /// Make every listing call against the given folder fail.
    pub fn fail_listing(&mut self, folder_id: &str) {
        self.failing.insert(folder_id.to_string());
    }

    /// Remove all children of a folder (simulates remote deletion).
    pub fn clear_folder(&mut self, folder_id: &str) {
        if let Some(children) = self.children.get_mut(folder_id) {
            children.clear();
        }
    }

    fn list(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        if self.failing.contains(folder_id) {
            return Err(DriveError::Api {
                status: 500,
                body: format!("injected failure for folder {folder_id}"),
            });
        }
        Ok(self.children.get(folder_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl RemoteListing for InMemoryListing {
    async fn list_child_folders(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        Ok(self
            .list(folder_id)?
            .into_iter()
            .filter(RemoteEntry::is_folder)
            .collect())
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        self.list(folder_id)
    }

    fn display_url(&self, file_id: &str) -> String {
        format!("https://drive.google.com/thumbnail?id={file_id}&sz=w1000")
    }
}
