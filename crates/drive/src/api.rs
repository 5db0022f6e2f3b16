//! REST client for the Google Drive `files.list` endpoint.
//!
//! Wraps the Drive v3 HTTP API (read-only listing by parent folder) using
//! [`reqwest`], and defines the [`RemoteListing`] trait the sync layer is
//! written against.

use async_trait::async_trait;
use serde::Deserialize;

use crate::credentials::{ServiceAccountAuth, ServiceAccountKey};

/// Drive v3 files collection endpoint.
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// MIME type Drive assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Errors from the Drive API layer.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Drive returned a non-2xx status code.
    #[error("Drive API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service-account key file could not be loaded or used.
    #[error("Drive credentials error: {0}")]
    Credentials(String),
}

/// One `{id, name, mimeType}` tuple from a Drive listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

impl RemoteEntry {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Whether this entry is an image file.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Read-only view of a remote hierarchical file listing.
///
/// Implemented by [`DriveApi`] for production and by
/// [`crate::testing::InMemoryListing`] for tests, so the scanner and the
/// sync reconciler never depend on the network directly.
#[async_trait]
pub trait RemoteListing: Send + Sync {
    /// List the immediate child folders of a folder.
    async fn list_child_folders(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError>;

    /// List all immediate children (files and folders) of a folder.
    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError>;

    /// Externally-resolvable display URL for a file id.
    fn display_url(&self, file_id: &str) -> String;
}

/// One page of a `files.list` response.
#[derive(Debug, Deserialize)]
struct FileListPage {
    #[serde(default)]
    files: Vec<RemoteEntry>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

/// HTTP client for the Drive v3 API, authenticated via a service account.
pub struct DriveApi {
    client: reqwest::Client,
    auth: ServiceAccountAuth,
}

impl DriveApi {
    /// Create a client from a service-account JSON key file.
    pub fn from_key_file(path: &std::path::Path) -> Result<Self, DriveError> {
        let key = ServiceAccountKey::from_file(path)?;
        Ok(Self::new(key))
    }

    /// Create a client from an already-loaded service-account key.
    pub fn new(key: ServiceAccountKey) -> Self {
        let client = reqwest::Client::new();
        let auth = ServiceAccountAuth::new(key, client.clone());
        Self { client, auth }
    }

    /// Run a `files.list` query, following `nextPageToken` pagination.
    async fn list_query(&self, query: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        let token = self.auth.bearer_token().await?;
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(DRIVE_FILES_URL)
                .bearer_auth(&token)
                .query(&[
                    ("q", query),
                    ("fields", "nextPageToken, files(id, name, mimeType)"),
                    ("pageSize", "1000"),
                ]);
            if let Some(ref t) = page_token {
                request = request.query(&[("pageToken", t.as_str())]);
            }

            let response = request.send().await?;
            let page: FileListPage = Self::parse_response(response).await?;
            entries.extend(page.files);

            match page.next_page_token {
                Some(t) => page_token = Some(t),
                None => break,
            }
        }

        Ok(entries)
    }

    /// Deserialize a successful response body, or surface the status and
    /// body text as a [`DriveError::Api`].
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DriveError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteListing for DriveApi {
    async fn list_child_folders(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        let query = format!(
            "'{folder_id}' in parents and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false"
        );
        self.list_query(&query).await
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteEntry>, DriveError> {
        let query = format!("'{folder_id}' in parents and trashed = false");
        self.list_query(&query).await
    }

    fn display_url(&self, file_id: &str) -> String {
        format!("https://drive.google.com/thumbnail?id={file_id}&sz=w1000")
    }
}
