//! Google Drive integration for Angiomark.
//!
//! Patient image sets live in a shared Drive folder: one sub-folder per
//! patient, holding staged angiography images (possibly in nested
//! sub-folders). This crate provides the read-only REST client
//! ([`DriveApi`]), the service-account credential flow, the
//! [`RemoteListing`] seam that lets the synchronization logic run against
//! an in-memory fake in tests, and the recursive folder scanner.

pub mod api;
pub mod credentials;
pub mod scan;
pub mod testing;

pub use api::{DriveApi, DriveError, RemoteEntry, RemoteListing, FOLDER_MIME_TYPE};
pub use credentials::ServiceAccountKey;
pub use scan::{scan_patient_folder, ScannedImage};
