//! # Media Library Boundary
//!
//! The consumed save-to-library interface: once an export finishes, the
//! surrounding application hands the output file to a platform media
//! library behind a one-time permission check. The core defines and drives
//! this boundary but ships no platform implementation.

use std::future::Future;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::SaveError;

/// Permission state for adding media to the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
}

/// A platform media library that can import finished video files
pub trait MediaLibrary {
    /// Current permission state without prompting
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt the user once and report the resulting state
    fn request_authorization(&self) -> impl Future<Output = AuthorizationStatus> + Send;

    /// Import the finished file into user-visible storage
    fn import_video(&self, path: &Path) -> impl Future<Output = std::result::Result<(), SaveError>> + Send;
}

/// Resolve the permission state, prompting only from `NotDetermined`
pub async fn potentially_request_authorization<L: MediaLibrary>(
    library: &L,
) -> AuthorizationStatus {
    let existing = library.authorization_status();
    if existing != AuthorizationStatus::NotDetermined {
        return existing;
    }
    debug!("Library permission not determined, prompting");
    library.request_authorization().await
}

/// Hand a finished output file to the media library
///
/// Fails with [`SaveError::NotAuthorized`] unless the (possibly prompted)
/// permission state is `Authorized`; import failures surface as
/// [`SaveError::Unknown`].
pub async fn save_video<L: MediaLibrary>(
    library: &L,
    path: &Path,
) -> std::result::Result<(), SaveError> {
    let status = potentially_request_authorization(library).await;
    if status != AuthorizationStatus::Authorized {
        warn!("Library save refused: permission state {:?}", status);
        return Err(SaveError::NotAuthorized);
    }

    library.import_video(path).await.map_err(|_| SaveError::Unknown)
}
