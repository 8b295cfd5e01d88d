//! Filesystem publication of credentials for the child process.
//!
//! The store owns a private temporary directory holding a single
//! shared-credentials file. Every publish writes a sibling temp file and
//! renames it over the target, so readers see either the old or the new
//! profile in full. The directory is removed when the store is dropped.

use secrecy::ExposeSecret;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use sts_credentials::Credentials;
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// File name of the published profile inside the store directory.
pub const CREDENTIALS_FILE_NAME: &str = "credentials";

/// Prefix of the store's temporary directory.
const DIR_PREFIX: &str = "awsu";

/// Errors raised while materialising credentials on disk.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The scoped temporary directory could not be created
    #[error("failed to create a temporary directory: {0}")]
    TempDir(#[source] io::Error),

    /// Writing the staging file failed
    #[error("failed to write credentials in {}: {source}", .dir.display())]
    Write {
        /// Directory the staging file lives in
        dir: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Renaming the staging file over the published file failed
    #[error("failed to replace {}: {source}", .path.display())]
    Rename {
        /// Published file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Render credentials as a shared-credentials profile section.
#[must_use]
pub fn render_profile(profile: &str, creds: &Credentials) -> String {
    format!(
        "[{profile}]\naws_access_key_id={}\naws_secret_access_key={}\naws_session_token={}\n",
        creds.access_key_id(),
        creds.secret_access_key().expose_secret(),
        creds.session_token().expose_secret(),
    )
}

/// Scoped on-disk home of the published credentials.
#[derive(Debug)]
pub struct CredentialStore {
    dir: TempDir,
    path: PathBuf,
    profile: String,
}

impl CredentialStore {
    /// Create a store in a fresh private temporary directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TempDir`] if the directory cannot be created.
    pub fn create(profile: impl Into<String>) -> StoreResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .map_err(StoreError::TempDir)?;
        Ok(Self::in_dir(dir, profile))
    }

    /// Create a store in a fresh private directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TempDir`] if the directory cannot be created.
    pub fn create_in(root: &Path, profile: impl Into<String>) -> StoreResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(root)
            .map_err(StoreError::TempDir)?;
        Ok(Self::in_dir(dir, profile))
    }

    fn in_dir(dir: TempDir, profile: impl Into<String>) -> Self {
        let path = dir.path().join(CREDENTIALS_FILE_NAME);
        Self {
            dir,
            path,
            profile: profile.into(),
        }
    }

    /// Path the child reads credentials from. Stable across renewals.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.path
    }

    /// Profile section name written to the file.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Atomically replace the published profile with `creds`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the staging file cannot be created or
    /// written, and [`StoreError::Rename`] if it cannot replace the target.
    pub fn publish(&self, creds: &Credentials) -> StoreResult<()> {
        let contents = Zeroizing::new(render_profile(&self.profile, creds));
        let write_err = |source| StoreError::Write {
            dir: self.dir.path().to_path_buf(),
            source,
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".credentials").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o600));
        }

        let mut staged = builder.tempfile_in(self.dir.path()).map_err(write_err)?;
        staged.write_all(contents.as_bytes()).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;

        staged
            .persist(&self.path)
            .map_err(|e| StoreError::Rename {
                path: self.path.clone(),
                source: e.error,
            })?;

        debug!(path = %self.path.display(), profile = %self.profile, "Published credentials");
        Ok(())
    }
}
