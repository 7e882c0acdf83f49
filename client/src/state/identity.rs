//! Identity store: where the chosen display name lives between sessions.
//!
//! SYSTEM CONTEXT
//! ==============
//! The engine only reads the name when a session starts and clears it on
//! `leave()`. Choosing a name (the "home page" step) goes through
//! [`choose_username`], which owns the trim/empty validation.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Error returned by identity operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The submitted name was empty after trimming.
    #[error("please enter a username")]
    EmptyUsername,
    /// The backing store could not be read or written.
    #[error("identity store i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Small key-value capability holding one display name.
pub trait IdentityStore {
    /// Stored name, or `None` when absent. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self) -> Result<Option<String>, IdentityError>;

    /// Replace the stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, value: &str) -> Result<(), IdentityError>;

    /// Remove the stored name. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn clear(&mut self) -> Result<(), IdentityError>;
}

/// Validate and persist a display name typed by the user.
///
/// # Errors
///
/// Returns [`IdentityError::EmptyUsername`] when `raw` is blank, or the
/// store's error if persisting fails.
pub fn choose_username(store: &mut dyn IdentityStore, raw: &str) -> Result<String, IdentityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdentityError::EmptyUsername);
    }
    store.set(trimmed)?;
    Ok(trimmed.to_owned())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Process-local store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryIdentityStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_username(username: &str) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(username.to_owned()))) }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self) -> Result<Option<String>, IdentityError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(non_blank(slot.clone()))
    }

    fn set(&mut self, value: &str) -> Result<(), IdentityError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), IdentityError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Store backed by a one-line text file. A missing file means no identity.
#[derive(Clone, Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self) -> Result<Option<String>, IdentityError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(non_blank(Some(raw.trim().to_owned()))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, value: &str) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{value}\n"))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), IdentityError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
