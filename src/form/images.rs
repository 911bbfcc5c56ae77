//! Staged image set for the property form.
//!
//! DESIGN
//! ======
//! Two disjoint ordered sequences: `existing` (URLs already persisted,
//! edit mode) and `files` (locally staged binaries awaiting upload). Each
//! staged file owns exactly one ephemeral preview URL, issued and retired
//! by [`PreviewRegistry`] — acquire on add, release on remove or disposal,
//! exactly once, never dereferenced afterwards. The registry makes release
//! total: it does not matter whether removal came from a user action or
//! controller teardown.
//!
//! The photo ceiling comes from the account's limits; a violation is a
//! recoverable user-facing condition, not a failure.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::{PropertyLimits, StagedFile};

/// Ceiling used until the limits collaborator has answered.
pub const DEFAULT_MAX_PHOTOS: usize = 20;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// User-facing: the account's photo allowance is spent. Pairs with an
    /// upgrade prompt on the host side.
    #[error("Limite de {ceiling} fotos por imóvel atingido.")]
    PhotoLimit { ceiling: usize, attempted: usize },
    #[error("image index {0} out of range")]
    OutOfRange(usize),
    #[error("preview URL released twice: {0}")]
    PreviewReleased(String),
}

/// Issues and retires ephemeral preview URLs.
///
/// A URL is live from `acquire` until its single `release`; releasing an
/// unknown or already-released URL is an error.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashSet<String>,
}

impl PreviewRegistry {
    fn acquire(&mut self) -> String {
        let url = format!("preview://{}", Uuid::new_v4());
        self.live.insert(url.clone());
        url
    }

    fn release(&mut self, url: &str) -> Result<(), StagingError> {
        if self.live.remove(url) {
            Ok(())
        } else {
            Err(StagingError::PreviewReleased(url.to_owned()))
        }
    }

    #[must_use]
    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains(url)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

// =============================================================================
// STAGING
// =============================================================================

#[derive(Debug, Default)]
pub struct ImageStaging {
    existing: Vec<String>,
    files: Vec<StagedFile>,
    previews: Vec<String>,
    registry: PreviewRegistry,
    ceiling: Option<usize>,
}

impl ImageStaging {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the persisted image URLs of a record under edit.
    pub fn hydrate_existing(&mut self, urls: Vec<String>) {
        self.existing = urls;
    }

    /// Apply the account limits fetched from the backend.
    pub fn apply_limits(&mut self, limits: &PropertyLimits) {
        self.ceiling = Some(limits.max_photos_per_property as usize);
    }

    #[must_use]
    pub fn ceiling(&self) -> usize {
        self.ceiling.unwrap_or(DEFAULT_MAX_PHOTOS)
    }

    #[must_use]
    pub fn existing(&self) -> &[String] {
        &self.existing
    }

    #[must_use]
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Preview URLs, index-aligned with [`ImageStaging::files`].
    #[must_use]
    pub fn previews(&self) -> &[String] {
        &self.previews
    }

    #[must_use]
    pub fn preview_is_live(&self, url: &str) -> bool {
        self.registry.is_live(url)
    }

    /// Persisted plus staged count, checked against the ceiling.
    #[must_use]
    pub fn total_photos(&self) -> usize {
        self.existing.len() + self.files.len()
    }

    /// Stage files for upload, acquiring one preview URL per file in the
    /// same order.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::PhotoLimit` when the combined existing and
    /// staged count would exceed the ceiling; nothing is staged in that
    /// case.
    pub fn add_files(&mut self, incoming: Vec<StagedFile>) -> Result<(), StagingError> {
        let attempted = self.total_photos() + incoming.len();
        if attempted > self.ceiling() {
            return Err(StagingError::PhotoLimit { ceiling: self.ceiling(), attempted });
        }
        for file in incoming {
            self.previews.push(self.registry.acquire());
            self.files.push(file);
        }
        debug_assert_eq!(self.files.len(), self.previews.len());
        Ok(())
    }

    /// Drop the staged file at `index`, releasing its preview URL. The
    /// relative order of the survivors is preserved.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::OutOfRange` for an invalid index.
    pub fn remove_new(&mut self, index: usize) -> Result<(), StagingError> {
        if index >= self.files.len() {
            return Err(StagingError::OutOfRange(index));
        }
        let preview = self.previews.remove(index);
        self.registry.release(&preview)?;
        self.files.remove(index);
        debug_assert_eq!(self.files.len(), self.previews.len());
        Ok(())
    }

    /// Drop a persisted URL from the retained set (edit mode). The server
    /// copy is untouched until the submission is accepted.
    ///
    /// # Errors
    ///
    /// Returns `StagingError::OutOfRange` for an invalid index.
    pub fn remove_existing(&mut self, index: usize) -> Result<(), StagingError> {
        if index >= self.existing.len() {
            return Err(StagingError::OutOfRange(index));
        }
        self.existing.remove(index);
        Ok(())
    }

    /// Release every outstanding preview and forget all staged state.
    /// Called after an accepted submission and on controller teardown.
    pub fn clear(&mut self) {
        for preview in self.previews.drain(..) {
            // Drain order mirrors acquisition order; each URL is live by
            // construction, so release cannot fail here.
            let _ = self.registry.release(&preview);
        }
        self.files.clear();
        self.existing.clear();
    }
}

impl Drop for ImageStaging {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
