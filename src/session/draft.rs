//! Draft lifecycle shared by every editor.

use crate::common::ids::ArtifactId;

/// Persistence status of the working object.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DraftStatus {
    /// Nothing to save.
    #[default]
    Empty,
    /// Changed since the last successful save.
    Dirty,
    /// Matches what was last saved.
    Clean,
}

/// Status plus the id the next save writes to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DraftState {
    status: DraftStatus,
    bound: Option<ArtifactId>,
}

impl DraftState {
    /// Empty, unbound draft.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: DraftStatus::Empty,
            bound: None,
        }
    }

    /// Current save state.
    #[must_use]
    pub const fn status(&self) -> DraftStatus {
        self.status
    }

    /// Record id the draft is bound to.
    #[must_use]
    pub const fn bound(&self) -> Option<ArtifactId> {
        self.bound
    }

    /// Unsaved changes since the last save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        matches!(self.status, DraftStatus::Dirty)
    }

    /// Working object changed.
    pub const fn mark_dirty(&mut self) {
        self.status = DraftStatus::Dirty;
    }

    /// Save succeeded and wrote to `id`.
    pub const fn mark_clean(&mut self, id: ArtifactId) {
        self.status = DraftStatus::Clean;
        self.bound = Some(id);
    }

    /// A stored record became the working object. Its content has not been
    /// written by this draft yet, so the draft is dirty and bound.
    pub const fn load(&mut self, id: ArtifactId) {
        self.status = DraftStatus::Dirty;
        self.bound = Some(id);
    }

    /// Back to empty and unbound.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}
