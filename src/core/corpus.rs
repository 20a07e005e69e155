//! Corpus membership view
//!
//! Maintains the set of filenames attached to the session as a best-effort
//! mirror of backend truth. Every mutation is reconciled from the backend's
//! response: uploads append only the filenames the backend accepted, and
//! deletes remove only the filename the backend echoed back. Local state is
//! never assumed consistent between round trips.

/// Local view of the session's corpus
#[derive(Debug, Default, Clone)]
pub struct CorpusView {
    /// Filenames in insertion order, unique within the session
    files: Vec<String>,
    /// Whether a wholesale refresh is in flight
    loading: bool,
}

impl CorpusView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filenames currently attached, in insertion order
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.iter().any(|f| f == filename)
    }

    /// Whether a refresh is waiting on the backend
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Mark a wholesale refresh as started; the list is not shown while set
    pub fn begin_refresh(&mut self) {
        self.loading = true;
    }

    /// Replace the local set wholesale with the backend's list
    pub fn finish_refresh(&mut self, files: Vec<String>) {
        self.files = files;
        self.loading = false;
    }

    /// A refresh failed; local state stays unchanged
    pub fn refresh_failed(&mut self) {
        self.loading = false;
    }

    /// Append the filenames the backend accepted, each at most once
    ///
    /// The request payload is not consulted: the backend is authoritative
    /// and may have rejected entries.
    pub fn apply_uploaded(&mut self, accepted: Vec<String>) {
        for filename in accepted {
            if !self.contains(&filename) {
                self.files.push(filename);
            }
        }
    }

    /// Remove exactly the filename the backend confirmed deleted
    ///
    /// `None` means the backend did not echo a filename back; the local set
    /// stays unchanged.
    pub fn apply_deleted(&mut self, deleted: Option<String>) {
        if let Some(filename) = deleted {
            self.files.retain(|f| f != &filename);
        }
    }
}
