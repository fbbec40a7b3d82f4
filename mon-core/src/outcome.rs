//! First-error-wins cell.

use std::sync::OnceLock;

/// Holds the first error recorded into it.
///
/// Later records are dropped. Once set, the stored value never changes.
#[derive(Debug)]
pub struct Outcome<E> {
    first: OnceLock<E>,
}

impl<E> Default for Outcome<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Outcome<E> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            first: OnceLock::new(),
        }
    }

    /// Record `err`. Returns `Err(err)` if an earlier error already won.
    pub fn record(&self, err: E) -> Result<(), E> {
        self.first.set(err)
    }

    /// The winning error, if any.
    pub fn get(&self) -> Option<&E> {
        self.first.get()
    }

    /// The verdict so far.
    pub fn result(&self) -> Result<(), E>
    where
        E: Clone,
    {
        match self.get() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
