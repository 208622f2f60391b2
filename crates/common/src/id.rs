//! ID generation utilities.

use std::fmt;
use std::sync::{Arc, Mutex};

use ulid::{Generator, Ulid};

/// ID generator for entities.
///
/// IDs are lowercase ULIDs. Clones share one monotonic generator, so IDs
/// handed out by the same generator within one millisecond still sort in
/// creation order. Answer history relies on this as the tie-breaker after
/// `created_at`.
#[derive(Clone, Default)]
pub struct IdGenerator {
    inner: Arc<Mutex<Generator>>,
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new ULID-based ID.
    #[must_use]
    pub fn generate(&self) -> String {
        let ulid = match self.inner.lock() {
            Ok(mut generator) => generator.generate().unwrap_or_else(|_| {
                // Random component overflowed within a single millisecond.
                tracing::warn!("Monotonic ULID overflow, falling back to random ULID");
                Ulid::new()
            }),
            Err(_) => Ulid::new(),
        };
        ulid.to_string().to_lowercase()
    }
}
