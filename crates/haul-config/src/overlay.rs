//! Scoped configuration overrides
//!
//! [`ConfigStore::apply`] writes a batch of values and hands back an
//! [`OverlayGuard`]. Dropping the guard puts every touched path back the way it
//! was, newest write first, and removes paths that did not exist before. This
//! happens on every exit path: normal scope end, early `?` returns and panics.
//!
//! The guard holds the store's exclusive borrow, so overlays can only nest
//! (through [`OverlayGuard::apply`]) and are always undone in stack order.

use crate::ConfigStore;
use serde_json::Value;
use std::ops::Deref;
use tracing::trace;

/// A path touched by an overlay and what it held beforehand
#[derive(Debug)]
struct Saved {
    section: String,
    key: String,
    previous: Option<Value>,
}

/// Restores overridden configuration when dropped
///
/// Reads go through `Deref<Target = ConfigStore>`. There is deliberately no
/// mutable access: writes made behind the overlay's back would be clobbered on
/// release.
#[must_use = "the overlay is undone as soon as the guard is dropped"]
#[derive(Debug)]
pub struct OverlayGuard<'a> {
    store: &'a mut ConfigStore,
    saved: Vec<Saved>,
}

impl ConfigStore {
    /// Temporarily write every `(section, key, value)` in order
    ///
    /// The previous state of each path is recorded before it is written. Later
    /// entries for the same path win while the guard is alive; releasing the
    /// guard restores the value from before the first of them.
    pub fn apply<I, S, K>(&mut self, overrides: I) -> OverlayGuard<'_>
    where
        I: IntoIterator<Item = (S, K, Value)>,
        S: Into<String>,
        K: Into<String>,
    {
        let saved = overlay(self, overrides);
        OverlayGuard { store: self, saved }
    }
}

fn overlay<I, S, K>(store: &mut ConfigStore, overrides: I) -> Vec<Saved>
where
    I: IntoIterator<Item = (S, K, Value)>,
    S: Into<String>,
    K: Into<String>,
{
    let mut saved = Vec::new();
    for (section, key, value) in overrides {
        let section = section.into();
        let key = key.into();
        let previous = store.set(section.clone(), key.clone(), value);
        saved.push(Saved {
            section,
            key,
            previous,
        });
    }
    saved
}

impl<'a> OverlayGuard<'a> {
    /// Stack another overlay on top of this one
    ///
    /// The inner guard must be dropped before this one can be used again.
    pub fn apply<I, S, K>(&mut self, overrides: I) -> OverlayGuard<'_>
    where
        I: IntoIterator<Item = (S, K, Value)>,
        S: Into<String>,
        K: Into<String>,
    {
        self.store.apply(overrides)
    }

    /// Number of writes this guard will undo
    pub fn len(&self) -> usize {
        self.saved.len()
    }

    /// Whether the overlay touched nothing
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Undo the overlay now
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for OverlayGuard<'_> {
    type Target = ConfigStore;

    fn deref(&self) -> &ConfigStore {
        self.store
    }
}

impl Drop for OverlayGuard<'_> {
    fn drop(&mut self) {
        while let Some(Saved {
            section,
            key,
            previous,
        }) = self.saved.pop()
        {
            trace!(%section, %key, restored = previous.is_some(), "releasing override");
            match previous {
                Some(value) => {
                    self.store.set(section, key, value);
                }
                None => {
                    self.store.unset(&section, &key);
                }
            }
        }
    }
}
