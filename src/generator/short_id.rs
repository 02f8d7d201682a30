//! Reality short-id selection
//!
//! A node may advertise several Reality short-ids. Which one a rendered
//! profile carries is decided by a [`ShortIdSelector`] passed into the render
//! call, so production can spread clients across ids while tests pin one.

use rand::seq::IndexedRandom;

/// Picks one short-id out of the ids a node advertises
pub trait ShortIdSelector: Send + Sync {
    /// Returns `None` only when `short_ids` is empty
    fn select<'a>(&self, short_ids: &'a [String]) -> Option<&'a str>;
}

/// Picks uniformly at random on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomShortId;

impl ShortIdSelector for RandomShortId {
    fn select<'a>(&self, short_ids: &'a [String]) -> Option<&'a str> {
        short_ids.choose(&mut rand::rng()).map(String::as_str)
    }
}

/// Always picks the first id
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstShortId;

impl ShortIdSelector for FirstShortId {
    fn select<'a>(&self, short_ids: &'a [String]) -> Option<&'a str> {
        short_ids.first().map(String::as_str)
    }
}

/// Picks the id at a fixed position, wrapping around shorter lists
#[derive(Debug, Clone, Copy)]
pub struct FixedShortId(pub usize);

impl ShortIdSelector for FixedShortId {
    fn select<'a>(&self, short_ids: &'a [String]) -> Option<&'a str> {
        if short_ids.is_empty() {
            return None;
        }
        short_ids.get(self.0 % short_ids.len()).map(String::as_str)
    }
}
