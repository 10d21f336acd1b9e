//! Collaborator interfaces
//!
//! The rules engine only ever talks to the layout and the wheel through
//! these traits, so either can be swapped for a fixture in tests.

use crate::common::types::Space;

/// Layout contract: resolves bet-space identifiers to grid coordinates
pub trait SpaceLookup {
    /// Grid position (row, column) of a space, if it exists on the layout
    fn position(&self, space: &str) -> Option<(usize, usize)>;

    /// Membership test
    fn contains(&self, space: &str) -> bool {
        self.position(space).is_some()
    }
}

/// Wheel contract: produces outcomes
pub trait OutcomeSource {
    /// Spin and return the winning pocket
    fn spin(&mut self) -> Space;
}
