//! This module defines general error types used throughout the crate.

use thiserror::Error;

/// Error type for distance table construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// The breadth first search reached a depth that collides with the
    /// "unreached" sentinel, so exact distances can no longer be represented.
    /// The coordinate space needs the compressed mod 3 table instead.
    #[error("state space diameter reached the unreached sentinel at depth {depth}")]
    DiameterOverflow {
        /// The depth at which the overflow occurred.
        depth: usize,
    },
}
