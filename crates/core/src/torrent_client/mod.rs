//! Torrent client abstraction.
//!
//! This module provides a `BrushClient` trait covering what brushing needs
//! from a BitTorrent client: a status snapshot, the managed inventory, and
//! the operations a decision result is applied with.

mod types;

pub use types::*;
