//! # Arbor
//!
//! A persistent, block-oriented B+ tree index with:
//! - Bulk loading from a (key, payload) sequence
//! - Point lookups, range scans, and duplicate keys
//! - Reopen from the block store alone (root anchored in a metadata block)
//! - A structural consistency checker
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Tree Engine                           │
//! │        (bulk-load, point/range search, consistency)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Tree Codec                            │
//! │           (META / NODE / DATA block encoding)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Memory    │          │    File     │
//!   │   Storage   │          │   Storage   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! The engine is single-threaded and non-suspending: no operation yields
//! beyond the underlying storage call, and the store is assumed quiesced
//! between calls.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod tree;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ArborError, Result};
pub use config::Config;
pub use storage::{shared, Address, FileStorage, MemoryStorage, SharedStorage, StorageAdapter};
pub use tree::{BlockKind, Key, Tree, TreeIter, MIN_BLOCK_SIZE};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Arbor
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
