//! Block Storage Module
//!
//! A uniform, fixed-block address space behind the `StorageAdapter` trait.
//!
//! ## Contract
//! ```text
//! ┌──────────────┬───────────────────────────────────────────────┐
//! │ malloc()     │ fresh address, monotonic, never reused        │
//! │ get(a)       │ the B bytes stored at a                       │
//! │ set(a, buf)  │ store B bytes at a (buf must be exactly B)    │
//! │ empty()      │ sentinel address: "no such block"             │
//! │ meta()       │ well-known address of the metadata block      │
//! │ block_size() │ B                                             │
//! └──────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! `EMPTY` is never a valid `get`/`set` target; `META` always is. Addresses
//! are opaque — the two adapters use different sentinel values and spacing,
//! and nothing outside an adapter may interpret them. Blocks are never freed.

mod file;
mod memory;

use std::sync::Arc;

use parking_lot::RwLock;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

/// Opaque block address
pub type Address = u64;

/// A fixed-size block store
///
/// `get` takes `&mut self` because the file-backed variant owns a single
/// seek cursor; callers serialize access through [`SharedStorage`].
pub trait StorageAdapter {
    /// Allocate a fresh block address
    fn malloc(&mut self) -> Address;

    /// Read the block at `addr`
    fn get(&mut self, addr: Address) -> Result<Vec<u8>>;

    /// Write a full block at `addr`
    fn set(&mut self, addr: Address, data: &[u8]) -> Result<()>;

    /// The "no such block" sentinel
    fn empty(&self) -> Address;

    /// The metadata block address
    fn meta(&self) -> Address;

    /// Bytes per block
    fn block_size(&self) -> usize;
}

/// Shared handle to one storage adapter
///
/// The tree engine and its caller (tests, the CLI) share the adapter behind
/// a `parking_lot::RwLock`. Reads take the write half because `get` mutates
/// the adapter's cursor.
pub type SharedStorage = Arc<RwLock<dyn StorageAdapter + Send + Sync>>;

/// Wrap an adapter into a [`SharedStorage`] handle
pub fn shared<S>(adapter: S) -> SharedStorage
where
    S: StorageAdapter + Send + Sync + 'static,
{
    Arc::new(RwLock::new(adapter))
}
