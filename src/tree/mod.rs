//! Tree Module
//!
//! A persistent B+ tree index mapping u64 keys to fixed-length payloads,
//! bulk-loaded bottom-up from a key/payload sequence and recoverable from
//! its block store alone.
//!
//! ## Structure
//! ```text
//! ┌──────────┐
//! │   META   │ root address
//! └────┬─────┘
//!      ▼
//! ┌──────────┐        NODE blocks: (key, child) pairs,
//! │   NODE   │        each key the maximum of its subtree
//! └─┬──────┬─┘
//!   ▼      ▼
//! ┌────┐ ┌────┐
//! │NODE│ │NODE│
//! └─┬──┘ └──┬─┘
//!   ▼       ▼
//! ┌────┐  ┌────┐      DATA blocks: one (key, payload) each,
//! │DATA│─▶│DATA│─▶ …  chained in ascending key order
//! └────┘  └────┘
//! ```
//!
//! Construction allocates the leaf chain first, then folds each layer into
//! node blocks until a single root remains. Queries descend from the root
//! and finish on the leaf chain.

pub mod codec;

mod builder;
mod check;
mod iter;
mod search;

use tracing::debug;

pub use codec::{BlockKind, LeafBlock};
pub use iter::TreeIter;

use crate::error::{ArborError, Result};
use crate::storage::{Address, SharedStorage, StorageAdapter};

/// Key type: a fixed-width unsigned integer
pub type Key = u64;

/// Smallest usable block size: tag + count + two (key, child) pairs
///
/// This also guarantees a leaf holds at least a one-byte payload.
pub const MIN_BLOCK_SIZE: usize = 1 + codec::NUM_SIZE + 4 * codec::NUM_SIZE;

/// A persistent, read-only-after-construction B+ tree index
pub struct Tree {
    storage: SharedStorage,
    /// Root node block, or the EMPTY sentinel for an empty tree
    root: Address,
    /// Head of the leaf chain, or the EMPTY sentinel for an empty tree
    leftmost_data_block: Address,
    /// Cached from the adapter at construction
    block_size: usize,
    empty: Address,
}

impl Tree {
    /// Reopen an index from an existing store
    ///
    /// Reads the root address from the metadata block and descends to the
    /// leftmost leaf.
    pub fn open(storage: SharedStorage) -> Result<Self> {
        let (block_size, empty, meta) = {
            let adapter = storage.read();
            (adapter.block_size(), adapter.empty(), adapter.meta())
        };
        ensure_block_size(block_size)?;

        let meta_block = storage.write().get(meta)?;
        let root = codec::decode_meta(&meta_block)?;

        let mut tree = Self {
            storage,
            root,
            leftmost_data_block: empty,
            block_size,
            empty,
        };

        if root != empty {
            tree.leftmost_data_block = tree.descend_leftmost()?;
        }
        debug!(root, leftmost = tree.leftmost_data_block, "opened tree");

        Ok(tree)
    }

    /// Address of the root block (EMPTY for an empty tree)
    pub fn root(&self) -> Address {
        self.root
    }

    /// Address of the first leaf in the chain (EMPTY for an empty tree)
    pub fn leftmost_data_block(&self) -> Address {
        self.leftmost_data_block
    }

    /// Block size of the underlying store
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The exact payload length this tree's leaves hold
    pub fn payload_size(&self) -> usize {
        codec::leaf_payload_size(self.block_size)
    }

    /// Read a block and peel its tag
    pub(crate) fn read_block(&self, addr: Address) -> Result<(BlockKind, Vec<u8>)> {
        let block = self.storage.write().get(addr)?;
        let (kind, body) = codec::check_type(&block)?;
        Ok((kind, body.to_vec()))
    }

    /// Follow first-child pointers from the root down to the first leaf
    fn descend_leftmost(&self) -> Result<Address> {
        let mut addr = self.root;
        loop {
            let (kind, body) = self.read_block(addr)?;
            match kind {
                BlockKind::Node => {
                    let pairs = codec::decode_node(kind, &body)?;
                    // decode_node guarantees at least one pair
                    addr = pairs[0].1;
                }
                BlockKind::Data => return Ok(addr),
            }
        }
    }
}

/// Refuse stores too small for a node block of two pairs
pub(crate) fn ensure_block_size(block_size: usize) -> Result<()> {
    if block_size < MIN_BLOCK_SIZE {
        return Err(ArborError::Config(format!(
            "block size too small ({} < {})",
            block_size, MIN_BLOCK_SIZE
        )));
    }
    Ok(())
}
