//! Point and range search
//!
//! Both descend from the root picking the leftmost separator that covers
//! the lower bound, then walk the leaf chain. A point search is a range
//! search with `lo == hi`.

use crate::error::Result;
use crate::storage::Address;

use super::{codec, BlockKind, Key, Tree};

impl Tree {
    /// Collect every payload stored under `key`, in insertion order
    pub fn search(&self, key: Key) -> Result<Vec<Vec<u8>>> {
        self.search_range(key, key)
    }

    /// Collect every payload with `lo <= key <= hi`, in ascending key order
    /// (duplicates in insertion order)
    ///
    /// An inverted range (`lo > hi`) yields no payloads.
    pub fn search_range(&self, lo: Key, hi: Key) -> Result<Vec<Vec<u8>>> {
        if self.root == self.empty || lo > hi {
            return Ok(Vec::new());
        }

        let mut addr = self.root;
        loop {
            let (kind, body) = self.read_block(addr)?;
            match kind {
                BlockKind::Node => {
                    let pairs = codec::decode_node(kind, &body)?;
                    // Leftmost separator covering lo, so duplicates that
                    // begin in an earlier subtree are not missed.
                    match pairs.iter().find(|(key, _)| *key >= lo) {
                        Some((_, child)) => addr = *child,
                        // lo is beyond the largest key in the tree
                        None => return Ok(Vec::new()),
                    }
                }
                BlockKind::Data => return self.collect_from_leaf(addr, lo, hi),
            }
        }
    }

    /// Walk the leaf chain from `addr`, collecting payloads inside [lo, hi]
    fn collect_from_leaf(&self, addr: Address, lo: Key, hi: Key) -> Result<Vec<Vec<u8>>> {
        let mut results = Vec::new();

        let mut current = addr;
        while current != self.empty {
            let (kind, body) = self.read_block(current)?;
            let leaf = codec::decode_leaf(kind, &body)?;

            if leaf.key > hi {
                break;
            }
            // A separator may round up to this leaf even though its key is
            // below the range; skip forward.
            if leaf.key >= lo {
                results.push(leaf.payload);
            }
            current = leaf.next;
        }

        Ok(results)
    }
}
