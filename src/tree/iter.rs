//! Leaf-chain iterator
//!
//! Sequential iteration over all (key, payload) records in ascending key
//! order, following the `next` pointers of the data blocks.

use crate::error::Result;
use crate::storage::Address;

use super::{codec, Key, Tree};

/// Iterator over the records of a [`Tree`] in ascending key order
pub struct TreeIter<'a> {
    tree: &'a Tree,
    current: Address,
}

impl Tree {
    /// Iterate over every (key, payload) record, leftmost leaf first
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            tree: self,
            current: self.leftmost_data_block,
        }
    }
}

impl<'a> Iterator for TreeIter<'a> {
    /// (key, payload) — storage and decoding failures end the walk
    type Item = Result<(Key, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.tree.empty {
            return None;
        }

        let leaf = self
            .tree
            .read_block(self.current)
            .and_then(|(kind, body)| codec::decode_leaf(kind, &body));

        match leaf {
            Ok(leaf) => {
                self.current = leaf.next;
                Some(Ok((leaf.key, leaf.payload)))
            }
            Err(e) => {
                // Stop after surfacing the failure once
                self.current = self.tree.empty;
                Some(Err(e))
            }
        }
    }
}
