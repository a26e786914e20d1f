//! Consistency checker
//!
//! Walks the whole tree and the leaf chain and verifies they describe the
//! same index. The first violation found is reported; its message carries
//! "block type", "data block", or "key" depending on whether the problem is
//! a tag, the chain structure, or key ordering.

use crate::error::{ArborError, Result};
use crate::storage::Address;

use super::{codec, BlockKind, Key, Tree};

impl Tree {
    /// Verify the tree structure and the leaf chain
    ///
    /// Checks, in order:
    /// 1. the root is a node block (or the tree is empty),
    /// 2. every node's children share one kind and every separator equals
    ///    its subtree's maximum key, separators non-decreasing,
    /// 3. the first in-order leaf is the cached chain head,
    /// 4. the chain visits exactly the tree's data blocks, in ascending key
    ///    order, and terminates at EMPTY.
    pub fn check_consistency(&self) -> Result<()> {
        if self.root == self.empty {
            if self.leftmost_data_block != self.empty {
                return Err(ArborError::Consistency(format!(
                    "empty tree still anchors a data block chain at {}",
                    self.leftmost_data_block
                )));
            }
            return Ok(());
        }

        let (kind, body) = self.read_block(self.root)?;
        if kind != BlockKind::Node {
            return Err(ArborError::Consistency(
                "root has a data block type where a node was expected".to_string(),
            ));
        }

        let mut leaves = Vec::new();
        self.verify_subtree(self.root, kind, &body, &mut leaves)?;
        self.verify_leaf_chain(&leaves)
    }

    /// Recursively verify one node and collect its leaves in order
    ///
    /// Returns the maximum key of the subtree so the parent can match it
    /// against its separator.
    fn verify_subtree(
        &self,
        addr: Address,
        kind: BlockKind,
        body: &[u8],
        leaves: &mut Vec<(Address, Key)>,
    ) -> Result<Key> {
        let pairs = codec::decode_node(kind, body)?;

        for window in pairs.windows(2) {
            if window[0].0 > window[1].0 {
                return Err(ArborError::Consistency(format!(
                    "node {} separator key {} precedes key {}",
                    addr, window[1].0, window[0].0
                )));
            }
        }

        let mut children = Vec::with_capacity(pairs.len());
        for (_, child_addr) in &pairs {
            children.push(self.read_block(*child_addr)?);
        }
        if children.windows(2).any(|w| w[0].0 != w[1].0) {
            return Err(ArborError::Consistency(format!(
                "node {} has children of mixed block type",
                addr
            )));
        }

        for ((separator, child_addr), (child_kind, child_body)) in pairs.iter().zip(&children) {
            let subtree_max = match child_kind {
                BlockKind::Node => {
                    self.verify_subtree(*child_addr, *child_kind, child_body, leaves)?
                }
                BlockKind::Data => {
                    let leaf = codec::decode_leaf(*child_kind, child_body)?;
                    leaves.push((*child_addr, leaf.key));
                    leaf.key
                }
            };
            if subtree_max != *separator {
                return Err(ArborError::Consistency(format!(
                    "separator key {} of node {} does not match its subtree maximum key {}",
                    separator, addr, subtree_max
                )));
            }
        }

        // decode_node guarantees at least one pair
        Ok(pairs[pairs.len() - 1].0)
    }

    /// Verify the chain against the in-order leaf sequence of the tree
    fn verify_leaf_chain(&self, leaves: &[(Address, Key)]) -> Result<()> {
        let mut current = self.leftmost_data_block;
        let mut previous_key: Option<Key> = None;

        for (expected_addr, expected_key) in leaves {
            if current == self.empty {
                return Err(ArborError::Consistency(format!(
                    "leaf chain terminates before reaching data block {}",
                    expected_addr
                )));
            }
            if current != *expected_addr {
                return Err(ArborError::Consistency(format!(
                    "leaf chain visits data block {} where {} was expected",
                    current, expected_addr
                )));
            }

            let (kind, body) = self.read_block(current)?;
            let leaf = codec::decode_leaf(kind, &body)?;

            if leaf.key != *expected_key {
                return Err(ArborError::Consistency(format!(
                    "data block {} stores key {} but the tree indexes it under key {}",
                    current, leaf.key, expected_key
                )));
            }
            if let Some(previous) = previous_key {
                if leaf.key < previous {
                    return Err(ArborError::Consistency(format!(
                        "leaf chain key {} at data block {} precedes key {}",
                        leaf.key, current, previous
                    )));
                }
            }

            previous_key = Some(leaf.key);
            current = leaf.next;
        }

        if current != self.empty {
            return Err(ArborError::Consistency(format!(
                "leaf chain continues past the last data block into {}",
                current
            )));
        }

        Ok(())
    }
}
