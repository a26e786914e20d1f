//! Bulk-load construction
//!
//! Builds the tree bottom-up: the leaf chain first, then repeated layer
//! folds until a single node block holds the whole layer. That node is the
//! root, and its address is persisted in the metadata block.

use tracing::debug;

use crate::error::Result;
use crate::storage::{Address, SharedStorage, StorageAdapter};

use super::{codec, ensure_block_size, Key, Tree};

impl Tree {
    /// Build an index from a (key, payload) sequence
    ///
    /// The input is stably sorted by key, so records may arrive in any
    /// order and duplicates keep their insertion order. Every payload must
    /// be exactly [`Tree::payload_size`] bytes long.
    pub fn build(storage: SharedStorage, mut data: Vec<(Key, Vec<u8>)>) -> Result<Self> {
        let (block_size, empty) = {
            let adapter = storage.read();
            (adapter.block_size(), adapter.empty())
        };
        ensure_block_size(block_size)?;

        let mut tree = Self {
            storage,
            root: empty,
            leftmost_data_block: empty,
            block_size,
            empty,
        };

        data.sort_by_key(|(key, _)| *key);
        tree.bulk_load(data)?;

        Ok(tree)
    }

    fn bulk_load(&mut self, data: Vec<(Key, Vec<u8>)>) -> Result<()> {
        let record_count = data.len();
        let mut layer = self.write_leaf_chain(data)?;

        let capacity = codec::node_capacity(self.block_size);
        let mut height = 0u32;
        while layer.len() > capacity {
            layer = self.push_layer(&layer)?;
            height += 1;
            debug!(height, width = layer.len(), "folded layer");
        }

        if !layer.is_empty() {
            self.root = self.create_node_block(&layer)?;
        }

        let meta_block = codec::encode_meta(self.root, self.block_size);
        let meta = self.storage.read().meta();
        self.storage.write().set(meta, &meta_block)?;

        debug!(
            records = record_count,
            root = self.root,
            leftmost = self.leftmost_data_block,
            "built tree"
        );
        Ok(())
    }

    /// Write the leaf chain in key order, returning the (key, address) layer
    ///
    /// Each leaf is written once its successor's address is known; the last
    /// leaf points at EMPTY. Also caches the chain head.
    fn write_leaf_chain(&mut self, data: Vec<(Key, Vec<u8>)>) -> Result<Vec<(Key, Address)>> {
        let mut layer = Vec::with_capacity(data.len());
        let mut pending: Option<(Address, Key, Vec<u8>)> = None;

        for (key, payload) in data {
            let addr = self.storage.write().malloc();
            if let Some((prev_addr, prev_key, prev_payload)) = pending.take() {
                let block = codec::encode_leaf(addr, prev_key, &prev_payload, self.block_size)?;
                self.storage.write().set(prev_addr, &block)?;
            } else {
                self.leftmost_data_block = addr;
            }
            layer.push((key, addr));
            pending = Some((addr, key, payload));
        }

        if let Some((last_addr, last_key, last_payload)) = pending {
            let block = codec::encode_leaf(self.empty, last_key, &last_payload, self.block_size)?;
            self.storage.write().set(last_addr, &block)?;
        }

        Ok(layer)
    }

    /// Fold one layer into the next: greedy chunks of at most `capacity`
    /// pairs, one node block per chunk, emitting (max key in chunk, address)
    pub(crate) fn push_layer(&self, layer: &[(Key, Address)]) -> Result<Vec<(Key, Address)>> {
        let capacity = codec::node_capacity(self.block_size);

        let mut pushed = Vec::with_capacity(layer.len().div_ceil(capacity));
        for chunk in layer.chunks(capacity) {
            let addr = self.create_node_block(chunk)?;
            let (max_key, _) = chunk[chunk.len() - 1];
            pushed.push((max_key, addr));
        }

        Ok(pushed)
    }

    /// Allocate and write one node block
    pub(crate) fn create_node_block(&self, pairs: &[(Key, Address)]) -> Result<Address> {
        let block = codec::encode_node(pairs, self.block_size)?;
        let addr = self.storage.write().malloc();
        self.storage.write().set(addr, &block)?;
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{shared, MemoryStorage, StorageAdapter};
    use crate::tree::codec;
    use crate::tree::Tree;

    const BLOCK_SIZE: usize = 64;

    fn empty_tree() -> Tree {
        Tree::build(shared(MemoryStorage::new(BLOCK_SIZE)), Vec::new()).unwrap()
    }

    #[test]
    fn push_layer_groups_pairs_and_keeps_maxima() {
        let tree = empty_tree();

        // Two node blocks' worth of pairs
        let pairs: Vec<_> = (0u64..2 * codec::node_capacity(BLOCK_SIZE) as u64)
            .map(|i| (i, i * 1000))
            .collect();

        let pushed = tree.push_layer(&pairs).unwrap();
        assert_eq!(pushed.len(), 2);

        let mut seen = 0;
        for (max_key, addr) in &pushed {
            let (kind, body) = tree.read_block(*addr).unwrap();
            let block = codec::decode_node(kind, &body).unwrap();
            for (key, child) in block {
                assert!(key <= *max_key);
                assert_eq!(child, key * 1000);
                seen += 1;
            }
        }
        assert_eq!(seen, pairs.len());
    }

    #[test]
    fn create_node_block_rejects_oversized_layers() {
        let tree = empty_tree();
        let pairs: Vec<_> = (0u64..BLOCK_SIZE as u64 / 2).map(|i| (i, i)).collect();

        assert!(tree.create_node_block(&pairs).is_err());
    }

    #[test]
    fn create_node_block_round_trips() {
        let tree = empty_tree();
        let pairs: Vec<_> = (0u64..codec::node_capacity(BLOCK_SIZE) as u64)
            .map(|i| (i, i * 1000))
            .collect();

        let addr = tree.create_node_block(&pairs).unwrap();
        let (kind, body) = tree.read_block(addr).unwrap();
        assert_eq!(kind, codec::BlockKind::Node);
        assert_eq!(codec::decode_node(kind, &body).unwrap(), pairs);
    }

    #[test]
    fn empty_input_writes_an_empty_root() {
        let storage = shared(MemoryStorage::new(BLOCK_SIZE));
        let tree = Tree::build(storage.clone(), Vec::new()).unwrap();

        let empty = storage.read().empty();
        assert_eq!(tree.root(), empty);
        assert_eq!(tree.leftmost_data_block(), empty);

        let meta = storage.read().meta();
        let meta_block = storage.write().get(meta).unwrap();
        assert_eq!(codec::decode_meta(&meta_block).unwrap(), empty);
    }
}
