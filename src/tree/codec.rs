//! Block codec
//!
//! Pure, stateless encoding and decoding of the three block kinds.
//!
//! ## Block Layouts (all integers u64 little-endian)
//!
//! ### NODE block
//! ```text
//! ┌─────────┬───────────┬─────────────────────────────┬─────────┐
//! │ Tag (1) │ Count (8) │ (Key, Child) × n  (16 each) │ Zeros   │
//! └─────────┴───────────┴─────────────────────────────┴─────────┘
//! ```
//! Keys ascend; `child_i` is the subtree whose keys are ≤ `key_i`, so the
//! last key is the upper bound of the whole node.
//!
//! ### DATA block
//! ```text
//! ┌─────────┬──────────┬─────────┬──────────────────────────────┐
//! │ Tag (1) │ Next (8) │ Key (8) │ Payload (B − 17)             │
//! └─────────┴──────────┴─────────┴──────────────────────────────┘
//! ```
//! `Next` threads all leaves in ascending key order; the last leaf stores
//! the EMPTY sentinel.
//!
//! ### Metadata block
//! ```text
//! ┌───────────────────┬─────────────────────────────────────────┐
//! │ Root address (8)  │ Zeros                                   │
//! └───────────────────┴─────────────────────────────────────────┘
//! ```

use crate::error::{ArborError, Result};
use crate::storage::Address;

use super::Key;

/// Byte width of keys, addresses, and counts
pub const NUM_SIZE: usize = std::mem::size_of::<u64>();

/// One-byte tag of an internal block
pub(crate) const NODE_TAG: u8 = 0x01;

/// One-byte tag of a leaf block
pub(crate) const DATA_TAG: u8 = 0x02;

/// The two kinds of non-meta blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Internal block of (key, child address) pairs
    Node,
    /// Leaf block holding one payload
    Data,
}

/// Decoded leaf block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafBlock {
    pub payload: Vec<u8>,
    pub key: Key,
    pub next: Address,
}

/// How many (key, child) pairs fit in one node block
pub fn node_capacity(block_size: usize) -> usize {
    (block_size - 1 - NUM_SIZE) / (2 * NUM_SIZE)
}

/// The exact payload length a leaf block holds
pub fn leaf_payload_size(block_size: usize) -> usize {
    block_size - 1 - 2 * NUM_SIZE
}

// =============================================================================
// Tag peeling
// =============================================================================

/// Peel the one-byte tag off a block, returning its kind and body
pub fn check_type(block: &[u8]) -> Result<(BlockKind, &[u8])> {
    let (&tag, body) = block.split_first().ok_or_else(|| {
        ArborError::Decoding("cannot read the block type of an empty buffer".to_string())
    })?;

    match tag {
        NODE_TAG => Ok((BlockKind::Node, body)),
        DATA_TAG => Ok((BlockKind::Data, body)),
        other => Err(ArborError::Decoding(format!(
            "bad block type (0x{:02x})",
            other
        ))),
    }
}

// =============================================================================
// NODE blocks
// =============================================================================

/// Encode (key, child) pairs into a full tagged node block
pub fn encode_node(pairs: &[(Key, Address)], block_size: usize) -> Result<Vec<u8>> {
    if pairs.is_empty() {
        return Err(ArborError::Encoding(
            "cannot encode a node block with zero pairs".to_string(),
        ));
    }
    if pairs.len() > node_capacity(block_size) {
        return Err(ArborError::Encoding(format!(
            "{} pairs do not fit in a node block (capacity {})",
            pairs.len(),
            node_capacity(block_size)
        )));
    }

    let mut block = Vec::with_capacity(block_size);
    block.push(NODE_TAG);
    block.extend_from_slice(&(pairs.len() as u64).to_le_bytes());
    for (key, child) in pairs {
        block.extend_from_slice(&key.to_le_bytes());
        block.extend_from_slice(&child.to_le_bytes());
    }
    block.resize(block_size, 0);

    Ok(block)
}

/// Decode the body of a node block into its (key, child) pairs
///
/// `kind` is the tag peeled by [`check_type`]; a non-node kind is rejected
/// before any field is parsed.
pub fn decode_node(kind: BlockKind, body: &[u8]) -> Result<Vec<(Key, Address)>> {
    if kind != BlockKind::Node {
        return Err(ArborError::Decoding("non-node block".to_string()));
    }
    if body.len() < NUM_SIZE {
        return Err(ArborError::Decoding(format!(
            "node block body ({} bytes) is too short for a pair count",
            body.len()
        )));
    }

    let count = u64::from_le_bytes(body[0..NUM_SIZE].try_into().unwrap()) as usize;
    if count == 0 {
        return Err(ArborError::Decoding(
            "node block holds zero pairs".to_string(),
        ));
    }
    if count > (body.len() - NUM_SIZE) / (2 * NUM_SIZE) {
        return Err(ArborError::Decoding(format!(
            "node block pair count ({}) exceeds the block body",
            count
        )));
    }

    let mut pairs = Vec::with_capacity(count);
    let mut pos = NUM_SIZE;
    for _ in 0..count {
        let key = u64::from_le_bytes(body[pos..pos + NUM_SIZE].try_into().unwrap());
        pos += NUM_SIZE;
        let child =
            u64::from_le_bytes(body[pos..pos + NUM_SIZE].try_into().unwrap());
        pos += NUM_SIZE;
        pairs.push((key, child));
    }

    Ok(pairs)
}

// =============================================================================
// DATA blocks
// =============================================================================

/// Encode one (key, payload) record into a full tagged leaf block
pub fn encode_leaf(
    next: Address,
    key: Key,
    payload: &[u8],
    block_size: usize,
) -> Result<Vec<u8>> {
    let expected = leaf_payload_size(block_size);
    if payload.len() != expected {
        return Err(ArborError::Encoding(format!(
            "payload size ({}) does not match the leaf payload size ({})",
            payload.len(),
            expected
        )));
    }

    let mut block = Vec::with_capacity(block_size);
    block.push(DATA_TAG);
    block.extend_from_slice(&next.to_le_bytes());
    block.extend_from_slice(&key.to_le_bytes());
    block.extend_from_slice(payload);

    Ok(block)
}

/// Decode the body of a leaf block
///
/// `kind` is the tag peeled by [`check_type`]; a non-data kind is rejected
/// before any field is parsed.
pub fn decode_leaf(kind: BlockKind, body: &[u8]) -> Result<LeafBlock> {
    if kind != BlockKind::Data {
        return Err(ArborError::Decoding("non-data block".to_string()));
    }
    if body.len() < 2 * NUM_SIZE {
        return Err(ArborError::Decoding(format!(
            "data block body ({} bytes) is too short for its header",
            body.len()
        )));
    }

    let next = u64::from_le_bytes(body[0..NUM_SIZE].try_into().unwrap());
    let key =
        u64::from_le_bytes(body[NUM_SIZE..2 * NUM_SIZE].try_into().unwrap());
    let payload = body[2 * NUM_SIZE..].to_vec();

    Ok(LeafBlock { payload, key, next })
}

// =============================================================================
// Metadata block
// =============================================================================

/// Encode the root address into a full metadata block
pub fn encode_meta(root: Address, block_size: usize) -> Vec<u8> {
    let mut block = vec![0u8; block_size];
    block[0..NUM_SIZE].copy_from_slice(&root.to_le_bytes());
    block
}

/// Decode the root address from a metadata block
pub fn decode_meta(block: &[u8]) -> Result<Address> {
    if block.len() < NUM_SIZE {
        return Err(ArborError::Decoding(format!(
            "metadata block ({} bytes) is too short for a root address",
            block.len()
        )));
    }

    Ok(u64::from_le_bytes(
        block[0..NUM_SIZE].try_into().unwrap(),
    ))
}
