//! In-memory storage adapter
//!
//! Backing is a map from address to block buffer. Useful for tests,
//! benchmarks, and throwaway indexes.

use std::collections::HashMap;

use crate::error::{ArborError, Result};

use super::{Address, StorageAdapter};

/// Sentinel meaning "no such block"
const EMPTY: Address = 0;

/// Address of the metadata block
const META: Address = 1;

/// In-memory block store
pub struct MemoryStorage {
    block_size: usize,
    blocks: HashMap<Address, Vec<u8>>,
    /// Next address handed out by `malloc`
    next_addr: Address,
}

impl MemoryStorage {
    /// Create a store of `block_size`-byte blocks with a zeroed metadata block
    pub fn new(block_size: usize) -> Self {
        let mut blocks = HashMap::new();
        blocks.insert(META, vec![0u8; block_size]);

        Self {
            block_size,
            blocks,
            next_addr: META + 1,
        }
    }

    fn check_address(&self, addr: Address) -> Result<()> {
        if addr == EMPTY {
            return Err(ArborError::Address(
                "attempt to access the empty sentinel".to_string(),
            ));
        }
        if addr >= self.next_addr {
            return Err(ArborError::Address(format!(
                "attempt to access address {} that was never allocated",
                addr
            )));
        }
        Ok(())
    }
}

impl StorageAdapter for MemoryStorage {
    fn malloc(&mut self) -> Address {
        let addr = self.next_addr;
        self.next_addr += 1;
        self.blocks.insert(addr, vec![0u8; self.block_size]);
        addr
    }

    fn get(&mut self, addr: Address) -> Result<Vec<u8>> {
        self.check_address(addr)?;

        self.blocks.get(&addr).cloned().ok_or_else(|| {
            ArborError::Address(format!("no block stored at address {}", addr))
        })
    }

    fn set(&mut self, addr: Address, data: &[u8]) -> Result<()> {
        if data.len() != self.block_size {
            return Err(ArborError::Encoding(format!(
                "data size ({}) does not match block size ({})",
                data.len(),
                self.block_size
            )));
        }

        self.check_address(addr)?;

        self.blocks.insert(addr, data.to_vec());
        Ok(())
    }

    fn empty(&self) -> Address {
        EMPTY
    }

    fn meta(&self) -> Address {
        META
    }

    fn block_size(&self) -> usize {
        self.block_size
    }
}
