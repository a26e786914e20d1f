//! File-backed storage adapter
//!
//! Backing is a single file of `B`-aligned slots.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Slot 0 (addr 0)   unused — the EMPTY sentinel│
//! ├──────────────────────────────────────────────┤
//! │ Slot 1 (addr B)   metadata block             │
//! │   Root address: u64 LE (8) | zero padding    │
//! ├──────────────────────────────────────────────┤
//! │ Slot 2.. (addr 2B, 3B, …)  NODE / DATA blocks│
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The file carries no header; the caller supplies the block size again on
//! reopen. A reopened file must be a positive multiple of `B` of at least
//! `2B` bytes.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ArborError, Result};

use super::{Address, StorageAdapter};

/// Sentinel meaning "no such block" (slot 0 is never written)
const EMPTY: Address = 0;

/// File-backed block store
pub struct FileStorage {
    path: PathBuf,
    file: File,
    block_size: usize,
    /// Next address handed out by `malloc`; equals the committed file extent
    next_addr: Address,
}

impl FileStorage {
    /// Open a file-backed store
    ///
    /// With `truncate = true` the file is created (or emptied) and a zeroed
    /// metadata block is written. With `truncate = false` the file must
    /// already exist; the allocation counter resumes at the current file
    /// size, so `malloc` must not be called before the caller has
    /// re-anchored its metadata.
    pub fn new(block_size: usize, path: impl AsRef<Path>, truncate: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(truncate)
            .truncate(truncate)
            .open(&path)
            .map_err(|e| {
                ArborError::Config(format!("cannot open {}: {}", path.display(), e))
            })?;

        let mut storage = Self {
            path,
            file,
            block_size,
            next_addr: 2 * block_size as Address,
        };

        if truncate {
            storage.set(storage.meta(), &vec![0u8; block_size])?;
            debug!(path = %storage.path.display(), block_size, "created block store");
        } else {
            let len = storage.file.metadata()?.len();
            if len < 2 * block_size as u64 || len % block_size as u64 != 0 {
                return Err(ArborError::Config(format!(
                    "file size ({}) of {} is not a positive multiple of block size ({}) covering the metadata block",
                    len,
                    storage.path.display(),
                    block_size
                )));
            }
            storage.next_addr = len;
            debug!(path = %storage.path.display(), block_size, len, "reopened block store");
        }

        Ok(storage)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_address(&self, addr: Address) -> Result<()> {
        if addr == EMPTY {
            return Err(ArborError::Address(
                "attempt to access the empty sentinel".to_string(),
            ));
        }
        if addr % self.block_size as Address != 0 || addr >= self.next_addr {
            return Err(ArborError::Address(format!(
                "attempt to access address {} that was never allocated",
                addr
            )));
        }
        Ok(())
    }
}

impl StorageAdapter for FileStorage {
    fn malloc(&mut self) -> Address {
        let addr = self.next_addr;
        self.next_addr += self.block_size as Address;
        addr
    }

    fn get(&mut self, addr: Address) -> Result<Vec<u8>> {
        self.check_address(addr)?;

        let mut block = vec![0u8; self.block_size];
        self.file.seek(SeekFrom::Start(addr))?;
        self.file.read_exact(&mut block)?;

        Ok(block)
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

        self.file.seek(SeekFrom::Start(addr))?;
        self.file.write_all(data)?;

        Ok(())
    }

    fn empty(&self) -> Address {
        EMPTY
    }

    fn meta(&self) -> Address {
        self.block_size as Address
    }

    fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        // A metadata write followed by drop must be durable to a reopen.
        let _ = self.file.sync_all();
    }
}
