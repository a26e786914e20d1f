//! Tests for the block storage adapters
//!
//! Both variants are run through the same contract checks:
//! - malloc hands out fresh addresses distinct from the sentinels
//! - set/get round-trips a full block
//! - wrong buffer sizes and unallocated addresses are rejected
//! - the EMPTY sentinel is never a valid target, META always is
//!
//! The file-backed variant additionally covers reopen behavior.

use arbor::{ArborError, FileStorage, MemoryStorage, StorageAdapter};
use tempfile::TempDir;

const BLOCK_SIZE: usize = 64;

/// Fill a block with a text marker, zero-padded to the block size
fn from_text(text: &str, block_size: usize) -> Vec<u8> {
    let mut block = text.as_bytes().to_vec();
    block.resize(block_size, 0);
    block
}

fn adapters() -> (TempDir, Vec<Box<dyn StorageAdapter>>) {
    let dir = TempDir::new().unwrap();
    let file = FileStorage::new(BLOCK_SIZE, dir.path().join("storage.bin"), true).unwrap();
    (
        dir,
        vec![Box::new(MemoryStorage::new(BLOCK_SIZE)), Box::new(file)],
    )
}

// =============================================================================
// Contract Tests (both adapters)
// =============================================================================

#[test]
fn test_malloc_distinct_from_sentinels() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let first = adapter.malloc();
        let second = adapter.malloc();

        assert_ne!(first, adapter.empty());
        assert_ne!(first, adapter.meta());
        assert_ne!(first, second);
    }
}

#[test]
fn test_read_what_was_written() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let data = from_text("hello", BLOCK_SIZE);
        let addr = adapter.malloc();
        adapter.set(addr, &data).unwrap();

        assert_eq!(adapter.get(addr).unwrap(), data);
    }
}

#[test]
fn test_overwrite_replaces_block() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let addr = adapter.malloc();
        adapter.set(addr, &from_text("first", BLOCK_SIZE)).unwrap();
        adapter.set(addr, &from_text("second", BLOCK_SIZE)).unwrap();

        assert_eq!(adapter.get(addr).unwrap(), from_text("second", BLOCK_SIZE));
    }
}

#[test]
fn test_wrong_data_size_rejected() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let addr = adapter.malloc();

        let short = vec![0u8; BLOCK_SIZE - 1];
        assert!(matches!(
            adapter.set(addr, &short),
            Err(ArborError::Encoding(_))
        ));

        let long = vec![0u8; BLOCK_SIZE + 1];
        assert!(matches!(
            adapter.set(addr, &long),
            Err(ArborError::Encoding(_))
        ));
    }
}

#[test]
fn test_unallocated_address_rejected() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let data = vec![0u8; BLOCK_SIZE];

        // Far beyond anything malloc has handed out
        assert!(matches!(
            adapter.set(999_999, &data),
            Err(ArborError::Address(_))
        ));
        assert!(matches!(adapter.get(999_999), Err(ArborError::Address(_))));
    }
}

#[test]
fn test_empty_sentinel_never_dereferenced() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let empty = adapter.empty();
        let data = vec![0u8; BLOCK_SIZE];

        assert!(matches!(adapter.get(empty), Err(ArborError::Address(_))));
        assert!(matches!(
            adapter.set(empty, &data),
            Err(ArborError::Address(_))
        ));
    }
}

#[test]
fn test_meta_always_accessible() {
    let (_dir, mut adapters) = adapters();

    for adapter in &mut adapters {
        let meta = adapter.meta();

        // Construction writes a zeroed metadata block
        assert_eq!(adapter.get(meta).unwrap(), vec![0u8; BLOCK_SIZE]);

        let data = from_text("root", BLOCK_SIZE);
        adapter.set(meta, &data).unwrap();
        assert_eq!(adapter.get(meta).unwrap(), data);
    }
}

#[test]
fn test_block_size_reported() {
    let (_dir, adapters) = adapters();

    for adapter in &adapters {
        assert_eq!(adapter.block_size(), BLOCK_SIZE);
    }
}

// =============================================================================
// File Adapter Tests
// =============================================================================

#[test]
fn test_file_misaligned_address_rejected() {
    let dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(BLOCK_SIZE, dir.path().join("storage.bin"), true).unwrap();

    let addr = storage.malloc();
    assert!(matches!(
        storage.get(addr + 5),
        Err(ArborError::Address(_))
    ));
}

#[test]
fn test_file_reopen_preserves_blocks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.bin");

    let before = from_text("before", BLOCK_SIZE);
    let after = from_text("after", BLOCK_SIZE);

    let mut storage = FileStorage::new(BLOCK_SIZE, &path, true).unwrap();
    let addr_before = storage.malloc();
    storage.set(addr_before, &before).unwrap();
    assert_eq!(storage.get(addr_before).unwrap(), before);
    drop(storage);

    let mut storage = FileStorage::new(BLOCK_SIZE, &path, false).unwrap();
    let addr_after = storage.malloc();
    storage.set(addr_after, &after).unwrap();

    assert_eq!(storage.get(addr_before).unwrap(), before);
    assert_eq!(storage.get(addr_after).unwrap(), after);
}

#[test]
fn test_file_meta_durable_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.bin");

    let marker = from_text("anchored", BLOCK_SIZE);

    let mut storage = FileStorage::new(BLOCK_SIZE, &path, true).unwrap();
    let meta = storage.meta();
    storage.set(meta, &marker).unwrap();
    drop(storage);

    let mut storage = FileStorage::new(BLOCK_SIZE, &path, false).unwrap();
    assert_eq!(storage.get(storage.meta()).unwrap(), marker);
}

#[test]
fn test_file_cannot_open_missing() {
    let dir = TempDir::new().unwrap();

    let result = FileStorage::new(BLOCK_SIZE, dir.path().join("missing.bin"), false);
    match result {
        Err(ArborError::Config(message)) => assert!(message.contains("cannot open")),
        other => panic!("expected a cannot-open error, got {:?}", other.err()),
    }
}

#[test]
fn test_file_reopen_rejects_bad_size() {
    let dir = TempDir::new().unwrap();

    // Not a multiple of the block size
    let ragged = dir.path().join("ragged.bin");
    std::fs::write(&ragged, vec![0u8; BLOCK_SIZE * 2 + 3]).unwrap();
    assert!(matches!(
        FileStorage::new(BLOCK_SIZE, &ragged, false),
        Err(ArborError::Config(_))
    ));

    // Too short to cover the metadata block
    let short = dir.path().join("short.bin");
    std::fs::write(&short, vec![0u8; BLOCK_SIZE]).unwrap();
    assert!(matches!(
        FileStorage::new(BLOCK_SIZE, &short, false),
        Err(ArborError::Config(_))
    ));
}

#[test]
fn test_file_truncate_discards_previous_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.bin");

    let mut storage = FileStorage::new(BLOCK_SIZE, &path, true).unwrap();
    let addr = storage.malloc();
    storage.set(addr, &from_text("old", BLOCK_SIZE)).unwrap();
    drop(storage);

    let mut storage = FileStorage::new(BLOCK_SIZE, &path, true).unwrap();
    // The old allocation is gone along with its contents
    assert!(matches!(storage.get(addr), Err(ArborError::Address(_))));
    assert_eq!(storage.get(storage.meta()).unwrap(), vec![0u8; BLOCK_SIZE]);
}
