//! Next-level memory behind the cache.
//!
//! This module defines the integration point through which the cache exchanges whole
//! blocks with main memory. It provides:
//! 1. **Trait:** [`BackingStore`], invoked on every miss (fetch) and on every dirty eviction (write-back).
//! 2. **Default:** [`ZeroFill`], which performs no transfer; allocated lines stay zero-filled.
//! 3. **Functional memory:** [`BlockMemory`], a sparse block store that keeps written-back data.
//!
//! On a miss the cache calls `write_back` for a dirty victim before the victim is overwritten,
//! then `fetch_block` for the new block, which is copied into the freshly allocated line.

use std::collections::HashMap;

/// Block-granular interface to the next memory level.
pub trait BackingStore {
    /// Fills `buf` with the block starting at `block_addr`.
    ///
    /// `buf` arrives zero-filled; leaving it untouched models a memory that returns zeros.
    fn fetch_block(&mut self, block_addr: u32, buf: &mut [u8]);

    /// Accepts a modified block evicted from (or flushed by) the cache.
    fn write_back(&mut self, block_addr: u32, data: &[u8]);
}

/// Backing store that transfers nothing.
///
/// Misses leave the freshly allocated line zero-filled and dirty data is discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZeroFill;

impl BackingStore for ZeroFill {
    #[inline(always)]
    fn fetch_block(&mut self, _block_addr: u32, _buf: &mut [u8]) {}

    #[inline(always)]
    fn write_back(&mut self, _block_addr: u32, _data: &[u8]) {}
}

/// Sparse main memory holding only the blocks that have been written back.
///
/// Blocks never written read as zero. The default exchanges 64-byte blocks, matching the
/// default cache geometry.
#[derive(Clone, Debug)]
pub struct BlockMemory {
    blocks: HashMap<u32, Box<[u8]>>,
    block_bytes: usize,
    fetches: u64,
    write_backs: u64,
}

/// Block size used by [`BlockMemory::default`].
pub const DEFAULT_BLOCK_BYTES: usize = 64;

impl Default for BlockMemory {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_BYTES)
    }
}

impl BlockMemory {
    /// Creates an empty memory exchanging blocks of `block_bytes` bytes.
    ///
    /// A zero size is treated as one byte per block.
    pub fn new(block_bytes: usize) -> Self {
        Self {
            blocks: HashMap::new(),
            block_bytes: block_bytes.max(1),
            fetches: 0,
            write_backs: 0,
        }
    }

    /// Returns the stored copy of a block, if it was ever written back.
    pub fn peek_block(&self, block_addr: u32) -> Option<&[u8]> {
        self.blocks.get(&block_addr).map(AsRef::as_ref)
    }

    /// Reads one byte of memory (not of the cache).
    pub fn read_byte(&self, addr: u32) -> u8 {
        let offset = u64::from(addr) % self.block_bytes as u64;
        let base = addr - offset as u32;
        self.blocks
            .get(&base)
            .and_then(|block| block.get(offset as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Size of the blocks exchanged with the cache.
    pub const fn block_bytes(&self) -> usize {
        self.block_bytes
    }

    /// Number of block fetches served.
    pub const fn fetches(&self) -> u64 {
        self.fetches
    }

    /// Number of blocks written back.
    pub const fn write_backs(&self) -> u64 {
        self.write_backs
    }

    /// Number of distinct blocks resident in memory.
    pub fn resident_blocks(&self) -> usize {
        self.blocks.len()
    }
}

impl BackingStore for BlockMemory {
    fn fetch_block(&mut self, block_addr: u32, buf: &mut [u8]) {
        self.fetches += 1;
        if let Some(block) = self.blocks.get(&block_addr) {
            let n = block.len().min(buf.len());
            buf[..n].copy_from_slice(&block[..n]);
        }
    }

    fn write_back(&mut self, block_addr: u32, data: &[u8]) {
        self.write_backs += 1;
        let _ = self.blocks.insert(block_addr, data.into());
    }
}

impl<M: BackingStore + ?Sized> BackingStore for &mut M {
    fn fetch_block(&mut self, block_addr: u32, buf: &mut [u8]) {
        (**self).fetch_block(block_addr, buf);
    }

    fn write_back(&mut self, block_addr: u32, data: &[u8]) {
        (**self).write_back(block_addr, data);
    }
}

impl<M: BackingStore + ?Sized> BackingStore for Box<M> {
    fn fetch_block(&mut self, block_addr: u32, buf: &mut [u8]) {
        (**self).fetch_block(block_addr, buf);
    }

    fn write_back(&mut self, block_addr: u32, data: &[u8]) {
        (**self).write_back(block_addr, data);
    }
}
