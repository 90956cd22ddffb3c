//! Set-associative set.
//!
//! A set owns one [`CacheLine`] per way. For each access it performs the tag comparison
//! across all ways, picks a victim on a miss, allocates it (write-allocate) and applies
//! the read or write. Age maintenance is left to the
//! [`ReplacementCoordinator`](super::replacement::ReplacementCoordinator), which is fed the
//! returned [`SetAccess`].

use tracing::debug;

use super::line::CacheLine;
use crate::common::addr::{AddressLayout, DecomposedAddr};
use crate::common::data::Operation;
use crate::memory::BackingStore;

/// A line displaced by an allocation.
///
/// Surfaced in the access outcome with the contents it held before it was overwritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvictedLine {
    /// Address of the first byte of the displaced block.
    pub block_addr: u32,
    /// Tag the line held.
    pub tag: u32,
    /// Whether the block had been modified (and was therefore written back).
    pub dirty: bool,
    /// The block's contents at eviction time.
    pub data: Box<[u8]>,
}

/// Result of a single access to one set, before the age update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetAccess {
    /// Whether a valid way held the tag.
    pub hit: bool,
    /// The hit way, or the victim way on a miss.
    pub way: usize,
    /// Byte read, or byte written.
    pub data: u8,
    /// The miss was served by an empty way rather than by eviction.
    pub filled_empty: bool,
    /// The valid line overwritten on a miss, if any.
    pub evicted: Option<EvictedLine>,
}

/// Observable state of one way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaySnapshot {
    /// Valid bit.
    pub valid: bool,
    /// Dirty bit.
    pub dirty: bool,
    /// Stored tag.
    pub tag: u32,
    /// Age (0 = most recently used).
    pub age: u8,
}

/// Observable state of a whole set, way by way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetSnapshot {
    /// One entry per way, in way order.
    pub ways: Vec<WaySnapshot>,
}

impl SetSnapshot {
    /// Per-way ages, in way order.
    pub fn ages(&self) -> Vec<u8> {
        self.ways.iter().map(|w| w.age).collect()
    }
}

/// One set of a set-associative cache.
#[derive(Clone, Debug)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
    /// Staging block for fetches from the next level.
    fetch_buf: Box<[u8]>,
}

impl CacheSet {
    /// Creates a set of `ways` empty lines.
    pub fn new(ways: usize, words_per_block: usize, bytes_per_word: usize) -> Self {
        Self {
            lines: (0..ways)
                .map(|_| CacheLine::new(words_per_block, bytes_per_word))
                .collect(),
            fetch_buf: vec![0; words_per_block * bytes_per_word].into_boxed_slice(),
        }
    }

    /// Associativity.
    #[inline(always)]
    pub fn ways(&self) -> usize {
        self.lines.len()
    }

    /// Read access to one way's line.
    pub fn line(&self, way: usize) -> Option<&CacheLine> {
        self.lines.get(way)
    }

    /// All lines, in way order.
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [CacheLine] {
        &mut self.lines
    }

    /// Returns the way holding `tag`, if any.
    ///
    /// A set never holds the same live tag twice, so at most one way matches.
    pub fn lookup(&self, tag: u32) -> Option<usize> {
        let mut hits = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.probe(tag))
            .map(|(way, _)| way);
        let way = hits.next();
        debug_assert!(hits.next().is_none(), "duplicate live tag {tag:#x} in set");
        way
    }

    /// Chooses the way to allocate on a miss.
    ///
    /// The lowest-indexed empty way wins; otherwise the way with the greatest age,
    /// ties going to the lowest index.
    pub fn select_victim(&self) -> usize {
        if let Some(way) = self.lines.iter().position(|line| !line.is_valid()) {
            return way;
        }

        let mut victim = 0;
        for (way, line) in self.lines.iter().enumerate().skip(1) {
            if line.age() > self.lines[victim].age() {
                victim = way;
            }
        }
        victim
    }

    /// Performs one access against this set.
    ///
    /// On a hit the way is read or written in place. On a miss the victim is chosen, a dirty
    /// victim is handed to `memory` before being overwritten, the new block is fetched and
    /// installed in the allocated line, and a write is then applied to the fresh line (write-allocate).
    ///
    /// Ages are not touched here.
    pub fn access<M>(&mut self, addr: &DecomposedAddr, op: Operation, memory: &mut M) -> SetAccess
    where
        M: BackingStore + ?Sized,
    {
        if let Some(way) = self.lookup(addr.tag) {
            let data = apply(&mut self.lines[way], addr, op);
            return SetAccess {
                hit: true,
                way,
                data,
                filled_empty: false,
                evicted: None,
            };
        }

        let way = self.select_victim();
        let line = &mut self.lines[way];
        let filled_empty = !line.is_valid();

        let evicted = if filled_empty {
            None
        } else {
            let victim = EvictedLine {
                block_addr: addr.sibling_block(line.tag()),
                tag: line.tag(),
                dirty: line.is_dirty(),
                data: line.data().into(),
            };
            if victim.dirty {
                debug!(block_addr = victim.block_addr, way, "writing back dirty victim");
                memory.write_back(victim.block_addr, &victim.data);
            } else {
                debug!(block_addr = victim.block_addr, way, "evicting clean victim");
            }
            Some(victim)
        };

        self.fetch_buf.fill(0);
        memory.fetch_block(addr.block_address(), &mut self.fetch_buf);
        line.allocate(addr.tag);
        line.fill(&self.fetch_buf);
        let data = apply(line, addr, op);

        SetAccess {
            hit: false,
            way,
            data,
            filled_empty,
            evicted,
        }
    }

    /// Writes every dirty line back through `memory` and marks it clean.
    ///
    /// Lines stay valid. Returns the number of blocks written back.
    pub fn flush<M>(&mut self, set_index: usize, layout: &AddressLayout, memory: &mut M) -> usize
    where
        M: BackingStore + ?Sized,
    {
        let mut written = 0;
        for line in self.lines.iter_mut().filter(|line| line.is_dirty()) {
            let block_addr = layout.block_address(line.tag(), set_index);
            memory.write_back(block_addr, line.data());
            line.mark_clean();
            written += 1;
        }
        written
    }

    /// Returns every line to the empty state.
    pub fn reset(&mut self) {
        self.lines.iter_mut().for_each(CacheLine::full_reset);
    }

    /// Captures the valid/dirty/tag/age state of every way.
    pub fn snapshot(&self) -> SetSnapshot {
        SetSnapshot {
            ways: self
                .lines
                .iter()
                .map(|line| WaySnapshot {
                    valid: line.is_valid(),
                    dirty: line.is_dirty(),
                    tag: line.tag(),
                    age: line.age(),
                })
                .collect(),
        }
    }
}

/// Applies a read or write to a line that already holds the addressed block.
#[inline]
fn apply(line: &mut CacheLine, addr: &DecomposedAddr, op: Operation) -> u8 {
    match op {
        Operation::Read => line.read_byte(addr.block_offset, addr.byte_offset),
        Operation::Write(value) => {
            line.write_byte(addr.block_offset, addr.byte_offset, value);
            value
        }
    }
}
