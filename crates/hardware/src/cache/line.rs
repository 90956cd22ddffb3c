//! Cache line state.
//!
//! One line of one way: validity, dirty flag, tag, a data block and an age counter.
//! The owning set decides when a line is allocated and how its age moves; the line
//! only stores the state and performs byte-level reads and writes.

/// A single cache line.
///
/// A line with `valid == false` is empty: its tag, data and dirty flag carry no meaning,
/// and `dirty` is never set on an empty line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    valid: bool,
    dirty: bool,
    tag: u32,
    age: u8,
    bytes_per_word: usize,
    data: Box<[u8]>,
}

impl CacheLine {
    /// Creates an empty line holding `words_per_block` words of `bytes_per_word` bytes.
    pub fn new(words_per_block: usize, bytes_per_word: usize) -> Self {
        Self {
            valid: false,
            dirty: false,
            tag: 0,
            age: 0,
            bytes_per_word,
            data: vec![0; words_per_block * bytes_per_word].into_boxed_slice(),
        }
    }

    /// Returns `true` iff the line is valid and holds `tag`.
    #[inline(always)]
    pub fn probe(&self, tag: u32) -> bool {
        self.valid && self.tag == tag
    }

    /// Reads the byte at `byte_offset` within word `block_offset`.
    ///
    /// Bytes never written since allocation read as zero.
    #[inline]
    pub fn read_byte(&self, block_offset: usize, byte_offset: usize) -> u8 {
        self.data[self.index(block_offset, byte_offset)]
    }

    /// Overwrites one byte and marks the line dirty.
    #[inline]
    pub fn write_byte(&mut self, block_offset: usize, byte_offset: usize, value: u8) {
        let idx = self.index(block_offset, byte_offset);
        self.data[idx] = value;
        // Empty lines never become dirty.
        self.dirty = self.valid;
    }

    /// Takes ownership of the line for `tag`: valid, clean, zero-filled. Age is left alone.
    pub fn allocate(&mut self, tag: u32) {
        self.valid = true;
        self.dirty = false;
        self.tag = tag;
        self.data.fill(0);
    }

    /// Copies a full block fetched from the next level into the line without dirtying it.
    ///
    /// Only the overlapping prefix is copied if `block` is shorter or longer than the line.
    pub fn fill(&mut self, block: &[u8]) {
        let n = block.len().min(self.data.len());
        self.data[..n].copy_from_slice(&block[..n]);
    }

    /// Makes this line the most recently used one.
    #[inline(always)]
    pub fn reset_age(&mut self) {
        self.age = 0;
    }

    /// Ages the line by one step, saturating at `max_age`.
    #[inline(always)]
    pub fn increment_age(&mut self, max_age: u8) {
        if self.age < max_age {
            self.age += 1;
        }
    }

    /// Returns the line to its power-on state: empty, clean, zeroed, age 0.
    pub fn full_reset(&mut self) {
        self.valid = false;
        self.dirty = false;
        self.tag = 0;
        self.age = 0;
        self.data.fill(0);
    }

    /// Clears the dirty flag after the contents have been written back.
    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Whether the line holds a block.
    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the block was modified since it was allocated.
    #[inline(always)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stored tag (meaningless for an empty line).
    #[inline(always)]
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Current age; 0 is most recently used.
    #[inline(always)]
    pub fn age(&self) -> u8 {
        self.age
    }

    /// The whole data block.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    fn index(&self, block_offset: usize, byte_offset: usize) -> usize {
        block_offset * self.bytes_per_word + byte_offset
    }
}
