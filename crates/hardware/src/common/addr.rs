//! Address decomposition.
//!
//! This module splits a 32-bit byte address into the fields used to index the cache. It provides:
//! 1. **Layout:** The bit widths of the tag, set-index, block-offset and byte-offset fields.
//! 2. **Decomposition:** A pure, total mapping from an address to its fields.
//! 3. **Composition:** The inverse mapping used to name whole blocks (e.g. for write-back).
//!
//! The fields are laid out high to low as `tag | set_index | block_offset | byte_offset`.

/// Width of every address handled by the cache, in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Returns a mask with the low `bits` bits set.
#[inline(always)]
const fn low_mask(bits: u32) -> u32 {
    if bits >= ADDRESS_BITS {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Bit widths of the four address fields.
///
/// A layout is only constructed from a validated [`CacheConfig`](crate::config::CacheConfig),
/// so the widths always sum to [`ADDRESS_BITS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    /// Width of the tag field (high-order bits).
    pub tag_bits: u32,
    /// Width of the set-index field.
    pub index_bits: u32,
    /// Width of the word-within-block field.
    pub block_bits: u32,
    /// Width of the byte-within-word field.
    pub byte_bits: u32,
}

impl AddressLayout {
    /// Number of low-order bits addressing a byte inside a line.
    #[inline(always)]
    pub const fn offset_bits(&self) -> u32 {
        self.block_bits + self.byte_bits
    }

    /// Splits `addr` into its tag, set index and line-relative offsets.
    ///
    /// Total over all 32-bit inputs; there are no error conditions.
    #[inline]
    pub fn decompose(&self, addr: u32) -> DecomposedAddr {
        let offset_bits = self.offset_bits();
        let index_shift = offset_bits;
        let tag_shift = offset_bits + self.index_bits;

        DecomposedAddr {
            tag: addr.checked_shr(tag_shift).unwrap_or(0) & low_mask(self.tag_bits),
            set_index: (addr.checked_shr(index_shift).unwrap_or(0) & low_mask(self.index_bits))
                as usize,
            block_offset: (addr.checked_shr(self.byte_bits).unwrap_or(0)
                & low_mask(self.block_bits)) as usize,
            byte_offset: (addr & low_mask(self.byte_bits)) as usize,
            layout: *self,
        }
    }

    /// Builds the address of the first byte of the block identified by `tag` and `set_index`.
    #[inline]
    pub fn block_address(&self, tag: u32, set_index: usize) -> u32 {
        let offset_bits = self.offset_bits();
        let tag_part = (tag & low_mask(self.tag_bits))
            .checked_shl(offset_bits + self.index_bits)
            .unwrap_or(0);
        let index_part = ((set_index as u32) & low_mask(self.index_bits))
            .checked_shl(offset_bits)
            .unwrap_or(0);
        tag_part | index_part
    }
}

/// An address split into its cache fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecomposedAddr {
    /// High-order tag bits stored alongside a line.
    pub tag: u32,
    /// Index of the set consulted for this address.
    pub set_index: usize,
    /// Word within the block.
    pub block_offset: usize,
    /// Byte within the word.
    pub byte_offset: usize,
    layout: AddressLayout,
}

impl DecomposedAddr {
    /// Byte position inside the line (`block_offset * bytes_per_word + byte_offset`).
    #[inline(always)]
    pub const fn line_offset(&self) -> usize {
        (self.block_offset << self.layout.byte_bits) | self.byte_offset
    }

    /// Address of the first byte of the block holding this address.
    #[inline]
    pub fn block_address(&self) -> u32 {
        self.layout.block_address(self.tag, self.set_index)
    }

    /// Address of the block with tag `tag` that shares this address's set.
    #[inline]
    pub fn sibling_block(&self, tag: u32) -> u32 {
        self.layout.block_address(tag, self.set_index)
    }

    /// The layout this address was decomposed with.
    pub const fn layout(&self) -> AddressLayout {
        self.layout
    }
}
