use crate::error::CacheError;

/// Bit split of an address for one cache level: `tag | index | offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    offset_bits: u32,
    index_bits: u32,
}

impl Geometry {
    /// Both sizes must be powers of two; checked once here, never per access.
    pub fn new(block_bytes: u64, sets: u64) -> Result<Self, CacheError> {
        if !block_bytes.is_power_of_two() {
            return Err(CacheError::InvalidConfiguration(format!(
                "block size {block_bytes} is not a power of two"
            )));
        }
        if !sets.is_power_of_two() {
            return Err(CacheError::InvalidConfiguration(format!(
                "set count {sets} is not a power of two"
            )));
        }
        let offset_bits = block_bytes.trailing_zeros();
        let index_bits = sets.trailing_zeros();
        if offset_bits + index_bits >= u64::BITS {
            return Err(CacheError::InvalidConfiguration(format!(
                "{block_bytes}-byte blocks over {sets} sets leave no tag bits"
            )));
        }
        Ok(Self {
            offset_bits,
            index_bits,
        })
    }

    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    pub fn sets(&self) -> usize {
        1usize << self.index_bits
    }

    pub fn block_bytes(&self) -> u64 {
        1u64 << self.offset_bits
    }

    /// Returns `(tag, set_index)` for `addr`.
    pub fn decode(&self, addr: u64) -> (u64, usize) {
        let set_mask = (1u64 << self.index_bits) - 1;
        let set = (addr >> self.offset_bits) & set_mask;
        let tag = addr >> (self.offset_bits + self.index_bits);
        (tag, set as usize)
    }

    /// Inverse of [`Geometry::decode`] up to the block offset.
    pub fn block_address(&self, tag: u64, set: usize) -> u64 {
        debug_assert!(set < self.sets(), "set index out of range");
        (tag << (self.offset_bits + self.index_bits)) | ((set as u64) << self.offset_bits)
    }
}
