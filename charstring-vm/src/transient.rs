//! Scratch storage for the `put` and `get` operators.

use types::Fixed;

use super::Error;

/// Number of elements in the transient array.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const TRANSIENT_ARRAY_SIZE: usize = 32;

/// Fixed size array that lives for a single charstring evaluation.
///
/// Elements that were never written read as zero.
pub struct TransientArray([Fixed; TRANSIENT_ARRAY_SIZE]);

impl TransientArray {
    pub fn new() -> Self {
        Self([Fixed::ZERO; TRANSIENT_ARRAY_SIZE])
    }

    pub fn get(&self, index: i32) -> Result<Fixed, Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.0.get(i))
            .copied()
            .ok_or(Error::IndexOutOfRange(index))
    }

    pub fn put(&mut self, index: i32, value: Fixed) -> Result<(), Error> {
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| self.0.get_mut(i))
            .ok_or(Error::IndexOutOfRange(index))?;
        *slot = value;
        Ok(())
    }
}

impl Default for TransientArray {
    fn default() -> Self {
        Self::new()
    }
}
