//! Return addresses for subroutine calls.

use super::Error;

/// Maximum nesting depth for subroutine calls.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const NESTING_DEPTH_LIMIT: usize = 10;

/// Bounded stack of positions to resume at when a subroutine returns.
pub struct CallStack<P> {
    addresses: [P; NESTING_DEPTH_LIMIT],
    depth: usize,
}

impl<P: Copy + Default> CallStack<P> {
    pub fn new() -> Self {
        Self {
            addresses: [P::default(); NESTING_DEPTH_LIMIT],
            depth: 0,
        }
    }

    /// Number of subroutine calls currently in progress.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn push_return(&mut self, address: P) -> Result<(), Error> {
        if self.depth == NESTING_DEPTH_LIMIT {
            return Err(Error::CallStackOverflow);
        }
        self.addresses[self.depth] = address;
        self.depth += 1;
        Ok(())
    }

    pub fn pop_return(&mut self) -> Result<P, Error> {
        if self.depth == 0 {
            return Err(Error::CallStackUnderflow);
        }
        self.depth -= 1;
        Ok(self.addresses[self.depth])
    }
}

impl<P: Copy + Default> Default for CallStack<P> {
    fn default() -> Self {
        Self::new()
    }
}
