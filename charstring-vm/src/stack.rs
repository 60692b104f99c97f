//! Operand stack for charstring evaluation.

use core::ops::Deref;

use types::Fixed;

use super::Error;

/// Maximum size of the operand stack.
///
/// See "Appendix B Type 2 Charstring Implementation Limits" at
/// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=33>
pub const MAX_STACK: usize = 48;

/// Bounded operand stack.
///
/// Integer operands are converted to 16.16 fixed point on push so the stack
/// holds a single numeric type. Exceeding the capacity or popping an empty
/// stack is an error rather than a silent wrap.
pub struct Stack {
    values: [Fixed; MAX_STACK],
    top: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            values: [Fixed::ZERO; MAX_STACK],
            top: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn len(&self) -> usize {
        self.top
    }

    pub fn clear(&mut self) {
        self.top = 0;
    }

    pub fn push(&mut self, value: impl Into<Fixed>) -> Result<(), Error> {
        if self.top == MAX_STACK {
            return Err(Error::StackOverflow);
        }
        self.values[self.top] = value.into();
        self.top += 1;
        Ok(())
    }

    /// Pops the most recently pushed value.
    pub fn pop(&mut self) -> Result<Fixed, Error> {
        if self.top == 0 {
            return Err(Error::StackUnderflow);
        }
        self.top -= 1;
        Ok(self.values[self.top])
    }

    /// Pops the top value, rounded to an integer.
    pub fn pop_i32(&mut self) -> Result<i32, Error> {
        self.pop().map(Fixed::to_i32)
    }

    /// Returns the value `depth` elements below the top without removing it.
    ///
    /// A depth of zero is the top of the stack.
    pub fn peek(&self, depth: usize) -> Result<Fixed, Error> {
        if depth >= self.top {
            return Err(Error::StackUnderflow);
        }
        Ok(self.values[self.top - 1 - depth])
    }

    /// Returns the topmost `n` values, bottom first.
    pub fn top_mut(&mut self, n: usize) -> Result<&mut [Fixed], Error> {
        if n > self.top {
            return Err(Error::StackUnderflow);
        }
        Ok(&mut self.values[self.top - n..self.top])
    }

    /// Takes every value on the stack and clears it.
    ///
    /// The result is indexed in the order the operands appeared in the
    /// charstring.
    pub fn pop_args(&mut self) -> Args {
        let args = Args {
            values: self.values,
            start: 0,
            len: self.top,
        };
        self.clear();
        args
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

/// Operands consumed by a stack clearing operator, in declaration order.
#[derive(Clone)]
pub struct Args {
    values: [Fixed; MAX_STACK],
    start: usize,
    len: usize,
}

impl Args {
    /// Removes and returns the first operand.
    ///
    /// Used to strip the advance width that may precede the arguments of
    /// the first stack clearing operator.
    pub fn take_first(&mut self) -> Option<Fixed> {
        let first = self.first().copied()?;
        self.start += 1;
        Some(first)
    }

    /// Removes and returns the last operand.
    pub fn take_last(&mut self) -> Option<Fixed> {
        let last = self.last().copied()?;
        self.len -= 1;
        Some(last)
    }

    /// Returns the first `N` operands or `StackUnderflow` if there are
    /// fewer.
    pub fn leading<const N: usize>(&self) -> Result<[Fixed; N], Error> {
        let mut result = [Fixed::ZERO; N];
        let values = self.get(..N).ok_or(Error::StackUnderflow)?;
        result.copy_from_slice(values);
        Ok(result)
    }
}

impl Deref for Args {
    type Target = [Fixed];

    fn deref(&self) -> &Self::Target {
        &self.values[self.start..self.len]
    }
}
