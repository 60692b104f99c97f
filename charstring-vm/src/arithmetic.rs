//! Arithmetic, storage and conditional operators.
//!
//! None of these clear the operand stack; each pops a fixed number of
//! operands and pushes its result.
//!
//! See "4.4 Arithmetic Operators" through "4.6 Conditional Operators" at
//! <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=25>

use types::Fixed;

use super::{Error, Operator, Stack, TransientArray};

/// Seed used when a zero seed is requested, since xorshift never leaves
/// the zero state.
const DEFAULT_SEED: u32 = 0x2545_F491;

/// Pseudo-random number source for the `random` operator.
pub struct RandomState(u32);

impl RandomState {
    pub fn new(seed: u32) -> Self {
        Self(if seed == 0 { DEFAULT_SEED } else { seed })
    }

    /// Returns a value in the range (0, 1].
    pub fn next_value(&mut self) -> Fixed {
        // only the low 16 bits are used so the result never exceeds 1.0
        let value = Fixed::from_bits((self.0 & 0xFFFF) as i32 + 1);
        let mut r = self.0;
        r ^= r << 13;
        r ^= r >> 17;
        r ^= r << 5;
        self.0 = r;
        value
    }
}

/// Evaluates one of the arithmetic, storage or conditional operators.
///
/// Operators outside of these families are ignored.
pub fn evaluate(
    operator: Operator,
    stack: &mut Stack,
    transient: &mut TransientArray,
    random: &mut RandomState,
) -> Result<(), Error> {
    use Operator::*;
    match operator {
        Abs => {
            let a = stack.pop()?;
            stack.push(a.abs())?;
        }
        Neg => {
            let a = stack.pop()?;
            stack.push(-a)?;
        }
        Sqrt => {
            let a = stack.pop()?;
            stack.push(a.sqrt())?;
        }
        Add | Sub | Mul | Div => {
            let b = stack.pop()?;
            let a = stack.pop()?;
            stack.push(match operator {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                _ => a / b,
            })?;
        }
        Random => {
            stack.push(random.next_value())?;
        }
        Drop => {
            stack.pop()?;
        }
        Dup => {
            let a = stack.peek(0)?;
            stack.push(a)?;
        }
        Exch => {
            let b = stack.pop()?;
            let a = stack.pop()?;
            stack.push(b)?;
            stack.push(a)?;
        }
        // Negative indices copy the top element
        Index => {
            let i = stack.pop_i32()?;
            let depth = i.max(0) as usize;
            if depth >= stack.len() {
                return Err(Error::IndexOutOfRange(i));
            }
            let value = stack.peek(depth)?;
            stack.push(value)?;
        }
        // Positive shifts move elements toward the top of the stack
        Roll => {
            let j = stack.pop_i32()?;
            let n = stack.pop_i32()?;
            let count = usize::try_from(n).map_err(|_| Error::IndexOutOfRange(n))?;
            if count > stack.len() {
                return Err(Error::IndexOutOfRange(n));
            }
            if count > 0 {
                let shift = j.rem_euclid(n) as usize;
                stack.top_mut(count)?.rotate_right(shift);
            }
        }
        Put => {
            let i = stack.pop_i32()?;
            let value = stack.pop()?;
            transient.put(i, value)?;
        }
        Get => {
            let i = stack.pop_i32()?;
            stack.push(transient.get(i)?)?;
        }
        Not => {
            let a = stack.pop()?;
            stack.push(truth(a == Fixed::ZERO))?;
        }
        And | Or | Eq => {
            let b = stack.pop()?;
            let a = stack.pop()?;
            let result = match operator {
                And => a != Fixed::ZERO && b != Fixed::ZERO,
                Or => a != Fixed::ZERO || b != Fixed::ZERO,
                _ => a == b,
            };
            stack.push(truth(result))?;
        }
        IfElse => {
            let v2 = stack.pop()?;
            let v1 = stack.pop()?;
            let s2 = stack.pop()?;
            let s1 = stack.pop()?;
            stack.push(if v1 <= v2 { s1 } else { s2 })?;
        }
        _ => {}
    }
    Ok(())
}

fn truth(value: bool) -> Fixed {
    if value {
        Fixed::ONE
    } else {
        Fixed::ZERO
    }
}
