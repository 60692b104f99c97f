//! Charstring evaluation errors.

use std::fmt;

/// Errors that abort the evaluation of a charstring.
///
/// Every error is fatal for the charstring being evaluated: no partial
/// outline is produced.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// A push was attempted on a full operand stack.
    StackOverflow,
    /// An operator required more operands than were on the stack.
    StackUnderflow,
    /// Subroutine calls were nested beyond the call stack capacity.
    CallStackOverflow,
    /// A `return` was executed outside of any subroutine.
    CallStackUnderflow,
    /// A transient array or stack element index was out of range.
    IndexOutOfRange(i32),
    /// The opcode is not present in the operator tables.
    UnknownOpcode {
        /// The opcode byte. For two byte operators, this is the byte
        /// following the escape.
        opcode: u8,
        /// True if the opcode was preceded by the escape byte.
        escaped: bool,
    },
    /// The token source was asked to decode an operand from a byte that
    /// does not start one.
    InvalidOperand(u8),
    /// The charstring ended in the middle of an operand, an escaped
    /// operator or a hint mask.
    UnexpectedEndOfData,
    /// A `callsubr` was executed but no local subroutines are available.
    MissingSubroutines,
    /// A subroutine index was out of range after applying the bias.
    InvalidSubroutineIndex(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackOverflow => {
                write!(f, "operand stack overflow in charstring")
            }
            Self::StackUnderflow => {
                write!(f, "operand stack underflow in charstring")
            }
            Self::CallStackOverflow => {
                write!(f, "subroutine nesting depth limit exceeded in charstring")
            }
            Self::CallStackUnderflow => {
                write!(f, "return operator executed outside of a subroutine")
            }
            Self::IndexOutOfRange(index) => {
                write!(f, "index {index} out of range in charstring")
            }
            Self::UnknownOpcode {
                opcode,
                escaped: false,
            } => write!(f, "unknown charstring operator {opcode}"),
            Self::UnknownOpcode {
                opcode,
                escaped: true,
            } => write!(f, "unknown charstring operator 12 {opcode}"),
            Self::InvalidOperand(b0) => {
                write!(f, "byte {b0} does not begin a charstring operand")
            }
            Self::UnexpectedEndOfData => {
                write!(f, "unexpected end of charstring data")
            }
            Self::MissingSubroutines => {
                write!(
                    f,
                    "encountered a callsubr operator but no subroutine index was provided"
                )
            }
            Self::InvalidSubroutineIndex(index) => {
                write!(f, "invalid subroutine index {index}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
