//! Charstring operators and the opcode tables that select them.
//!
//! See "Appendix A Type 2 Charstring Command Codes" at
//! <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=32>

use super::Error;

/// Escape opcode for accessing two byte operators.
pub const ESCAPE: u8 = 12;

/// Charstring operator.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Operator {
    // Path construction
    RMoveTo,
    HMoveTo,
    VMoveTo,
    RLineTo,
    HLineTo,
    VLineTo,
    RrCurveTo,
    HhCurveTo,
    VvCurveTo,
    HvCurveTo,
    VhCurveTo,
    RCurveLine,
    RLineCurve,
    Flex,
    HFlex,
    HFlex1,
    Flex1,
    EndChar,
    // Hints
    HStem,
    VStem,
    HStemHm,
    VStemHm,
    HintMask,
    CntrMask,
    DotSection,
    // Subroutines
    CallSubr,
    CallGsubr,
    Return,
    // Arithmetic
    Abs,
    Add,
    Sub,
    Div,
    Neg,
    Random,
    Mul,
    Sqrt,
    // Stack manipulation
    Drop,
    Exch,
    Index,
    Roll,
    Dup,
    // Storage
    Put,
    Get,
    // Conditionals
    And,
    Or,
    Not,
    Eq,
    IfElse,
}

/// Operators selected by a single opcode byte.
static ONE_BYTE_OPERATORS: [Option<Operator>; 32] = {
    use Operator::*;
    [
        None,            // 0: reserved
        Some(HStem),     // 1
        None,            // 2: reserved
        Some(VStem),     // 3
        Some(VMoveTo),   // 4
        Some(RLineTo),   // 5
        Some(HLineTo),   // 6
        Some(VLineTo),   // 7
        Some(RrCurveTo), // 8
        None,            // 9: reserved
        Some(CallSubr),  // 10
        Some(Return),    // 11
        None,            // 12: escape
        None,            // 13: reserved
        Some(EndChar),   // 14
        None,            // 15: vsindex (CFF2 only)
        None,            // 16: blend (CFF2 only)
        None,            // 17: reserved
        Some(HStemHm),   // 18
        Some(HintMask),  // 19
        Some(CntrMask),  // 20
        Some(RMoveTo),   // 21
        Some(HMoveTo),   // 22
        Some(VStemHm),   // 23
        Some(RCurveLine), // 24
        Some(RLineCurve), // 25
        Some(VvCurveTo), // 26
        Some(HhCurveTo), // 27
        None,            // 28: shortint operand
        Some(CallGsubr), // 29
        Some(VhCurveTo), // 30
        Some(HvCurveTo), // 31
    ]
};

/// Operators selected by the byte following [`ESCAPE`].
static TWO_BYTE_OPERATORS: [Option<Operator>; 38] = {
    use Operator::*;
    [
        Some(DotSection), // 0
        None,             // 1: reserved
        None,             // 2: reserved
        Some(And),        // 3
        Some(Or),         // 4
        Some(Not),        // 5
        None,             // 6: reserved
        None,             // 7: reserved
        None,             // 8: reserved
        Some(Abs),        // 9
        Some(Add),        // 10
        Some(Sub),        // 11
        Some(Div),        // 12
        None,             // 13: reserved
        Some(Neg),        // 14
        Some(Eq),         // 15
        None,             // 16: reserved
        None,             // 17: reserved
        Some(Drop),       // 18
        None,             // 19: reserved
        Some(Put),        // 20
        Some(Get),        // 21
        Some(IfElse),     // 22
        Some(Random),     // 23
        Some(Mul),        // 24
        None,             // 25: reserved
        Some(Sqrt),       // 26
        Some(Dup),        // 27
        Some(Exch),       // 28
        Some(Index),      // 29
        Some(Roll),       // 30
        None,             // 31: reserved
        None,             // 32: reserved
        None,             // 33: reserved
        Some(HFlex),      // 34
        Some(Flex),       // 35
        Some(HFlex1),     // 36
        Some(Flex1),      // 37
    ]
};

impl Operator {
    /// Creates an operator from the given opcode.
    pub fn from_opcode(opcode: u8) -> Result<Self, Error> {
        ONE_BYTE_OPERATORS
            .get(opcode as usize)
            .copied()
            .flatten()
            .ok_or(Error::UnknownOpcode {
                opcode,
                escaped: false,
            })
    }

    /// Creates an operator from the given extended opcode.
    ///
    /// These are preceded by a byte containing the escape value of 12.
    pub fn from_two_byte_opcode(opcode: u8) -> Result<Self, Error> {
        TWO_BYTE_OPERATORS
            .get(opcode as usize)
            .copied()
            .flatten()
            .ok_or(Error::UnknownOpcode {
                opcode,
                escaped: true,
            })
    }

    /// Returns true if the operator consumes the entire operand stack.
    ///
    /// Only the first stack clearing operator in a charstring may be
    /// preceded by the advance width.
    pub fn clears_stack(self) -> bool {
        use Operator::*;
        matches!(
            self,
            RMoveTo
                | HMoveTo
                | VMoveTo
                | RLineTo
                | HLineTo
                | VLineTo
                | RrCurveTo
                | HhCurveTo
                | VvCurveTo
                | HvCurveTo
                | VhCurveTo
                | RCurveLine
                | RLineCurve
                | Flex
                | HFlex
                | HFlex1
                | Flex1
                | EndChar
                | HStem
                | VStem
                | HStemHm
                | VStemHm
                | HintMask
                | CntrMask
                | DotSection
        )
    }
}
