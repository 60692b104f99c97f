//! test data shared between the charstring crates.

use charstring_types::Fixed;

/// Opcodes for building charstrings in tests.
///
/// Values in the second group follow the escape byte.
pub mod op {
    pub const HSTEM: u8 = 1;
    pub const VSTEM: u8 = 3;
    pub const VMOVETO: u8 = 4;
    pub const RLINETO: u8 = 5;
    pub const HLINETO: u8 = 6;
    pub const VLINETO: u8 = 7;
    pub const RRCURVETO: u8 = 8;
    pub const CALLSUBR: u8 = 10;
    pub const RETURN: u8 = 11;
    pub const ESCAPE: u8 = 12;
    pub const ENDCHAR: u8 = 14;
    pub const HSTEMHM: u8 = 18;
    pub const HINTMASK: u8 = 19;
    pub const CNTRMASK: u8 = 20;
    pub const RMOVETO: u8 = 21;
    pub const HMOVETO: u8 = 22;
    pub const VSTEMHM: u8 = 23;
    pub const RCURVELINE: u8 = 24;
    pub const RLINECURVE: u8 = 25;
    pub const VVCURVETO: u8 = 26;
    pub const HHCURVETO: u8 = 27;
    pub const CALLGSUBR: u8 = 29;
    pub const VHCURVETO: u8 = 30;
    pub const HVCURVETO: u8 = 31;

    pub const DOTSECTION: u8 = 0;
    pub const AND: u8 = 3;
    pub const OR: u8 = 4;
    pub const NOT: u8 = 5;
    pub const ABS: u8 = 9;
    pub const ADD: u8 = 10;
    pub const SUB: u8 = 11;
    pub const DIV: u8 = 12;
    pub const NEG: u8 = 14;
    pub const EQ: u8 = 15;
    pub const DROP: u8 = 18;
    pub const PUT: u8 = 20;
    pub const GET: u8 = 21;
    pub const IFELSE: u8 = 22;
    pub const RANDOM: u8 = 23;
    pub const MUL: u8 = 24;
    pub const SQRT: u8 = 26;
    pub const DUP: u8 = 27;
    pub const EXCH: u8 = 28;
    pub const INDEX: u8 = 29;
    pub const ROLL: u8 = 30;
    pub const HFLEX: u8 = 34;
    pub const FLEX: u8 = 35;
    pub const HFLEX1: u8 = 36;
    pub const FLEX1: u8 = 37;
}

/// A convenience type for encoding Type 2 charstrings.
///
/// Integers are written with the shortest encoding that holds them.
#[derive(Debug, Clone, Default)]
pub struct CharstringBuilder(Vec<u8>);

impl CharstringBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Write an integer operand.
    ///
    /// Panics if the value is outside the range of a 16 bit integer.
    pub fn push(mut self, value: i32) -> Self {
        match value {
            -107..=107 => self.0.push((value + 139) as u8),
            108..=1131 => {
                let v = value - 108;
                self.0.extend([(v >> 8) as u8 + 247, v as u8]);
            }
            -1131..=-108 => {
                let v = -value - 108;
                self.0.extend([(v >> 8) as u8 + 251, v as u8]);
            }
            -32768..=32767 => {
                self.0.push(28);
                self.0.extend((value as i16).to_be_bytes());
            }
            _ => panic!("{value} does not fit in a charstring integer operand"),
        }
        self
    }

    /// Write multiple integer operands.
    pub fn push_all(self, values: &[i32]) -> Self {
        values.iter().fold(self, |builder, value| builder.push(*value))
    }

    /// Write a 16.16 fixed point operand.
    pub fn push_fixed(mut self, value: Fixed) -> Self {
        self.0.push(255);
        self.0.extend(value.to_bits().to_be_bytes());
        self
    }

    /// Write a one byte operator.
    pub fn op(mut self, opcode: u8) -> Self {
        self.0.push(opcode);
        self
    }

    /// Write a two byte operator.
    pub fn escaped(mut self, opcode: u8) -> Self {
        self.0.extend([op::ESCAPE, opcode]);
        self
    }

    /// Write raw bytes, such as a hint mask.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

impl std::ops::Deref for CharstringBuilder {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub mod charstrings {

    /// A 300 unit square with an advance width of 500.
    #[rustfmt::skip]
    pub static SQUARE: &[u8] = &[
        248, 136,           // width 500
        239, 239, 21,       // 100 100 rmoveto
        247, 192,           // 300
        247, 192,           // 300
        251, 192, 6,        // -300 hlineto
        14,                 // endchar
    ];

    /// A square with stem hints and a hint mask.
    #[rustfmt::skip]
    pub static HINTED: &[u8] = &[
        248, 136,           // width 500
        139, 189,           // 0 50
        248, 36, 189, 18,   // 400 50 hstemhm
        239, 189, 19,       // 100 50 hintmask (implied vstemhm)
        0b1110_0000,        // mask for three stems
        239, 139, 21,       // 100 0 rmoveto
        189, 248, 136,      // 50 500
        89, 6,              // -50 hlineto
        14,                 // endchar
    ];

    /// A rounded rectangle drawn partly by subroutines.
    #[rustfmt::skip]
    pub static ROUNDED: &[u8] = &[
        239, 139, 21,                   // 100 0 rmoveto
        247, 92, 32, 10,                // 200 -107 callsubr
        247, 92, 32, 29,                // 200 -107 callgsubr
        251, 92, 6,                     // -200 hlineto
        89, 139, 89, 89, 139, 89, 8,    // -50 0 -50 -50 0 -50 rrcurveto
        251, 92, 7,                     // -200 vlineto
        139, 89, 189, 89, 189, 139, 8,  // 0 -50 50 -50 50 0 rrcurveto
        14,                             // endchar
    ];

    #[rustfmt::skip]
    pub static ROUNDED_LOCAL_SUBRS: &[&[u8]] = &[
        &[
            6,                                  // hlineto
            189, 139, 189, 189, 139, 189, 8,    // 50 0 50 50 0 50 rrcurveto
            11,                                 // return
        ],
    ];

    #[rustfmt::skip]
    pub static ROUNDED_GLOBAL_SUBRS: &[&[u8]] = &[
        &[
            7,                                  // vlineto
            139, 189, 89, 189, 89, 139, 8,      // 0 50 -50 50 -50 0 rrcurveto
            11,                                 // return
        ],
    ];
}
