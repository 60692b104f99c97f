//! Sources of charstring tokens.
//!
//! The interpreter pulls operands and opcodes from a [`TokenSource`]. The
//! source also owns the mapping from subroutine numbers to subroutine
//! charstrings, so the interpreter only has to remember where to resume
//! when a subroutine returns.

use types::Fixed;

use super::Error;

/// Selects the subroutine table for a call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SubroutineKind {
    /// Subroutines from the Private DICT, called with `callsubr`.
    Local,
    /// Subroutines shared by the whole font, called with `callgsubr`.
    Global,
}

/// Pull-based stream of charstring tokens.
///
/// A token is either a numeric operand or an opcode byte. Implementations
/// must be exclusively owned by one evaluation while it runs.
pub trait TokenSource {
    /// Opaque location in the instruction stream, used as a subroutine
    /// return address.
    type Position: Copy + Default;

    /// Returns true if the current program has bytes remaining.
    fn has_more_tokens(&self) -> bool;

    /// Returns true if the next byte begins an operand.
    fn peek_is_operand(&self) -> bool;

    /// Decodes the next operand.
    fn read_operand(&mut self) -> Result<Fixed, Error>;

    /// Reads the next byte as an opcode.
    fn read_opcode_byte(&mut self) -> Result<u8, Error>;

    /// Moves back to the start of the top level charstring.
    fn reset_position(&mut self);

    /// Returns the current location.
    fn position(&self) -> Self::Position;

    /// Resumes reading at a location previously returned by
    /// [`position`](Self::position).
    fn jump_to(&mut self, position: Self::Position);

    /// Applies the subroutine bias to `index` and continues reading at the
    /// start of the selected subroutine.
    fn call_subroutine(&mut self, kind: SubroutineKind, index: i32) -> Result<(), Error>;

    /// Reads `len` raw bytes, such as the mask following a `hintmask`
    /// operator.
    fn read_bytes(&mut self, len: usize) -> Result<&[u8], Error>;
}

/// A table of subroutine charstrings.
#[derive(Copy, Clone, Default, Debug)]
pub struct Subroutines<'a> {
    charstrings: &'a [&'a [u8]],
}

impl<'a> Subroutines<'a> {
    pub fn new(charstrings: &'a [&'a [u8]]) -> Self {
        Self { charstrings }
    }

    pub fn len(&self) -> usize {
        self.charstrings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charstrings.is_empty()
    }

    /// Returns the bias that is added to subroutine call operands.
    ///
    /// See "Section 4.7 Subroutine Operators" at
    /// <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=29>
    pub fn bias(&self) -> i32 {
        let count = self.len();
        if count < 1240 {
            107
        } else if count < 33900 {
            1131
        } else {
            32768
        }
    }

    /// Returns the biased subroutine number and its charstring.
    fn resolve(&self, index: i32) -> Result<(usize, &'a [u8]), Error> {
        let biased = index.wrapping_add(self.bias());
        usize::try_from(biased)
            .ok()
            .and_then(|i| Some((i, *self.charstrings.get(i)?)))
            .ok_or(Error::InvalidSubroutineIndex(index))
    }
}

/// Which program a [`CharstringTokens`] is reading.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum Program {
    #[default]
    Charstring,
    Local(usize),
    Global(usize),
}

/// Location in a [`CharstringTokens`] stream.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Position {
    pub program: Program,
    pub offset: usize,
}

/// Token source reading Type 2 encoded charstrings from byte slices.
#[derive(Clone)]
pub struct CharstringTokens<'a> {
    charstring: &'a [u8],
    global_subrs: Subroutines<'a>,
    subrs: Option<Subroutines<'a>>,
    program: Program,
    data: &'a [u8],
    offset: usize,
}

impl<'a> CharstringTokens<'a> {
    /// Creates a token source for a charstring that makes no subroutine
    /// calls.
    pub fn new(charstring: &'a [u8]) -> Self {
        Self::with_subroutines(charstring, Subroutines::default(), None)
    }

    /// Creates a token source with global and, if the Private DICT has
    /// them, local subroutines.
    pub fn with_subroutines(
        charstring: &'a [u8],
        global_subrs: Subroutines<'a>,
        subrs: Option<Subroutines<'a>>,
    ) -> Self {
        Self {
            charstring,
            global_subrs,
            subrs,
            program: Program::Charstring,
            data: charstring,
            offset: 0,
        }
    }

    fn program_data(&self, program: Program) -> &'a [u8] {
        let subr = |subrs: Option<Subroutines<'a>>, i: usize| {
            subrs
                .and_then(|subrs| subrs.charstrings.get(i).copied())
                .unwrap_or_default()
        };
        match program {
            Program::Charstring => self.charstring,
            Program::Local(i) => subr(self.subrs, i),
            Program::Global(i) => subr(Some(self.global_subrs), i),
        }
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(Error::UnexpectedEndOfData)?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_be_bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(self.read_bytes(N)?);
        Ok(bytes)
    }
}

impl TokenSource for CharstringTokens<'_> {
    type Position = Position;

    fn has_more_tokens(&self) -> bool {
        self.offset < self.data.len()
    }

    fn peek_is_operand(&self) -> bool {
        matches!(self.data.get(self.offset), Some(28 | 32..=255))
    }

    fn read_operand(&mut self) -> Result<Fixed, Error> {
        // Size   b0 range     Value range              Value calculation
        //--------------------------------------------------------------------------------
        // 1      32 to 246    -107 to +107             b0 - 139
        // 2      247 to 250   +108 to +1131            (b0 - 247) * 256 + b1 + 108
        // 2      251 to 254   -1131 to -108            -(b0 - 251) * 256 - b1 - 108
        // 3      28           -32768 to +32767         b1 << 8 | b2
        // 5      255          16.16 fixed              b1 << 24 | b2 << 16 | b3 << 8 | b4
        // See "3.2 Charstring Number Encoding" <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=12>
        let b0 = self.read_u8()?;
        Ok(match b0 {
            32..=246 => Fixed::from_i32(b0 as i32 - 139),
            247..=250 => Fixed::from_i32((b0 as i32 - 247) * 256 + self.read_u8()? as i32 + 108),
            251..=254 => Fixed::from_i32(-(b0 as i32 - 251) * 256 - self.read_u8()? as i32 - 108),
            28 => Fixed::from_i32(i16::from_be_bytes(self.read_be_bytes()?) as i32),
            255 => Fixed::from_bits(i32::from_be_bytes(self.read_be_bytes()?)),
            _ => return Err(Error::InvalidOperand(b0)),
        })
    }

    fn read_opcode_byte(&mut self) -> Result<u8, Error> {
        self.read_u8()
    }

    fn reset_position(&mut self) {
        self.jump_to(Position::default());
    }

    fn position(&self) -> Position {
        Position {
            program: self.program,
            offset: self.offset,
        }
    }

    fn jump_to(&mut self, position: Position) {
        self.program = position.program;
        self.data = self.program_data(position.program);
        self.offset = position.offset;
    }

    fn call_subroutine(&mut self, kind: SubroutineKind, index: i32) -> Result<(), Error> {
        let (program, data) = match kind {
            SubroutineKind::Local => {
                let subrs = self.subrs.ok_or(Error::MissingSubroutines)?;
                let (biased, data) = subrs.resolve(index)?;
                (Program::Local(biased), data)
            }
            SubroutineKind::Global => {
                let (biased, data) = self.global_subrs.resolve(index)?;
                (Program::Global(biased), data)
            }
        };
        self.program = program;
        self.data = data;
        self.offset = 0;
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<&[u8], Error> {
        let end = self
            .offset
            .checked_add(len)
            .ok_or(Error::UnexpectedEndOfData)?;
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(Error::UnexpectedEndOfData)?;
        self.offset = end;
        Ok(bytes)
    }
}
