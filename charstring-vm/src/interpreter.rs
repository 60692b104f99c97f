//! Evaluation of Type 2 charstrings.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf>

use types::{Fixed, Pen};

use super::{
    arithmetic::{self, RandomState},
    call_stack::CallStack,
    operator::ESCAPE,
    stack::Args,
    Error, Operator, Options, Stack, SubroutineKind, TokenSource, TransientArray,
};

#[cfg(feature = "std")]
use super::{Outline, PathBuilder};

/// Trait for processing commands resulting from charstring evaluation.
///
/// Coordinates are absolute. Hint commands are optional and ignored by
/// default.
#[allow(unused_variables)]
pub trait CommandSink {
    // Path construction operators.
    fn move_to(&mut self, x: Fixed, y: Fixed);
    fn line_to(&mut self, x: Fixed, y: Fixed);
    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed);
    fn close(&mut self);
    // Hint operators.
    /// Horizontal stem hint from `y0` to `y1`.
    fn hstem(&mut self, y0: Fixed, y1: Fixed) {}
    /// Vertical stem hint from `x0` to `x1`.
    fn vstem(&mut self, x0: Fixed, x1: Fixed) {}
    /// Bitmask defining the hints that should be made active for the
    /// commands that follow.
    fn hint_mask(&mut self, mask: &[u8]) {}
    /// Bitmask defining the counter hints that should be made active for the
    /// commands that follow.
    fn counter_mask(&mut self, mask: &[u8]) {}
}

/// Command sink that sends the results of charstring evaluation to a [Pen].
pub struct PenSink<'a, P>(&'a mut P);

impl<'a, P> PenSink<'a, P> {
    pub fn new(pen: &'a mut P) -> Self {
        Self(pen)
    }
}

impl<P> CommandSink for PenSink<'_, P>
where
    P: Pen,
{
    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.0.move_to(x.to_f64() as f32, y.to_f64() as f32);
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.0.line_to(x.to_f64() as f32, y.to_f64() as f32);
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.0.curve_to(
            cx0.to_f64() as f32,
            cy0.to_f64() as f32,
            cx1.to_f64() as f32,
            cy1.to_f64() as f32,
            x.to_f64() as f32,
            y.to_f64() as f32,
        );
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Evaluates the charstring read from `tokens` and sends the resulting
/// commands to `sink`.
///
/// Returns the advance width if the charstring encoded one. On error, the
/// commands already sent to the sink do not describe a usable outline and
/// should be discarded.
pub fn evaluate(
    tokens: &mut impl TokenSource,
    options: &Options,
    sink: &mut impl CommandSink,
) -> Result<Option<Fixed>, Error> {
    let mut interpreter = Interpreter::new(tokens, options, sink);
    interpreter.run()?;
    Ok(interpreter.width)
}

/// Evaluates the charstring read from `tokens` and collects the outline.
#[cfg(feature = "std")]
pub fn execute(tokens: &mut impl TokenSource, options: &Options) -> Result<Outline, Error> {
    let mut builder = PathBuilder::new();
    let width = evaluate(tokens, options, &mut builder)?;
    Ok(Outline {
        points: builder.finish(),
        width,
    })
}

/// State for a single charstring evaluation.
struct Interpreter<'a, T: TokenSource, S> {
    tokens: &'a mut T,
    sink: &'a mut S,
    stack: Stack,
    calls: CallStack<T::Position>,
    transient: TransientArray,
    random: RandomState,
    nominal_width: Fixed,
    width: Option<Fixed>,
    have_read_width: bool,
    is_open: bool,
    stem_count: usize,
    x: Fixed,
    y: Fixed,
}

impl<'a, T, S> Interpreter<'a, T, S>
where
    T: TokenSource,
    S: CommandSink,
{
    fn new(tokens: &'a mut T, options: &Options, sink: &'a mut S) -> Self {
        Self {
            tokens,
            sink,
            stack: Stack::new(),
            calls: CallStack::new(),
            transient: TransientArray::new(),
            random: RandomState::new(options.random_seed),
            nominal_width: options.nominal_width,
            width: None,
            have_read_width: false,
            is_open: false,
            stem_count: 0,
            x: Fixed::ZERO,
            y: Fixed::ZERO,
        }
    }

    fn run(&mut self) -> Result<(), Error> {
        self.tokens.reset_position();
        loop {
            if !self.tokens.has_more_tokens() {
                if self.calls.is_empty() {
                    break;
                }
                // falling off the end of a subroutine returns to the caller
                let position = self.calls.pop_return()?;
                log::debug!("implicit return to depth {}", self.calls.depth());
                self.tokens.jump_to(position);
                continue;
            }
            if self.tokens.peek_is_operand() {
                let value = self.tokens.read_operand()?;
                self.stack.push(value)?;
                continue;
            }
            let operator = self
                .read_operator()
                .inspect_err(|e| log::warn!("aborting charstring: {e}"))?;
            log::trace!("{operator:?} with {} operands", self.stack.len());
            if !self.evaluate_operator(operator)? {
                break;
            }
        }
        self.close_contour();
        Ok(())
    }

    fn read_operator(&mut self) -> Result<Operator, Error> {
        let opcode = self.tokens.read_opcode_byte()?;
        if opcode == ESCAPE {
            Operator::from_two_byte_opcode(self.tokens.read_opcode_byte()?)
        } else {
            Operator::from_opcode(opcode)
        }
    }

    /// Evaluates a single operator.
    ///
    /// Returns `Ok(false)` when evaluation should stop.
    fn evaluate_operator(&mut self, operator: Operator) -> Result<bool, Error> {
        use Operator::*;
        match operator {
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=29>
            CallSubr | CallGsubr => {
                let index = self.stack.pop_i32()?;
                self.calls.push_return(self.tokens.position())?;
                let kind = if operator == CallSubr {
                    SubroutineKind::Local
                } else {
                    SubroutineKind::Global
                };
                log::debug!(
                    "calling {kind:?} subroutine {index} at depth {}",
                    self.calls.depth()
                );
                self.tokens.call_subroutine(kind, index)?;
            }
            Return => {
                let position = self.calls.pop_return()?;
                log::debug!("return to depth {}", self.calls.depth());
                self.tokens.jump_to(position);
            }
            _ if !operator.clears_stack() => {
                arithmetic::evaluate(
                    operator,
                    &mut self.stack,
                    &mut self.transient,
                    &mut self.random,
                )?;
            }
            _ => return self.evaluate_clearing_operator(operator),
        }
        Ok(true)
    }

    fn evaluate_clearing_operator(&mut self, operator: Operator) -> Result<bool, Error> {
        use Operator::*;
        let mut args = self.stack.pop_args();
        if !self.have_read_width {
            self.have_read_width = true;
            if has_width_operand(operator, args.len()) {
                if let Some(delta) = args.take_first() {
                    let width = self.nominal_width + delta;
                    log::debug!("advance width {width}");
                    self.width = Some(width);
                }
            }
        }
        match operator {
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
            HStem | VStem | HStemHm | VStemHm => {
                self.stems(&args, matches!(operator, HStem | HStemHm));
            }
            // Leftover operands are an implied vstemhm.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=24>
            HintMask | CntrMask => {
                self.stems(&args, false);
                let mask = self.tokens.read_bytes(self.stem_count.div_ceil(8))?;
                if operator == HintMask {
                    self.sink.hint_mask(mask);
                } else {
                    self.sink.counter_mask(mask);
                }
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=16>
            RMoveTo => {
                let [dx, dy] = args.leading::<2>()?;
                self.move_to(self.x + dx, self.y + dy);
            }
            HMoveTo => {
                let [dx] = args.leading::<1>()?;
                self.move_to(self.x + dx, self.y);
            }
            VMoveTo => {
                let [dy] = args.leading::<1>()?;
                self.move_to(self.x, self.y + dy);
            }
            RLineTo => {
                require(&args, 2)?;
                for d in args.chunks_exact(2) {
                    self.line_to(self.x + d[0], self.y + d[1]);
                }
            }
            // Each operand switches the direction of the line
            HLineTo | VLineTo => {
                require(&args, 1)?;
                let mut horizontal = operator == HLineTo;
                for &delta in args.iter() {
                    if horizontal {
                        self.line_to(self.x + delta, self.y);
                    } else {
                        self.line_to(self.x, self.y + delta);
                    }
                    horizontal = !horizontal;
                }
            }
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=17>
            RrCurveTo => {
                require(&args, 6)?;
                for d in args.chunks_exact(6) {
                    self.rcurve(d);
                }
            }
            // An odd leading operand is the first dy
            HhCurveTo => {
                let mut dy1 = leading_odd_operand(&mut args);
                require(&args, 4)?;
                for d in args.chunks_exact(4) {
                    let x1 = self.x + d[0];
                    let y1 = self.y + dy1;
                    let x2 = x1 + d[1];
                    let y2 = y1 + d[2];
                    self.curve_to(x1, y1, x2, y2, x2 + d[3], y2);
                    dy1 = Fixed::ZERO;
                }
            }
            // An odd leading operand is the first dx
            VvCurveTo => {
                let mut dx1 = leading_odd_operand(&mut args);
                require(&args, 4)?;
                for d in args.chunks_exact(4) {
                    let x1 = self.x + dx1;
                    let y1 = self.y + d[0];
                    let x2 = x1 + d[1];
                    let y2 = y1 + d[2];
                    self.curve_to(x1, y1, x2, y2, x2, y2 + d[3]);
                    dx1 = Fixed::ZERO;
                }
            }
            // Tangents alternate between horizontal and vertical. An odd
            // trailing operand moves the end point of the final curve off
            // its axis.
            HvCurveTo | VhCurveTo => {
                require(&args, 4)?;
                let last = if args.len() % 4 == 1 {
                    args.take_last()
                } else {
                    None
                };
                let count = args.len() / 4;
                let mut horizontal = operator == HvCurveTo;
                for (i, d) in args.chunks_exact(4).enumerate() {
                    let extra = match last {
                        Some(extra) if i + 1 == count => extra,
                        _ => Fixed::ZERO,
                    };
                    if horizontal {
                        let x1 = self.x + d[0];
                        let y1 = self.y;
                        let x2 = x1 + d[1];
                        let y2 = y1 + d[2];
                        self.curve_to(x1, y1, x2, y2, x2 + extra, y2 + d[3]);
                    } else {
                        let x1 = self.x;
                        let y1 = self.y + d[0];
                        let x2 = x1 + d[1];
                        let y2 = y1 + d[2];
                        self.curve_to(x1, y1, x2, y2, x2 + d[3], y2 + extra);
                    }
                    horizontal = !horizontal;
                }
            }
            // Curves followed by a single line
            RCurveLine => {
                let dy = args.take_last().ok_or(Error::StackUnderflow)?;
                let dx = args.take_last().ok_or(Error::StackUnderflow)?;
                for d in args.chunks_exact(6) {
                    self.rcurve(d);
                }
                self.line_to(self.x + dx, self.y + dy);
            }
            // Lines followed by a single curve
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            RLineCurve => {
                let split = args.len().checked_sub(6).ok_or(Error::StackUnderflow)?;
                let (lines, curve) = args.split_at(split);
                for d in lines.chunks_exact(2) {
                    self.line_to(self.x + d[0], self.y + d[1]);
                }
                self.rcurve(curve);
            }
            // The flex depth operand is ignored and the curves are always
            // emitted.
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=18>
            Flex => {
                let d = args.leading::<12>()?;
                self.rcurve(&d[..6]);
                self.rcurve(&d[6..]);
            }
            HFlex => {
                let [dx1, dx2, dy2, dx3, dx4, dx5, dx6] = args.leading::<7>()?;
                let y0 = self.y;
                let x1 = self.x + dx1;
                let x2 = x1 + dx2;
                let y2 = y0 + dy2;
                let x3 = x2 + dx3;
                self.curve_to(x1, y0, x2, y2, x3, y2);
                let x4 = x3 + dx4;
                let x5 = x4 + dx5;
                self.curve_to(x4, y2, x5, y0, x5 + dx6, y0);
            }
            HFlex1 => {
                let [dx1, dy1, dx2, dy2, dx3, dx4, dx5, dy5, dx6] = args.leading::<9>()?;
                let y0 = self.y;
                let x1 = self.x + dx1;
                let y1 = y0 + dy1;
                let x2 = x1 + dx2;
                let y2 = y1 + dy2;
                let x3 = x2 + dx3;
                self.curve_to(x1, y1, x2, y2, x3, y2);
                let x4 = x3 + dx4;
                let x5 = x4 + dx5;
                let y5 = y2 + dy5;
                self.curve_to(x4, y2, x5, y5, x5 + dx6, y0);
            }
            // The final operand applies to the axis with the larger
            // displacement; the other returns to its starting value.
            Flex1 => {
                let d = args.leading::<11>()?;
                let (x0, y0) = (self.x, self.y);
                let x1 = x0 + d[0];
                let y1 = y0 + d[1];
                let x2 = x1 + d[2];
                let y2 = y1 + d[3];
                let x3 = x2 + d[4];
                let y3 = y2 + d[5];
                self.curve_to(x1, y1, x2, y2, x3, y3);
                let x4 = x3 + d[6];
                let y4 = y3 + d[7];
                let x5 = x4 + d[8];
                let y5 = y4 + d[9];
                let (x6, y6) = if (x5 - x0).abs() > (y5 - y0).abs() {
                    (x5 + d[10], y0)
                } else {
                    (x0, y5 + d[10])
                };
                self.curve_to(x4, y4, x5, y5, x6, y6);
            }
            // Terminates evaluation regardless of subroutine depth
            // See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf#page=21>
            EndChar => {
                if args.len() >= 4 {
                    log::warn!("ignoring accented character operands of endchar");
                }
                self.close_contour();
                return Ok(false);
            }
            _ => {}
        }
        Ok(true)
    }

    /// Reports stem hints from pairs of edge deltas.
    fn stems(&mut self, args: &[Fixed], horizontal: bool) {
        let mut edge = Fixed::ZERO;
        for d in args.chunks_exact(2) {
            let start = edge + d[0];
            let end = start + d[1];
            if horizontal {
                self.sink.hstem(start, end);
            } else {
                self.sink.vstem(start, end);
            }
            edge = end;
        }
        self.stem_count += args.len() / 2;
    }

    fn move_to(&mut self, x: Fixed, y: Fixed) {
        self.close_contour();
        self.is_open = true;
        self.x = x;
        self.y = y;
        self.sink.move_to(x, y);
    }

    fn line_to(&mut self, x: Fixed, y: Fixed) {
        self.open_contour();
        self.x = x;
        self.y = y;
        self.sink.line_to(x, y);
    }

    fn curve_to(&mut self, cx0: Fixed, cy0: Fixed, cx1: Fixed, cy1: Fixed, x: Fixed, y: Fixed) {
        self.open_contour();
        self.x = x;
        self.y = y;
        self.sink.curve_to(cx0, cy0, cx1, cy1, x, y);
    }

    /// Emits a curve from six relative coordinates.
    fn rcurve(&mut self, d: &[Fixed]) {
        let x1 = self.x + d[0];
        let y1 = self.y + d[1];
        let x2 = x1 + d[2];
        let y2 = y1 + d[3];
        self.curve_to(x1, y1, x2, y2, x2 + d[4], y2 + d[5]);
    }

    /// Starts a contour at the current point if drawing begins without a
    /// moveto.
    fn open_contour(&mut self) {
        if !self.is_open {
            self.is_open = true;
            self.sink.move_to(self.x, self.y);
        }
    }

    fn close_contour(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.sink.close();
        }
    }
}

/// Returns true if `count` operands for the first stack clearing operator
/// include the advance width.
fn has_width_operand(operator: Operator, count: usize) -> bool {
    use Operator::*;
    match operator {
        HStem | VStem | HStemHm | VStemHm | HintMask | CntrMask => count % 2 == 1,
        RMoveTo => count == 3,
        HMoveTo | VMoveTo => count == 2,
        EndChar => count == 1 || count == 5,
        _ => false,
    }
}

/// Returns `StackUnderflow` if there are fewer operands than the smallest
/// complete group.
fn require(args: &Args, count: usize) -> Result<(), Error> {
    if args.len() < count {
        return Err(Error::StackUnderflow);
    }
    Ok(())
}

/// Removes the extra operand that may precede groups of four curve
/// operands.
fn leading_odd_operand(args: &mut Args) -> Fixed {
    if args.len() % 4 == 1 {
        args.take_first().unwrap_or_default()
    } else {
        Fixed::ZERO
    }
}

#[cfg(test)]
mod tests {
    use charstring_test_data::{op, CharstringBuilder};
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use types::{Fixed, PathPoint, PenCommand};

    use super::*;
    use crate::{CharstringTokens, Subroutines};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn run(charstring: &[u8]) -> Result<Outline, Error> {
        init_logger();
        execute(&mut CharstringTokens::new(charstring), &Options::default())
    }

    fn points(charstring: &[u8]) -> Vec<PathPoint> {
        run(charstring).unwrap().points
    }

    fn on(x: i32, y: i32) -> PathPoint {
        PathPoint::on_curve(x, y)
    }

    fn off(x: i32, y: i32) -> PathPoint {
        PathPoint::off_curve(x, y)
    }

    /// Charstring starting with `rmoveto 0 0`.
    fn at_origin() -> CharstringBuilder {
        CharstringBuilder::new().push_all(&[0, 0]).op(op::RMOVETO)
    }

    #[test]
    fn rlineto_emits_one_point_per_pair() {
        let charstring = CharstringBuilder::new()
            .push_all(&[10, 20])
            .op(op::RMOVETO)
            .push_all(&[5, 5, -3, 0, 0, 7])
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(10, 20),
                on(15, 25),
                on(12, 25),
                on(12, 32).ending_contour()
            ]
        );
    }

    #[test]
    fn consecutive_moves_close_single_point_contours() {
        let charstring = CharstringBuilder::new()
            .push_all(&[1, 1])
            .op(op::RMOVETO)
            .push_all(&[2, 2])
            .op(op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(1, 1).ending_contour(), on(3, 3).ending_contour()]
        );
    }

    #[test]
    fn hlineto_alternates_axes() {
        let charstring = at_origin()
            .push_all(&[5, 3, -2])
            .op(op::HLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(5, 0), on(5, 3), on(3, 3).ending_contour()]
        );
    }

    #[test]
    fn vlineto_alternates_axes() {
        let charstring = at_origin()
            .push_all(&[5, 3, -2])
            .op(op::VLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(0, 5), on(3, 5), on(3, 3).ending_contour()]
        );
    }

    #[test]
    fn rrcurveto_emits_two_controls_and_an_anchor() {
        let charstring = at_origin()
            .push_all(&[0, 0, 10, 0, 10, 10])
            .op(op::RRCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(0, 0),
                off(10, 0),
                on(10, 10).ending_contour()
            ]
        );
    }

    #[test]
    fn hhcurveto_and_vvcurveto() {
        let charstring = at_origin()
            .push_all(&[5, 10, 10, 10, 10])
            .op(op::HHCURVETO)
            .push_all(&[5, 10, 10, 10, 10])
            .op(op::VVCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(10, 5),
                off(20, 15),
                on(30, 15),
                off(35, 25),
                off(45, 35),
                on(45, 45).ending_contour()
            ]
        );
    }

    #[test]
    fn hvcurveto_with_trailing_operand() {
        let charstring = at_origin()
            .push_all(&[10, 10, 10, 10, 10, 10, 10, 10, 5])
            .op(op::HVCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(10, 0),
                off(20, 10),
                on(20, 20),
                off(20, 30),
                off(30, 40),
                on(40, 45).ending_contour()
            ]
        );
    }

    #[test]
    fn vhcurveto() {
        let charstring = at_origin()
            .push_all(&[10, 10, 10, 10])
            .op(op::VHCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), off(0, 10), off(10, 20), on(20, 20).ending_contour()]
        );
    }

    #[test]
    fn rcurveline_and_rlinecurve() {
        let charstring = at_origin()
            .push_all(&[10, 0, 10, 10, 0, 10, 5, 5])
            .op(op::RCURVELINE)
            .push_all(&[5, 0, 0, 5, 10, 0, 10, 10, 0, 10])
            .op(op::RLINECURVE)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(10, 0),
                off(20, 10),
                on(20, 20),
                on(25, 25),
                on(30, 25),
                on(30, 30),
                off(40, 30),
                off(50, 40),
                on(50, 50).ending_contour()
            ]
        );
    }

    #[test]
    fn rlinecurve_requires_a_curve() {
        let charstring = at_origin()
            .push_all(&[5, 0, 0, 5])
            .op(op::RLINECURVE)
            .build();
        assert_eq!(run(&charstring), Err(Error::StackUnderflow));
    }

    #[test]
    fn short_operand_groups_underflow() {
        let cases: &[(u8, &[i32])] = &[
            (op::RLINETO, &[7]),
            (op::HLINETO, &[]),
            (op::VLINETO, &[]),
            (op::RRCURVETO, &[1, 2, 3]),
            (op::HHCURVETO, &[1, 2, 3]),
            (op::HHCURVETO, &[5]),
            (op::VVCURVETO, &[1, 2, 3]),
            (op::HVCURVETO, &[1, 2, 3]),
            (op::VHCURVETO, &[1, 2, 3]),
        ];
        for (opcode, operands) in cases {
            let charstring = at_origin()
                .push_all(operands)
                .op(*opcode)
                .op(op::ENDCHAR)
                .build();
            assert_eq!(
                run(&charstring),
                Err(Error::StackUnderflow),
                "opcode {opcode} with {operands:?}"
            );
        }
    }

    #[test]
    fn vmoveto_moves_vertically() {
        let charstring = CharstringBuilder::new()
            .push(7)
            .op(op::VMOVETO)
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .push(5)
            .op(op::VMOVETO)
            .op(op::ENDCHAR)
            .build();
        let outline = run(&charstring).unwrap();
        assert_eq!(outline.width, None);
        assert_eq!(
            outline.points,
            vec![on(0, 7), on(10, 7).ending_contour(), on(10, 12).ending_contour()]
        );
        // a leading width operand
        let charstring = CharstringBuilder::new()
            .push_all(&[100, 7])
            .op(op::VMOVETO)
            .op(op::ENDCHAR)
            .build();
        let outline = run(&charstring).unwrap();
        assert_eq!(outline.width, Some(Fixed::from_i32(100)));
        assert_eq!(outline.points, vec![on(0, 7).ending_contour()]);
    }

    #[test]
    fn hhcurveto_resets_leading_dy_after_first_curve() {
        let charstring = at_origin()
            .push_all(&[5, 10, 20, 30, 40, 10, 20, 30, 40])
            .op(op::HHCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(10, 5),
                off(30, 35),
                on(70, 35),
                off(80, 35),
                off(100, 65),
                on(140, 65).ending_contour()
            ]
        );
        // without a leading dy both curves start flat
        let charstring = at_origin()
            .push_all(&[10, 20, 30, 40, 10, 20, 30, 40])
            .op(op::HHCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(10, 0),
                off(30, 30),
                on(70, 30),
                off(80, 30),
                off(100, 60),
                on(140, 60).ending_contour()
            ]
        );
    }

    #[test]
    fn hvcurveto_and_vhcurveto_alternate_without_trailing_operand() {
        let charstring = at_origin()
            .push_all(&[10, 20, 30, 40, 10, 20, 30, 40])
            .op(op::HVCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(10, 0),
                off(30, 30),
                on(30, 70),
                off(30, 80),
                off(50, 110),
                on(90, 110).ending_contour()
            ]
        );
        let charstring = at_origin()
            .push_all(&[10, 20, 30, 40, 10, 20, 30, 40])
            .op(op::VHCURVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                off(0, 10),
                off(20, 40),
                on(50, 40),
                off(60, 40),
                off(80, 70),
                on(80, 110).ending_contour()
            ]
        );
    }

    /// Two curves shared by the horizontal flex tests.
    fn flex_points() -> Vec<PathPoint> {
        vec![
            on(0, 0),
            off(10, 0),
            off(20, 5),
            on(30, 5),
            off(40, 5),
            off(50, 0),
            on(60, 0).ending_contour(),
        ]
    }

    #[test]
    fn flex() {
        let charstring = at_origin()
            .push_all(&[10, 0, 10, 5, 10, 0, 10, 0, 10, -5, 10, 0, 50])
            .escaped(op::FLEX)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(points(&charstring), flex_points());
    }

    #[test]
    fn hflex() {
        let charstring = at_origin()
            .push_all(&[10, 10, 5, 10, 10, 10, 10])
            .escaped(op::HFLEX)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(points(&charstring), flex_points());
    }

    /// Two curves shared by the hflex1 and flex1 tests.
    fn flex1_points() -> Vec<PathPoint> {
        vec![
            on(0, 0),
            off(10, 2),
            off(20, 5),
            on(30, 5),
            off(40, 5),
            off(50, 2),
            on(60, 0).ending_contour(),
        ]
    }

    #[test]
    fn hflex1() {
        let charstring = at_origin()
            .push_all(&[10, 2, 10, 3, 10, 10, 10, -3, 10])
            .escaped(op::HFLEX1)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(points(&charstring), flex1_points());
    }

    #[test]
    fn flex1_dominant_axis() {
        let horizontal = at_origin()
            .push_all(&[10, 2, 10, 3, 10, 0, 10, 0, 10, -3, 10])
            .escaped(op::FLEX1)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(points(&horizontal), flex1_points());
        let vertical = at_origin()
            .push_all(&[2, 10, 3, 10, 0, 10, 0, 10, -3, 10, 10])
            .escaped(op::FLEX1)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&vertical),
            vec![
                on(0, 0),
                off(2, 10),
                off(5, 20),
                on(5, 30),
                off(5, 40),
                off(2, 50),
                on(0, 60).ending_contour(),
            ]
        );
    }

    #[test]
    fn index_through_charstring() {
        // 10 20 30 1 index leaves 10 20 30 20
        let charstring = at_origin()
            .push_all(&[10, 20, 30, 1])
            .escaped(op::INDEX)
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(10, 20), on(40, 40).ending_contour()]
        );
    }

    #[test]
    fn roll_through_charstring() {
        // 10 20 30 3 1 roll leaves 30 10 20
        let charstring = at_origin()
            .push_all(&[10, 20, 30, 3, 1])
            .escaped(op::ROLL)
            .op(op::HLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(30, 0), on(30, 10), on(50, 10).ending_contour()]
        );
    }

    #[test]
    fn arithmetic_feeds_path_operators() {
        // (7 + 3) * 2 = 20, then 9 / 2 = 4.5 rounds up to 5
        let charstring = at_origin()
            .push_all(&[7, 3])
            .escaped(op::ADD)
            .push(2)
            .escaped(op::MUL)
            .push_all(&[9, 2])
            .escaped(op::DIV)
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(20, 5).ending_contour()]
        );
    }

    #[test]
    fn overflowing_arithmetic_saturates() {
        // 32000 32000 add 0 rmoveto
        let charstring = CharstringBuilder::new()
            .push_all(&[32000, 32000])
            .escaped(op::ADD)
            .push(0)
            .op(op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(points(&charstring), vec![on(32767, 0).ending_contour()]);
        // -32000 32000 sub 0 rmoveto
        let charstring = CharstringBuilder::new()
            .push_all(&[-32000, 32000])
            .escaped(op::SUB)
            .push(0)
            .op(op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(points(&charstring), vec![on(-32768, 0).ending_contour()]);
    }

    #[test]
    fn fractional_deltas_accumulate() {
        let half = Fixed::from_f64(0.5);
        let charstring = at_origin()
            .push_fixed(half)
            .push_fixed(half)
            .push_fixed(half)
            .push_fixed(half)
            .op(op::HLINETO)
            .op(op::ENDCHAR)
            .build();
        // (0.5, 0) (0.5, 0.5) (1, 0.5) (1, 1)
        assert_eq!(
            points(&charstring),
            vec![
                on(0, 0),
                on(1, 0),
                on(1, 1),
                on(1, 1),
                on(1, 1).ending_contour()
            ]
        );
    }

    #[test]
    fn endchar_closes_once() {
        let charstring = at_origin()
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        let mut commands: Vec<PenCommand> = Vec::new();
        evaluate(
            &mut CharstringTokens::new(&charstring),
            &Options::default(),
            &mut PenSink::new(&mut commands),
        )
        .unwrap();
        let closes = commands
            .iter()
            .filter(|command| **command == PenCommand::Close)
            .count();
        assert_eq!(closes, 1);
        let outline = run(&charstring).unwrap();
        let ends = outline
            .points
            .iter()
            .filter(|point| point.end_of_contour)
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn endchar_stops_evaluation() {
        let charstring = at_origin()
            .op(op::ENDCHAR)
            .push_all(&[10, 10])
            .op(op::RLINETO)
            .build();
        assert_eq!(points(&charstring), vec![on(0, 0).ending_contour()]);
    }

    #[test]
    fn end_of_data_closes_contour() {
        let charstring = at_origin().push_all(&[10, 0]).op(op::RLINETO).build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(10, 0).ending_contour()]
        );
    }

    #[test]
    fn drawing_without_moveto_opens_contour() {
        let charstring = CharstringBuilder::new()
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(10, 0).ending_contour()]
        );
    }

    #[test]
    fn empty_charstring() {
        assert_eq!(run(&[]), Ok(Outline::default()));
        let charstring = CharstringBuilder::new().op(op::ENDCHAR).build();
        assert_eq!(run(&charstring), Ok(Outline::default()));
    }

    #[test]
    fn unknown_opcode_yields_no_outline() {
        let charstring = at_origin()
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .op(2)
            .op(op::ENDCHAR)
            .build();
        assert_eq!(
            run(&charstring),
            Err(Error::UnknownOpcode {
                opcode: 2,
                escaped: false
            })
        );
        let charstring = at_origin().escaped(1).build();
        assert_eq!(
            run(&charstring),
            Err(Error::UnknownOpcode {
                opcode: 1,
                escaped: true
            })
        );
    }

    #[test]
    fn stack_limits() {
        let mut builder = CharstringBuilder::new();
        for i in 0..49 {
            builder = builder.push(i);
        }
        assert_eq!(run(&builder.build()), Err(Error::StackOverflow));
        let charstring = CharstringBuilder::new().push(1).op(op::RMOVETO).build();
        assert_eq!(run(&charstring), Err(Error::StackUnderflow));
    }

    #[test]
    fn transient_array_through_charstring() {
        // 25 3 put 3 get 0 rmoveto
        let charstring = CharstringBuilder::new()
            .push_all(&[25, 3])
            .escaped(op::PUT)
            .push(3)
            .escaped(op::GET)
            .push(0)
            .op(op::RMOVETO)
            .push_all(&[1, 40])
            .escaped(op::PUT)
            .build();
        assert_eq!(run(&charstring), Err(Error::IndexOutOfRange(40)));
        let charstring = CharstringBuilder::new()
            .push_all(&[25, 3])
            .escaped(op::PUT)
            .push(3)
            .escaped(op::GET)
            .push(0)
            .op(op::RMOVETO)
            .build();
        assert_eq!(points(&charstring), vec![on(25, 0).ending_contour()]);
    }

    #[test]
    fn advance_width() {
        let options = Options::new().with_nominal_width(Fixed::from_i32(50));
        let charstring = CharstringBuilder::new()
            .push_all(&[100, 10, 20])
            .op(op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        let outline = execute(&mut CharstringTokens::new(&charstring), &options).unwrap();
        assert_eq!(outline.width, Some(Fixed::from_i32(150)));
        assert_eq!(outline.points, vec![on(10, 20).ending_contour()]);
        // odd stem count
        let charstring = CharstringBuilder::new()
            .push_all(&[30, 0, 10])
            .op(op::HSTEM)
            .push(5)
            .op(op::HMOVETO)
            .op(op::ENDCHAR)
            .build();
        let outline = run(&charstring).unwrap();
        assert_eq!(outline.width, Some(Fixed::from_i32(30)));
        assert_eq!(outline.points, vec![on(5, 0).ending_contour()]);
        // width alone on endchar
        let charstring = CharstringBuilder::new().push(40).op(op::ENDCHAR).build();
        assert_eq!(run(&charstring).unwrap().width, Some(Fixed::from_i32(40)));
        // no width
        let charstring = at_origin().op(op::ENDCHAR).build();
        assert_eq!(run(&charstring).unwrap().width, None);
    }

    #[test]
    fn width_only_on_first_clearing_operator() {
        // the second rmoveto has three operands but no width
        let charstring = at_origin()
            .push_all(&[100, 10, 20])
            .op(op::RMOVETO)
            .op(op::ENDCHAR)
            .build();
        let outline = run(&charstring).unwrap();
        assert_eq!(outline.width, None);
        // extra operands are ignored: dx = 100, dy = 10
        assert_eq!(
            outline.points,
            vec![on(0, 0).ending_contour(), on(100, 10).ending_contour()]
        );
    }

    #[derive(Default)]
    struct HintRecorder {
        hstems: Vec<(Fixed, Fixed)>,
        vstems: Vec<(Fixed, Fixed)>,
        hint_masks: Vec<Vec<u8>>,
        counter_masks: Vec<Vec<u8>>,
        segments: usize,
    }

    impl CommandSink for HintRecorder {
        fn move_to(&mut self, _x: Fixed, _y: Fixed) {
            self.segments += 1;
        }

        fn line_to(&mut self, _x: Fixed, _y: Fixed) {
            self.segments += 1;
        }

        fn curve_to(&mut self, _: Fixed, _: Fixed, _: Fixed, _: Fixed, _: Fixed, _: Fixed) {
            self.segments += 1;
        }

        fn close(&mut self) {}

        fn hstem(&mut self, y0: Fixed, y1: Fixed) {
            self.hstems.push((y0, y1));
        }

        fn vstem(&mut self, x0: Fixed, x1: Fixed) {
            self.vstems.push((x0, x1));
        }

        fn hint_mask(&mut self, mask: &[u8]) {
            self.hint_masks.push(mask.to_vec());
        }

        fn counter_mask(&mut self, mask: &[u8]) {
            self.counter_masks.push(mask.to_vec());
        }
    }

    fn edges(pairs: &[(i32, i32)]) -> Vec<(Fixed, Fixed)> {
        pairs
            .iter()
            .map(|(a, b)| (Fixed::from_i32(*a), Fixed::from_i32(*b)))
            .collect()
    }

    #[test]
    fn hint_masks_skip_mask_bytes() {
        init_logger();
        // the mask byte would decode as an operand if it were not skipped
        let charstring = CharstringBuilder::new()
            .push_all(&[0, 10, 20, 10])
            .op(op::HSTEMHM)
            .push_all(&[30, 10])
            .op(op::HINTMASK)
            .raw(&[0b1110_0000])
            .push_all(&[0, 0])
            .op(op::RMOVETO)
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .op(op::CNTRMASK)
            .raw(&[0b1010_0000])
            .op(op::ENDCHAR)
            .build();
        let mut sink = HintRecorder::default();
        let width = evaluate(
            &mut CharstringTokens::new(&charstring),
            &Options::default(),
            &mut sink,
        )
        .unwrap();
        assert_eq!(width, None);
        assert_eq!(sink.hstems, edges(&[(0, 10), (30, 40)]));
        assert_eq!(sink.vstems, edges(&[(30, 40)]));
        assert_eq!(sink.hint_masks, vec![vec![0b1110_0000]]);
        assert_eq!(sink.counter_masks, vec![vec![0b1010_0000]]);
        assert_eq!(sink.segments, 2);
    }

    #[test]
    fn hint_mask_length_follows_stem_count() {
        // nine stems need two mask bytes
        let mut builder = CharstringBuilder::new();
        for _ in 0..9 {
            builder = builder.push_all(&[10, 5]);
        }
        let charstring = builder
            .op(op::VSTEMHM)
            .op(op::HINTMASK)
            .raw(&[0xFF, 0x80])
            .op(op::ENDCHAR)
            .build();
        let mut sink = HintRecorder::default();
        evaluate(
            &mut CharstringTokens::new(&charstring),
            &Options::default(),
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.vstems.len(), 9);
        assert_eq!(sink.hint_masks, vec![vec![0xFF, 0x80]]);
        // truncated mask
        let charstring = CharstringBuilder::new()
            .push_all(&[10, 5])
            .op(op::HSTEM)
            .op(op::HINTMASK)
            .build();
        assert_eq!(run(&charstring), Err(Error::UnexpectedEndOfData));
    }

    #[test]
    fn vstem_and_dotsection() {
        // dotsection discards its operands and draws nothing
        let charstring = CharstringBuilder::new()
            .push_all(&[10, 20, 5, 15])
            .op(op::VSTEM)
            .push(99)
            .escaped(op::DOTSECTION)
            .push_all(&[0, 0])
            .op(op::RMOVETO)
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .escaped(op::DOTSECTION)
            .op(op::ENDCHAR)
            .build();
        let mut sink = HintRecorder::default();
        let width = evaluate(
            &mut CharstringTokens::new(&charstring),
            &Options::default(),
            &mut sink,
        )
        .unwrap();
        assert_eq!(width, None);
        assert_eq!(sink.vstems, edges(&[(10, 30), (35, 50)]));
        assert!(sink.hstems.is_empty());
        assert_eq!(sink.segments, 2);
        assert_eq!(
            points(&charstring),
            vec![on(0, 0), on(10, 0).ending_contour()]
        );
    }

    fn run_with_subrs(
        charstring: &[u8],
        global: &[&[u8]],
        local: &[&[u8]],
    ) -> Result<Outline, Error> {
        init_logger();
        let mut tokens = CharstringTokens::with_subroutines(
            charstring,
            Subroutines::new(global),
            Some(Subroutines::new(local)),
        );
        execute(&mut tokens, &Options::default())
    }

    #[test]
    fn local_and_global_subroutines() {
        let local = CharstringBuilder::new()
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .op(op::RETURN)
            .build();
        // operands pushed before the call are consumed by the subroutine
        let global = CharstringBuilder::new().op(op::RLINETO).op(op::RETURN).build();
        let charstring = at_origin()
            .push(-107)
            .op(op::CALLSUBR)
            .push_all(&[0, 10, -107])
            .op(op::CALLGSUBR)
            .op(op::ENDCHAR)
            .build();
        let outline = run_with_subrs(&charstring, &[&global], &[&local]).unwrap();
        assert_eq!(
            outline.points,
            vec![on(0, 0), on(10, 0), on(10, 10).ending_contour()]
        );
    }

    #[test]
    fn nested_subroutines_and_implicit_return() {
        // subr 1 calls subr 0, neither ends with return
        let subr0 = CharstringBuilder::new()
            .push_all(&[0, 5])
            .op(op::RLINETO)
            .build();
        let subr1 = CharstringBuilder::new()
            .push_all(&[5, 0])
            .op(op::RLINETO)
            .push(-107)
            .op(op::CALLSUBR)
            .build();
        let charstring = at_origin()
            .push(-106)
            .op(op::CALLSUBR)
            .push_all(&[1, 1])
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        let outline = run_with_subrs(&charstring, &[], &[&subr0, &subr1]).unwrap();
        assert_eq!(
            outline.points,
            vec![on(0, 0), on(5, 0), on(5, 5), on(6, 6).ending_contour()]
        );
    }

    #[test]
    fn endchar_inside_subroutine() {
        let subr = CharstringBuilder::new()
            .push_all(&[10, 0])
            .op(op::RLINETO)
            .op(op::ENDCHAR)
            .build();
        let charstring = at_origin()
            .push(-107)
            .op(op::CALLSUBR)
            .push_all(&[99, 99])
            .op(op::RLINETO)
            .build();
        let outline = run_with_subrs(&charstring, &[], &[&subr]).unwrap();
        assert_eq!(outline.points, vec![on(0, 0), on(10, 0).ending_contour()]);
    }

    #[test]
    fn call_stack_limits() {
        let recursive = CharstringBuilder::new().push(-107).op(op::CALLSUBR).build();
        let charstring = CharstringBuilder::new().push(-107).op(op::CALLSUBR).build();
        assert_eq!(
            run_with_subrs(&charstring, &[], &[&recursive]),
            Err(Error::CallStackOverflow)
        );
        let charstring = at_origin().op(op::RETURN).build();
        assert_eq!(run(&charstring), Err(Error::CallStackUnderflow));
    }

    #[test]
    fn bad_subroutine_index() {
        let subr = CharstringBuilder::new().op(op::RETURN).build();
        let charstring = CharstringBuilder::new().push(5).op(op::CALLGSUBR).build();
        assert_eq!(
            run_with_subrs(&charstring, &[&subr], &[]),
            Err(Error::InvalidSubroutineIndex(5))
        );
        let charstring = CharstringBuilder::new().push(-107).op(op::CALLSUBR).build();
        assert_eq!(run(&charstring), Err(Error::MissingSubroutines));
    }

    #[test]
    fn random_operator_is_seeded() {
        // random 0 rmoveto with a 16.16 scale of 1000
        let charstring = CharstringBuilder::new()
            .escaped(op::RANDOM)
            .push(1000)
            .escaped(op::MUL)
            .push(0)
            .op(op::RMOVETO)
            .build();
        let x = |seed| {
            let options = Options::new().with_random_seed(seed);
            execute(&mut CharstringTokens::new(&charstring), &options).unwrap().points[0].x
        };
        assert_eq!(x(42), x(42));
        assert!((0..=1000).contains(&x(42)));
    }

    #[test]
    fn fixtures() {
        use charstring_test_data::charstrings;
        let outline = run(charstrings::SQUARE).unwrap();
        assert_eq!(outline.width, Some(Fixed::from_i32(500)));
        assert_eq!(
            outline.points,
            vec![
                on(100, 100),
                on(400, 100),
                on(400, 400),
                on(100, 400).ending_contour()
            ]
        );
        let outline = run(charstrings::HINTED).unwrap();
        assert_eq!(outline.width, Some(Fixed::from_i32(500)));
        assert_eq!(
            outline.points,
            vec![
                on(100, 0),
                on(150, 0),
                on(150, 500),
                on(100, 500).ending_contour()
            ]
        );
        let outline = run_with_subrs(
            charstrings::ROUNDED,
            charstrings::ROUNDED_GLOBAL_SUBRS,
            charstrings::ROUNDED_LOCAL_SUBRS,
        )
        .unwrap();
        assert_eq!(outline.width, None);
        assert_eq!(outline.points.len(), 17);
        assert_eq!(
            outline.points.iter().filter(|p| p.end_of_contour).count(),
            1
        );
    }

    #[test]
    fn random_bytes_never_panic() {
        init_logger();
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..2000 {
            let len = rng.gen_range(0..64);
            let charstring: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let subr: Vec<u8> = (0..rng.gen_range(0..16)).map(|_| rng.gen()).collect();
            let subrs = [subr.as_slice(), charstring.as_slice()];
            let mut tokens = CharstringTokens::with_subroutines(
                &charstring,
                Subroutines::new(&subrs),
                Some(Subroutines::new(&subrs)),
            );
            let _ = execute(&mut tokens, &Options::new().with_random_seed(len as u32));
        }
    }
}
