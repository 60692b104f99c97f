//! Interpreter for Type 2 charstrings
//!
//! This crate evaluates the per-glyph programs found in [CFF][cff] fonts and
//! produces the glyph outline as a sequence of [path points][PathPoint] or
//! as commands sent to a [`CommandSink`].
//!
//! Decoding of the font container is left to the caller: the interpreter
//! pulls tokens from a [`TokenSource`], and [`CharstringTokens`] provides one
//! for charstrings and subroutines that are already available as byte
//! slices.
//!
//! # Example
//!
//! ```
//! use charstring_vm::{execute, CharstringTokens, Options};
//! // 100 100 rmoveto 300 300 -300 hlineto endchar
//! let charstring = [239, 239, 21, 247, 192, 247, 192, 251, 192, 6, 14];
//! let outline = execute(&mut CharstringTokens::new(&charstring), &Options::default()).unwrap();
//! assert_eq!(outline.points.len(), 4);
//! assert!(outline.points[3].end_of_contour);
//! ```
//!
//! [cff]: https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

/// Public re-export of the charstring-types crate.
pub extern crate charstring_types as types;

mod arithmetic;
mod call_stack;
mod error;
mod interpreter;
mod operator;
mod options;
#[cfg(feature = "std")]
mod path;
mod stack;
mod tokens;
mod transient;

pub use call_stack::NESTING_DEPTH_LIMIT;
pub use error::Error;
#[cfg(feature = "std")]
pub use interpreter::execute;
pub use interpreter::{evaluate, CommandSink, PenSink};
pub use operator::Operator;
pub use options::Options;
#[cfg(feature = "kurbo")]
pub use path::to_bez_path;
#[cfg(feature = "std")]
pub use path::{draw_points, Outline, PathBuilder};
pub use stack::MAX_STACK;
pub use tokens::{CharstringTokens, Position, Program, SubroutineKind, Subroutines, TokenSource};
pub use transient::TRANSIENT_ARRAY_SIZE;
pub use types::{Fixed, PathPoint, Pen};

use stack::Stack;
use transient::TransientArray;
