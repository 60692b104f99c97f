//! Common scalar and geometry types for Type 2 charstring evaluation
//!
//! Type 2 charstrings compute with [16.16 fixed point][Fixed] numbers and
//! produce outlines as sequences of [path points][PathPoint].

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

mod fixed;
mod path_point;
mod pen;


pub use fixed::Fixed;
pub use path_point::PathPoint;
pub use pen::{Pen, PenCommand};
