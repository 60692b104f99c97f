//! Settings for charstring evaluation.

use types::Fixed;

/// Settings that come from outside the charstring itself.
///
/// The defaults are suitable for a charstring whose Private DICT has no
/// `nominalWidthX` entry.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct Options {
    /// Value added to an advance width encoded in the charstring.
    ///
    /// This is the `nominalWidthX` entry of the Private DICT.
    pub nominal_width: Fixed,
    /// Initial state for the `random` operator. Zero selects a fixed
    /// nonzero seed.
    pub random_seed: u32,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nominal_width(self, nominal_width: Fixed) -> Self {
        Self {
            nominal_width,
            ..self
        }
    }

    pub fn with_random_seed(self, random_seed: u32) -> Self {
        Self {
            random_seed,
            ..self
        }
    }
}
