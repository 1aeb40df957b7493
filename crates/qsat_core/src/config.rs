//! Encoding configuration.

use crate::QsatError;
use crate::cardinality::{CardinalityEncoder, SequentialCounter, Totalizer};
use crate::parity::{ParityEncoder, XorEncoding};
use core::fmt;
use core::str::FromStr;

/// At-most-k encoding used for the error budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CardinalityMethod {
    /// Balanced unary adder tree with outputs truncated at `k + 1`.
    #[default]
    Totalizer,
    /// Sinz sequential counter with `(n - 1) * k` auxiliaries.
    SequentialCounter,
}

impl CardinalityMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            CardinalityMethod::Totalizer => "totalizer",
            CardinalityMethod::SequentialCounter => "seqcounter",
        }
    }

    pub(crate) fn encoder(self) -> &'static dyn CardinalityEncoder {
        match self {
            CardinalityMethod::Totalizer => &Totalizer,
            CardinalityMethod::SequentialCounter => &SequentialCounter,
        }
    }
}

impl FromStr for CardinalityMethod {
    type Err = QsatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totalizer" | "tot" => Ok(CardinalityMethod::Totalizer),
            "seqcounter" | "sequential_counter" => Ok(CardinalityMethod::SequentialCounter),
            other => Err(QsatError::UnsupportedEncodingMethod(other.to_string())),
        }
    }
}

impl fmt::Display for CardinalityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs of a model build.
///
/// The same configuration, model, and error budget always yield the same
/// constraint set, clause for clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingConfig {
    /// Parity strategy for constraints above the brute-force arity.
    pub xor_encoding: XorEncoding,

    /// Largest arity encoded by enumerating blocking clauses.
    pub brute_force_limit: usize,

    /// Encoding of the error budget.
    pub cardinality: CardinalityMethod,

    /// Adds the x-coordinate connectivity side constraints.
    ///
    /// Off by default: the constraints assume every logical error crosses
    /// every detector column, which holds for standard surface-code memory
    /// experiments but is not checked here.
    pub connectivity: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            xor_encoding: XorEncoding::default(),
            brute_force_limit: ParityEncoder::DEFAULT_BRUTE_FORCE_LIMIT,
            cardinality: CardinalityMethod::default(),
            connectivity: false,
        }
    }
}

impl EncodingConfig {
    /// Parity encoder for this configuration.
    pub fn parity_encoder(&self) -> Result<ParityEncoder, QsatError> {
        ParityEncoder::new(self.xor_encoding).with_brute_force_limit(self.brute_force_limit)
    }
}
