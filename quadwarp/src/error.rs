use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarpError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(Degeneracy),
}

/// Why a correspondence set could not produce a homography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// Every candidate pivot in this column was (numerically) zero.
    SingularPivot { column: usize },
    /// Three corners of one quad lie on a line (or two coincide).
    CollinearPoints { indices: [usize; 3] },
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::SingularPivot { column } => {
                write!(f, "singular system: no usable pivot in column {column}")
            }
            Degeneracy::CollinearPoints { indices: [a, b, c] } => {
                write!(f, "corners {a}, {b} and {c} are collinear")
            }
        }
    }
}
