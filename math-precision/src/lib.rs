//! Numeric precision tiers for dense linear algebra
//!
//! This crate provides the scalar types the dense solvers run on, behind a
//! single capability trait so that decompositions and refinement are written
//! once and instantiated per tier.
//!
//! # Tiers
//!
//! - **Machine**: `f64`
//! - **Extended**: double-double via [`twofloat`] (~106 significand bits)
//! - **Decimal**: [`bigdecimal`] rounded to 40 significant digits
//! - **WideDecimal**: [`bigdecimal`] rounded to 80 significant digits
//!
//! Each tier names the next one up through [`Scalar::Wider`], which is where
//! iterative refinement evaluates residuals.
//!
//! # Example
//!
//! ```
//! use math_audio_precision::Decimal;
//!
//! let x: Decimal = "0.1".parse().unwrap();
//! let y = x.clone() + x;
//! assert_eq!(y, "0.2".parse().unwrap());
//! ```

mod decimal;
mod extended;
mod machine;
pub mod traits;

pub use decimal::{Decimal, WideDecimal};
pub use extended::{Extended, split as split_extended};
pub use traits::{Scalar, Tier, max_magnitude};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
