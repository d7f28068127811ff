//! Activation functions for replicant matrices.
//!
//! These are pure scalar transforms that can be applied to the raw linear
//! combination produced by the forward evaluator. They are also exposed as free
//! functions so other numeric code in the host can reuse them directly.
//!
//! None of these functions guard against NaN or infinities. IEEE-754
//! propagation is the contract: `sigmoid(+inf)` saturates to `1.0`,
//! `forward_sigmoid(+inf)` saturates to `0.0`, and NaN stays NaN except where
//! `f32::max` discards it (see [`relu`]).

use serde::{Deserialize, Serialize};

/// Logistic sigmoid: `1 / (1 + e^(-x))`.
///
/// The general-purpose form. `sigmoid(0) == 0.5`, tends to `1` as `x → +∞`.
#[inline]
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Forward-pass sigmoid: `1 / (1 + e^x)`.
///
/// Same curve as [`sigmoid`] mirrored around `x = 0`: it tends to `0` as
/// `x → +∞`. Kept distinct because call sites depend on either convention.
#[inline]
#[must_use]
pub fn forward_sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + x.exp())
}

/// Rectified linear unit: `max(x, 0)`.
///
/// `relu(-inf) == 0` and `relu(+inf) == +inf`. A NaN input yields `0.0`
/// because `f32::max` returns the non-NaN operand.
#[inline]
#[must_use]
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Map `x` from `[min, max]` onto `[0, 1]`.
///
/// Values outside the range map outside `[0, 1]`. A degenerate range
/// (`min == max`) divides by zero and yields `±inf` or NaN.
#[inline]
#[must_use]
pub fn normalize(x: f32, min: f32, max: f32) -> f32 {
    (x - min) / (max - min)
}

/// Post-processing step applied to each raw edge result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    /// Identity: the raw linear combination is the output.
    #[default]
    Identity,
    /// Sigmoid: f(x) = 1 / (1 + e^(-x))
    Sigmoid,
    /// Forward-pass sigmoid: f(x) = 1 / (1 + e^x)
    ForwardSigmoid,
    /// Rectified Linear Unit: f(x) = max(0, x)
    ReLU,
}

impl Activation {
    /// All available activation functions.
    pub const ALL: [Self; 4] = [
        Self::Identity,
        Self::Sigmoid,
        Self::ForwardSigmoid,
        Self::ReLU,
    ];

    /// Apply this activation function to an input value.
    #[inline]
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Identity => x,
            Self::Sigmoid => sigmoid(x),
            Self::ForwardSigmoid => forward_sigmoid(x),
            Self::ReLU => relu(x),
        }
    }
}
