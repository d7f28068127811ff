//! Forward evaluator for replicant matrices.
//!
//! This module provides the [`ForwardEvaluator`], which recomputes the output
//! values of one matrix in a single pass over its interaction list. Each edge
//! is applied in sequence order:
//!
//! ```text
//! raw            = input.value * bias(output) + weight
//! output.value   = activation(raw)
//! ```
//!
//! The target's bias is read before its value is overwritten. Under
//! [`BiasMode::Carry`] the written value then becomes the bias seen by the next
//! edge (or pass) that targets the same node, so results depend on edge order.
//!
//! Hidden nodes are not part of the pass. A multi-layer evaluator would walk
//! Input → Hidden → Output in dependency order; this one only applies the flat
//! edge list.

use crate::config::{BiasMode, EngineConfig};
use crate::matrix::ReplicantMatrix;

/// Single-pass edge evaluator.
///
/// Holds only configuration, so one instance can be shared across worker
/// threads while each thread owns the matrix it evaluates.
#[derive(Debug, Clone, Default)]
pub struct ForwardEvaluator {
    config: EngineConfig,
}

impl ForwardEvaluator {
    /// Create an evaluator with the given policy.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The evaluation policy.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply every interaction of `matrix` in order and return how many were
    /// applied.
    ///
    /// Only output `value` fields (and, in carry mode, their accumulators) are
    /// written. Ids, node types and configured biases are never touched. An
    /// inert matrix is left unchanged and yields `0`.
    ///
    /// The exclusive borrow means no reader can observe the matrix between
    /// two edges of the same pass. No allocation happens here.
    pub fn evaluate(&self, matrix: &mut ReplicantMatrix) -> usize {
        let activation = self.config.activation;
        let bias_mode = self.config.bias_mode;
        let (edges, nodes) = matrix.edges_and_nodes_mut();

        for edge in edges {
            let source = nodes[edge.input()].value();
            let target = &mut nodes[edge.output()];

            let bias = match bias_mode {
                BiasMode::Static => target.bias(),
                BiasMode::Carry => target.carried_bias(),
            };
            let value = activation.apply(source * bias + edge.weight());

            target.set_value(value);
            if bias_mode == BiasMode::Carry {
                target.set_carried_bias(value);
            }
        }

        edges.len()
    }
}

/// Weighted-sum neuron: `sum(a * b) + bias` over `(value, weight)` pairs.
///
/// Summation runs left to right starting from `0.0`. An empty slice yields
/// `bias`.
#[must_use]
pub fn forward_sum(pairs: &[(f32, f32)], bias: f32) -> f32 {
    pairs
        .iter()
        .fold(0.0_f32, |acc, &(value, weight)| acc + value * weight)
        + bias
}
