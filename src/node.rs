//! Node and interaction types for replicant matrices.
//!
//! This module defines the two building blocks of an agent's graph:
//! - [`Node`]: a scalar computation unit with identity, role, bias and value
//! - [`Interaction`]: a weighted directed edge between two nodes

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Arena key for a node inside one [`ReplicantMatrix`](crate::ReplicantMatrix).
    ///
    /// Keys are minted only by the owning matrix during construction and are
    /// meaningless in any other matrix.
    pub struct NodeKey;
}

/// The role of a node in the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Sensor-fed node. Its value is written by the host before evaluation.
    Input,
    /// Declared intermediate node. Not wired into single-layer evaluation.
    Hidden,
    /// Control node. Its value is written only by the evaluator.
    Output,
}

impl NodeType {
    /// Whether an interaction may read from a node of this type.
    #[must_use]
    pub const fn can_source(self) -> bool {
        matches!(self, Self::Input)
    }

    /// Whether an interaction may write to a node of this type.
    #[must_use]
    pub const fn can_target(self) -> bool {
        matches!(self, Self::Output)
    }
}

/// A single computation unit.
///
/// Configuration (`id`, `node_type`, `bias`) is fixed at spawn. Runtime state
/// is `value` plus `carried_bias`, the accumulator read instead of `bias` when
/// the evaluator runs in [`BiasMode::Carry`](crate::BiasMode::Carry).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: u32,
    node_type: NodeType,
    bias: f32,
    value: f32,
    carried_bias: f32,
}

impl Node {
    pub(crate) fn new(id: u32, node_type: NodeType, bias: f32, value: f32) -> Self {
        Self {
            id,
            node_type,
            bias,
            value,
            carried_bias: bias,
        }
    }

    /// Identifier, unique within the owning matrix.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Role of this node.
    #[inline]
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Configured bias.
    #[inline]
    #[must_use]
    pub const fn bias(&self) -> f32 {
        self.bias
    }

    /// Current output value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Bias accumulator used by carry-mode evaluation.
    #[inline]
    #[must_use]
    pub const fn carried_bias(&self) -> f32 {
        self.carried_bias
    }

    #[inline]
    pub(crate) fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    #[inline]
    pub(crate) fn set_carried_bias(&mut self, carried: f32) {
        self.carried_bias = carried;
    }

    pub(crate) fn reset_carry(&mut self) {
        self.carried_bias = self.bias;
    }
}

/// A weighted directed link from an input node to an output node.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    id: u32,
    input: NodeKey,
    output: NodeKey,
    weight: f32,
}

impl Interaction {
    pub(crate) const fn new(id: u32, input: NodeKey, output: NodeKey, weight: f32) -> Self {
        Self {
            id,
            input,
            output,
            weight,
        }
    }

    /// Identifier, unique within the owning matrix.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Source node.
    #[inline]
    #[must_use]
    pub const fn input(&self) -> NodeKey {
        self.input
    }

    /// Target node.
    #[inline]
    #[must_use]
    pub const fn output(&self) -> NodeKey {
        self.output
    }

    /// Edge weight.
    #[inline]
    #[must_use]
    pub const fn weight(&self) -> f32 {
        self.weight
    }
}
