//! Per-agent replicant matrix with arena-allocated nodes.
//!
//! A [`ReplicantMatrix`] is built once from a validated
//! [`MatrixBlueprint`] and keeps its topology fixed for the agent's lifetime.
//! Nodes live in a `SlotMap` arena; interactions hold keys into that arena, and
//! keys are never handed in from outside, so every edge resolves inside the
//! agent that owns it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use thiserror::Error;

use crate::activation::normalize;
use crate::blueprint::{BuildError, InteractionSpec, MatrixBlueprint, NodeSpec};
use crate::node::{Interaction, Node, NodeKey, NodeType};

/// Errors raised by sensor writes and output reads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("input index {index} out of bounds for matrix with {len} inputs")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// One agent's computation graph.
///
/// Serializes as its [`MatrixBlueprint`] (current values included) and
/// deserializes through validation. Carry-mode accumulators are runtime state
/// and restart from the configured biases after a round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MatrixBlueprint", into = "MatrixBlueprint")]
pub struct ReplicantMatrix {
    nodes: SlotMap<NodeKey, Node>,
    inputs: Vec<NodeKey>,
    hidden: Vec<NodeKey>,
    outputs: Vec<NodeKey>,
    interactions: Vec<Interaction>,
    inert: bool,
}

impl ReplicantMatrix {
    /// Validate `blueprint` and build a live matrix from it.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] reported by [`MatrixBlueprint::validate`].
    pub fn from_blueprint(blueprint: &MatrixBlueprint) -> Result<Self, BuildError> {
        blueprint.validate()?;

        let mut nodes: SlotMap<NodeKey, Node> =
            SlotMap::with_capacity_and_key(blueprint.node_count());
        let mut keys: HashMap<u32, NodeKey> = HashMap::with_capacity(blueprint.node_count());

        let mut insert = |specs: &[NodeSpec], node_type: NodeType| -> Vec<NodeKey> {
            specs
                .iter()
                .map(|spec| {
                    let key = nodes.insert(Node::new(spec.id, node_type, spec.bias, spec.value));
                    keys.insert(spec.id, key);
                    key
                })
                .collect()
        };
        let inputs = insert(&blueprint.inputs, NodeType::Input);
        let hidden = insert(&blueprint.hidden, NodeType::Hidden);
        let outputs = insert(&blueprint.outputs, NodeType::Output);

        let resolve = |interaction: u32, node: u32| {
            keys.get(&node)
                .copied()
                .ok_or(BuildError::UnknownNode { interaction, node })
        };
        let interactions = blueprint
            .interactions
            .iter()
            .map(|spec| {
                let input = resolve(spec.id, spec.input)?;
                let output = resolve(spec.id, spec.output)?;
                Ok(Interaction::new(spec.id, input, output, spec.weight))
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        Ok(Self {
            nodes,
            inputs,
            hidden,
            outputs,
            interactions,
            inert: blueprint.inert,
        })
    }

    /// Build a matrix from the four spawn buffers.
    ///
    /// # Errors
    ///
    /// Same as [`from_blueprint`](Self::from_blueprint). An empty interaction
    /// buffer is rejected.
    pub fn from_buffers(
        inputs: &[NodeSpec],
        outputs: &[NodeSpec],
        hidden: &[NodeSpec],
        interactions: &[InteractionSpec],
    ) -> Result<Self, BuildError> {
        Self::from_blueprint(&MatrixBlueprint {
            inputs: inputs.to_vec(),
            hidden: hidden.to_vec(),
            outputs: outputs.to_vec(),
            interactions: interactions.to_vec(),
            inert: false,
        })
    }

    /// Describe the current state as a blueprint.
    #[must_use]
    pub fn to_blueprint(&self) -> MatrixBlueprint {
        let specs = |keys: &[NodeKey]| -> Vec<NodeSpec> {
            keys.iter()
                .map(|&key| {
                    let node = &self.nodes[key];
                    NodeSpec {
                        id: node.id(),
                        bias: node.bias(),
                        value: node.value(),
                    }
                })
                .collect()
        };

        MatrixBlueprint {
            inputs: specs(&self.inputs),
            hidden: specs(&self.hidden),
            outputs: specs(&self.outputs),
            interactions: self
                .interactions
                .iter()
                .map(|edge| InteractionSpec {
                    id: edge.id(),
                    input: self.nodes[edge.input()].id(),
                    output: self.nodes[edge.output()].id(),
                    weight: edge.weight(),
                })
                .collect(),
            inert: self.inert,
        }
    }

    /// Input nodes in insertion order.
    pub fn inputs(&self) -> impl Iterator<Item = &Node> + '_ {
        self.inputs.iter().map(|&key| &self.nodes[key])
    }

    /// Hidden nodes in insertion order.
    pub fn hidden(&self) -> impl Iterator<Item = &Node> + '_ {
        self.hidden.iter().map(|&key| &self.nodes[key])
    }

    /// Output nodes in insertion order.
    pub fn outputs(&self) -> impl Iterator<Item = &Node> + '_ {
        self.outputs.iter().map(|&key| &self.nodes[key])
    }

    /// Interactions in evaluation order.
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Source and target nodes of the interaction at `index`.
    ///
    /// Edges are resolved against this matrix's own arena, so the result is
    /// always a pair of this agent's nodes.
    #[must_use]
    pub fn endpoints(&self, index: usize) -> Option<(&Node, &Node)> {
        let edge = self.interactions.get(index)?;
        Some((&self.nodes[edge.input()], &self.nodes[edge.output()]))
    }

    /// Look up a node by its id.
    #[must_use]
    pub fn node_by_id(&self, id: u32) -> Option<&Node> {
        self.nodes.values().find(|node| node.id() == id)
    }

    /// Number of input nodes.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of hidden nodes.
    #[must_use]
    pub fn num_hidden(&self) -> usize {
        self.hidden.len()
    }

    /// Number of output nodes.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// True when the matrix was spawned without interactions.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Write one sensor value into the input at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::IndexOutOfBounds`] if `index >= num_inputs()`.
    pub fn set_input(&mut self, index: usize, value: f32) -> Result<(), SensorError> {
        let key = *self.inputs.get(index).ok_or(SensorError::IndexOutOfBounds {
            index,
            len: self.inputs.len(),
        })?;
        self.nodes[key].set_value(value);
        Ok(())
    }

    /// Write a full sensor frame, one value per input in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::LengthMismatch`] if `values.len() != num_inputs()`.
    /// Nothing is written in that case.
    pub fn write_inputs(&mut self, values: &[f32]) -> Result<(), SensorError> {
        if values.len() != self.inputs.len() {
            return Err(SensorError::LengthMismatch {
                expected: self.inputs.len(),
                actual: values.len(),
            });
        }
        for (&key, &value) in self.inputs.iter().zip(values) {
            self.nodes[key].set_value(value);
        }
        Ok(())
    }

    /// Write a sensor frame after mapping each raw reading from `[min, max]`
    /// onto `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Same as [`write_inputs`](Self::write_inputs).
    pub fn write_inputs_normalized(
        &mut self,
        raw: &[f32],
        min: f32,
        max: f32,
    ) -> Result<(), SensorError> {
        if raw.len() != self.inputs.len() {
            return Err(SensorError::LengthMismatch {
                expected: self.inputs.len(),
                actual: raw.len(),
            });
        }
        for (&key, &reading) in self.inputs.iter().zip(raw) {
            self.nodes[key].set_value(normalize(reading, min, max));
        }
        Ok(())
    }

    /// Current output values in insertion order.
    #[must_use]
    pub fn output_values(&self) -> Vec<f32> {
        self.outputs().map(Node::value).collect()
    }

    /// Copy current output values into `buffer` without allocating.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::LengthMismatch`] if `buffer.len() != num_outputs()`.
    pub fn read_outputs_into(&self, buffer: &mut [f32]) -> Result<(), SensorError> {
        if buffer.len() != self.outputs.len() {
            return Err(SensorError::LengthMismatch {
                expected: self.outputs.len(),
                actual: buffer.len(),
            });
        }
        for (slot, node) in buffer.iter_mut().zip(self.outputs()) {
            *slot = node.value();
        }
        Ok(())
    }

    /// Restore every carry-mode accumulator to its node's configured bias.
    pub fn reset_carry(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset_carry();
        }
    }

    /// Split borrow for the evaluator: edges read-only, nodes writable.
    pub(crate) fn edges_and_nodes_mut(&mut self) -> (&[Interaction], &mut SlotMap<NodeKey, Node>) {
        (&self.interactions, &mut self.nodes)
    }
}

impl TryFrom<MatrixBlueprint> for ReplicantMatrix {
    type Error = BuildError;

    fn try_from(blueprint: MatrixBlueprint) -> Result<Self, Self::Error> {
        Self::from_blueprint(&blueprint)
    }
}

impl From<ReplicantMatrix> for MatrixBlueprint {
    fn from(matrix: ReplicantMatrix) -> Self {
        matrix.to_blueprint()
    }
}
