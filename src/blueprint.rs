//! Spawn-time description of a replicant matrix.
//!
//! A [`MatrixBlueprint`] holds the four buffers a spawner hands over when an
//! agent is created: input nodes, hidden nodes, output nodes and interactions.
//! Interactions name their endpoints by node id, and ids only resolve within the
//! same blueprint, so a blueprint cannot describe an edge into another agent's
//! graph. [`MatrixBlueprint::validate`] checks the remaining invariants before
//! a [`ReplicantMatrix`](crate::ReplicantMatrix) is allowed to go live.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::NodeType;

/// Construction parameters for one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Identifier, unique across all three node buffers.
    pub id: u32,
    /// Configured bias.
    #[serde(default)]
    pub bias: f32,
    /// Initial value.
    #[serde(default)]
    pub value: f32,
}

impl NodeSpec {
    /// Node with zero bias and zero value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            bias: 0.0,
            value: 0.0,
        }
    }
}

/// Construction parameters for one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionSpec {
    /// Identifier, unique within the blueprint.
    pub id: u32,
    /// Id of the source node.
    pub input: u32,
    /// Id of the target node.
    pub output: u32,
    /// Edge weight.
    pub weight: f32,
}

/// Reasons a blueprint cannot become a live matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("matrix has no input nodes")]
    NoInputs,
    #[error("matrix has no output nodes")]
    NoOutputs,
    #[error("matrix has no interactions; call allow_inert() to spawn an inert agent")]
    NoInteractions,
    #[error("node id {0} is used more than once")]
    DuplicateNodeId(u32),
    #[error("interaction id {0} is used more than once")]
    DuplicateInteractionId(u32),
    #[error("interaction {interaction} references unknown node {node}")]
    UnknownNode { interaction: u32, node: u32 },
    #[error("interaction {interaction} reads from {node_type:?} node {node}; only input nodes can be sources")]
    InvalidSource {
        interaction: u32,
        node: u32,
        node_type: NodeType,
    },
    #[error("interaction {interaction} writes to {node_type:?} node {node}; only output nodes can be targets")]
    InvalidTarget {
        interaction: u32,
        node: u32,
        node_type: NodeType,
    },
    #[error("weight range {0} is not finite")]
    InvalidWeightRange(f32),
}

/// The four buffers that make up one agent's graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixBlueprint {
    /// Sensor-fed nodes, in insertion order.
    pub inputs: Vec<NodeSpec>,
    /// Declared hidden nodes (may be empty).
    #[serde(default)]
    pub hidden: Vec<NodeSpec>,
    /// Control nodes, in insertion order.
    pub outputs: Vec<NodeSpec>,
    /// Edges, evaluated in this order.
    pub interactions: Vec<InteractionSpec>,
    /// Permit an empty interaction buffer.
    #[serde(default)]
    pub inert: bool,
}

impl MatrixBlueprint {
    /// Empty blueprint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input node with an initial sensor value.
    #[must_use]
    pub fn with_input(mut self, id: u32, value: f32) -> Self {
        self.inputs.push(NodeSpec {
            id,
            bias: 0.0,
            value,
        });
        self
    }

    /// Append a hidden node.
    #[must_use]
    pub fn with_hidden(mut self, id: u32, bias: f32) -> Self {
        self.hidden.push(NodeSpec {
            id,
            bias,
            value: 0.0,
        });
        self
    }

    /// Append an output node.
    #[must_use]
    pub fn with_output(mut self, id: u32, bias: f32) -> Self {
        self.outputs.push(NodeSpec {
            id,
            bias,
            value: 0.0,
        });
        self
    }

    /// Append an interaction from node `input` to node `output`.
    #[must_use]
    pub fn with_interaction(mut self, id: u32, input: u32, output: u32, weight: f32) -> Self {
        self.interactions.push(InteractionSpec {
            id,
            input,
            output,
            weight,
        });
        self
    }

    /// Allow this blueprint to spawn with no interactions.
    #[must_use]
    pub fn allow_inert(mut self) -> Self {
        self.inert = true;
        self
    }

    /// Connect every input to every output with random weights and output
    /// biases drawn from `[-weight_range, weight_range]`.
    ///
    /// Input ids are `1..=num_inputs`, output ids follow, and interaction ids
    /// count up from zero in input-major order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidWeightRange`] if `weight_range` is NaN or
    /// infinite.
    pub fn fully_connected<R: Rng>(
        num_inputs: usize,
        num_outputs: usize,
        weight_range: f32,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        if !weight_range.is_finite() {
            return Err(BuildError::InvalidWeightRange(weight_range));
        }
        let range = weight_range.abs();
        let mut blueprint = Self::new();

        for i in 0..num_inputs {
            blueprint.inputs.push(NodeSpec::new(i as u32 + 1));
        }
        let output_start = num_inputs as u32 + 1;
        for i in 0..num_outputs {
            blueprint.outputs.push(NodeSpec {
                id: output_start + i as u32,
                bias: rng.random_range(-range..=range),
                value: 0.0,
            });
        }

        let mut next_id = 0;
        for input in 0..num_inputs {
            for output in 0..num_outputs {
                let spec = InteractionSpec {
                    id: next_id,
                    input: blueprint.inputs[input].id,
                    output: blueprint.outputs[output].id,
                    weight: rng.random_range(-range..=range),
                };
                blueprint.interactions.push(spec);
                next_id += 1;
            }
        }

        Ok(blueprint)
    }

    /// Total number of declared nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inputs.len() + self.hidden.len() + self.outputs.len()
    }

    /// Role of every declared node keyed by id.
    pub(crate) fn roles(&self) -> Result<HashMap<u32, NodeType>, BuildError> {
        let mut roles = HashMap::with_capacity(self.node_count());
        let buffers = [
            (NodeType::Input, &self.inputs),
            (NodeType::Hidden, &self.hidden),
            (NodeType::Output, &self.outputs),
        ];
        for (node_type, specs) in buffers {
            for spec in specs {
                if roles.insert(spec.id, node_type).is_some() {
                    return Err(BuildError::DuplicateNodeId(spec.id));
                }
            }
        }
        Ok(roles)
    }

    /// Check every construction invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] found. Node buffers are checked before
    /// interactions, and interactions in order.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.inputs.is_empty() {
            return Err(BuildError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(BuildError::NoOutputs);
        }
        if self.interactions.is_empty() && !self.inert {
            return Err(BuildError::NoInteractions);
        }

        let roles = self.roles()?;
        let mut seen = HashSet::with_capacity(self.interactions.len());

        for edge in &self.interactions {
            if !seen.insert(edge.id) {
                return Err(BuildError::DuplicateInteractionId(edge.id));
            }

            let source = *roles.get(&edge.input).ok_or(BuildError::UnknownNode {
                interaction: edge.id,
                node: edge.input,
            })?;
            if !source.can_source() {
                return Err(BuildError::InvalidSource {
                    interaction: edge.id,
                    node: edge.input,
                    node_type: source,
                });
            }

            let target = *roles.get(&edge.output).ok_or(BuildError::UnknownNode {
                interaction: edge.id,
                node: edge.output,
            })?;
            if !target.can_target() {
                return Err(BuildError::InvalidTarget {
                    interaction: edge.id,
                    node: edge.output,
                    node_type: target,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn single_edge() -> MatrixBlueprint {
        MatrixBlueprint::new()
            .with_input(1, 2.0)
            .with_output(2, 3.0)
            .with_interaction(10, 1, 2, 1.5)
    }

    #[test]
    fn test_minimal_blueprint_is_valid() {
        assert_eq!(single_edge().validate(), Ok(()));
    }

    #[test]
    fn test_missing_buffers_rejected() {
        let no_inputs = MatrixBlueprint::new().with_output(2, 0.0);
        assert_eq!(no_inputs.validate(), Err(BuildError::NoInputs));

        let no_outputs = MatrixBlueprint::new().with_input(1, 0.0);
        assert_eq!(no_outputs.validate(), Err(BuildError::NoOutputs));

        let no_edges = MatrixBlueprint::new().with_input(1, 0.0).with_output(2, 0.0);
        assert_eq!(no_edges.validate(), Err(BuildError::NoInteractions));
        assert_eq!(no_edges.allow_inert().validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let dup_node = single_edge().with_hidden(2, 0.0);
        assert_eq!(dup_node.validate(), Err(BuildError::DuplicateNodeId(2)));

        let dup_edge = single_edge().with_interaction(10, 1, 2, 0.0);
        assert_eq!(dup_edge.validate(), Err(BuildError::DuplicateInteractionId(10)));
    }

    #[test]
    fn test_unknown_node_rejected() {
        let dangling = single_edge().with_interaction(11, 1, 99, 0.0);
        assert_eq!(
            dangling.validate(),
            Err(BuildError::UnknownNode {
                interaction: 11,
                node: 99
            })
        );
    }

    #[test]
    fn test_wrong_roles_rejected() {
        let from_output = single_edge()
            .with_output(3, 0.0)
            .with_interaction(11, 2, 3, 0.0);
        assert_eq!(
            from_output.validate(),
            Err(BuildError::InvalidSource {
                interaction: 11,
                node: 2,
                node_type: NodeType::Output
            })
        );

        let into_input = single_edge()
            .with_input(3, 0.0)
            .with_interaction(11, 1, 3, 0.0);
        assert_eq!(
            into_input.validate(),
            Err(BuildError::InvalidTarget {
                interaction: 11,
                node: 3,
                node_type: NodeType::Input
            })
        );

        let through_hidden = single_edge()
            .with_hidden(5, 0.0)
            .with_interaction(11, 1, 5, 0.0);
        assert!(matches!(
            through_hidden.validate(),
            Err(BuildError::InvalidTarget {
                node_type: NodeType::Hidden,
                ..
            })
        ));
    }

    #[test]
    fn test_declared_hidden_nodes_are_allowed() {
        let blueprint = single_edge().with_hidden(3, 0.5).with_hidden(4, -0.5);
        assert_eq!(blueprint.validate(), Ok(()));
        assert_eq!(blueprint.node_count(), 4);
    }

    #[test]
    fn test_fully_connected_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let blueprint = MatrixBlueprint::fully_connected(3, 2, 1.0, &mut rng).unwrap();

        assert_eq!(blueprint.inputs.len(), 3);
        assert_eq!(blueprint.outputs.len(), 2);
        assert!(blueprint.hidden.is_empty());
        assert_eq!(blueprint.interactions.len(), 6);
        assert_eq!(blueprint.validate(), Ok(()));

        for edge in &blueprint.interactions {
            assert!((-1.0..=1.0).contains(&edge.weight));
        }
        for output in &blueprint.outputs {
            assert!((-1.0..=1.0).contains(&output.bias));
        }
    }

    #[test]
    fn test_fully_connected_is_seed_deterministic() {
        let a = MatrixBlueprint::fully_connected(2, 2, 0.5, &mut ChaCha8Rng::seed_from_u64(7));
        let b = MatrixBlueprint::fully_connected(2, 2, 0.5, &mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_fully_connected_rejects_non_finite_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = MatrixBlueprint::fully_connected(2, 1, f32::NAN, &mut rng).unwrap_err();
        assert!(matches!(err, BuildError::InvalidWeightRange(r) if r.is_nan()));

        for range in [f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                MatrixBlueprint::fully_connected(2, 1, range, &mut rng),
                Err(BuildError::InvalidWeightRange(range))
            );
        }
    }

    #[test]
    fn test_fully_connected_accepts_zero_and_negative_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let zero = MatrixBlueprint::fully_connected(2, 1, 0.0, &mut rng).unwrap();
        assert!(zero.interactions.iter().all(|edge| edge.weight == 0.0));

        let negative = MatrixBlueprint::fully_connected(2, 1, -0.5, &mut rng).unwrap();
        assert!(negative
            .interactions
            .iter()
            .all(|edge| (-0.5..=0.5).contains(&edge.weight)));
    }

    #[test]
    fn test_error_display() {
        let msg = BuildError::NoInteractions.to_string();
        assert!(msg.contains("allow_inert"), "unexpected message: {msg}");

        let msg = BuildError::InvalidSource {
            interaction: 4,
            node: 9,
            node_type: NodeType::Output,
        }
        .to_string();
        assert!(msg.contains("Output"), "unexpected message: {msg}");
    }
}
