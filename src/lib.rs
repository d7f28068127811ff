//! # Replicant Matrix
//!
//! A small per-agent computation graph for real-time simulation hosts. Every
//! agent carries a matrix of input, hidden and output nodes connected by
//! weighted interactions; each tick the host writes sensor values into the
//! inputs, runs one forward pass, and reads control values (thrust, steering)
//! from the outputs.
//!
//! ## Features
//!
//! - **Validated spawning**: a [`MatrixBlueprint`] is checked before an agent
//!   goes live, so edges always stay inside their own agent and run from an
//!   input to an output
//! - **Arena-Graph Model**: `SlotMap` storage for nodes, with interactions
//!   holding keys minted by the owning matrix
//! - **Explicit bias policy**: static biases by default, or the legacy
//!   bias-as-accumulator behaviour via [`BiasMode::Carry`]
//! - **Parallel ticks**: [`Population::step`] hands each agent's matrix to
//!   rayon as one unit of work
//!
//! ## Quick Start
//!
//! ```rust
//! use replicant_matrix::{EngineConfig, MatrixBlueprint, Population};
//!
//! let blueprint = MatrixBlueprint::new()
//!     .with_input(1, 0.0)
//!     .with_output(2, 3.0)
//!     .with_interaction(0, 1, 2, 1.5);
//!
//! let mut population = Population::new(EngineConfig::default());
//! let agent = population.spawn(&blueprint).unwrap();
//!
//! population.write_inputs(agent, &[2.0]).unwrap();
//! population.step();
//! assert_eq!(population.outputs(agent), Some(vec![7.5]));
//! ```
//!
//! ## Evaluation
//!
//! For each interaction in order, the target output becomes
//! `activation(input.value * bias + weight)`. With the default
//! [`Activation::Identity`] the raw linear combination is kept. Hidden nodes
//! may be declared but are not wired into the pass.

pub mod activation;
pub mod blueprint;
pub mod config;
pub mod evaluator;
pub mod matrix;
pub mod node;
pub mod population;

// Re-exports for convenience
pub use activation::{forward_sigmoid, normalize, relu, sigmoid, Activation};
pub use blueprint::{BuildError, InteractionSpec, MatrixBlueprint, NodeSpec};
pub use config::{BiasMode, EngineConfig};
pub use evaluator::{forward_sum, ForwardEvaluator};
pub use matrix::{ReplicantMatrix, SensorError};
pub use node::{Interaction, Node, NodeKey, NodeType};
pub use population::{AgentError, AgentId, Population, StepSummary, Tick};
