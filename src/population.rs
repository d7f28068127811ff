//! Dense storage for many agents' matrices and the per-tick parallel step.
//!
//! Each agent owns its [`ReplicantMatrix`] outright. A step hands every matrix
//! to the rayon pool as one unit of work, so no locking is needed: the only
//! mutable reference to a matrix during a step is the one its worker holds.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace, warn};

use crate::blueprint::{BuildError, MatrixBlueprint};
use crate::config::EngineConfig;
use crate::evaluator::ForwardEvaluator;
use crate::matrix::{ReplicantMatrix, SensorError};

new_key_type! {
    /// Stable handle for an agent backed by a generational slot map.
    pub struct AgentId;
}

/// Monotonic simulation tick counter.
pub type Tick = u64;

/// Summary of one [`Population::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Tick number of the completed step, starting at 1.
    pub tick: Tick,
    /// Agents evaluated.
    pub agents: usize,
    /// Interactions applied across all agents.
    pub interactions: usize,
}

/// Errors addressed to a specific agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("agent {0:?} is not alive")]
    UnknownAgent(AgentId),
    #[error(transparent)]
    Sensor(#[from] SensorError),
}

/// All live agents' matrices with generational handles.
#[derive(Debug, Default)]
pub struct Population {
    slots: SlotMap<AgentId, usize>,
    handles: Vec<AgentId>,
    matrices: Vec<ReplicantMatrix>,
    evaluator: ForwardEvaluator,
    tick: Tick,
}

impl Population {
    /// Create an empty population that evaluates with `config`.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            slots: SlotMap::with_key(),
            handles: Vec::new(),
            matrices: Vec::new(),
            evaluator: ForwardEvaluator::new(config),
            tick: 0,
        }
    }

    /// Create an empty population with reserved capacity.
    #[must_use]
    pub fn with_capacity(config: EngineConfig, capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            handles: Vec::with_capacity(capacity),
            matrices: Vec::with_capacity(capacity),
            evaluator: ForwardEvaluator::new(config),
            tick: 0,
        }
    }

    /// Number of live agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Returns true when no agents are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Returns true if `id` refers to a live agent.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.slots.contains_key(id)
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// The evaluation policy used by [`step`](Self::step).
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        self.evaluator.config()
    }

    /// Validate `blueprint` and spawn a new agent from it.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`] from validation; no agent is created.
    pub fn spawn(&mut self, blueprint: &MatrixBlueprint) -> Result<AgentId, BuildError> {
        match ReplicantMatrix::from_blueprint(blueprint) {
            Ok(matrix) => Ok(self.spawn_matrix(matrix)),
            Err(err) => {
                warn!(%err, "rejected matrix blueprint");
                Err(err)
            }
        }
    }

    /// Spawn a new agent from an already built matrix.
    pub fn spawn_matrix(&mut self, matrix: ReplicantMatrix) -> AgentId {
        let index = self.matrices.len();
        debug!(
            inputs = matrix.num_inputs(),
            outputs = matrix.num_outputs(),
            interactions = matrix.interactions().len(),
            "spawning agent"
        );
        self.matrices.push(matrix);
        let id = self.slots.insert(index);
        self.handles.push(id);
        id
    }

    /// Remove `id`, returning its matrix if it was alive.
    pub fn despawn(&mut self, id: AgentId) -> Option<ReplicantMatrix> {
        let index = self.slots.remove(id)?;
        let removed = self.matrices.swap_remove(index);
        let removed_handle = self.handles.swap_remove(index);
        debug_assert_eq!(removed_handle, id);
        if index < self.handles.len() {
            let moved = self.handles[index];
            if let Some(slot) = self.slots.get_mut(moved) {
                *slot = index;
            }
        }
        debug!(?id, "despawned agent");
        Some(removed)
    }

    /// Borrow an agent's matrix.
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&ReplicantMatrix> {
        self.slots.get(id).map(|&index| &self.matrices[index])
    }

    /// Iterate over live agents in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &ReplicantMatrix)> + '_ {
        self.handles.iter().copied().zip(self.matrices.iter())
    }

    /// Write a sensor frame into an agent's inputs.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAgent`] for a dead handle and
    /// [`AgentError::Sensor`] if the frame length is wrong.
    pub fn write_inputs(&mut self, id: AgentId, values: &[f32]) -> Result<(), AgentError> {
        let index = *self.slots.get(id).ok_or(AgentError::UnknownAgent(id))?;
        self.matrices[index].write_inputs(values)?;
        Ok(())
    }

    /// Current output values of an agent.
    #[must_use]
    pub fn outputs(&self, id: AgentId) -> Option<Vec<f32>> {
        self.get(id).map(ReplicantMatrix::output_values)
    }

    /// Evaluate every live agent once.
    ///
    /// Agents are independent, so each matrix is one rayon task. Populations
    /// below [`EngineConfig::parallel_threshold`] run on the calling thread.
    pub fn step(&mut self) -> StepSummary {
        let evaluator = &self.evaluator;
        let interactions: usize = if self.matrices.len() < evaluator.config().parallel_threshold {
            self.matrices
                .iter_mut()
                .map(|matrix| evaluator.evaluate(matrix))
                .sum()
        } else {
            self.matrices
                .par_iter_mut()
                .map(|matrix| evaluator.evaluate(matrix))
                .sum()
        };

        self.tick += 1;
        let summary = StepSummary {
            tick: self.tick,
            agents: self.matrices.len(),
            interactions,
        };
        trace!(
            tick = summary.tick,
            agents = summary.agents,
            interactions = summary.interactions,
            "population step"
        );
        summary
    }
}
