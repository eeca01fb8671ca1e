mod forces;
mod octree;

use std::time::{Duration, Instant};

use glam::DVec3;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::error::GraphError;
use crate::graph::Graph;

pub use forces::{BarnesHutRepulsion, PairwiseRepulsion, RepulsionParams, RepulsionSolver};

const DEFAULT_THETA: f64 = 0.72;

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RepulsionSolverKind {
    #[default]
    Pairwise,
    BarnesHut {
        #[serde(default = "default_theta")]
        theta: f64,
    },
}

fn default_theta() -> f64 {
    DEFAULT_THETA
}

/// Simulation constants. The defaults give a readable layout for a few hundred nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Fixed iteration count `T`.
    pub iterations: usize,
    /// Repulsion constant `R`.
    pub repulsion: f64,
    /// Attraction coefficient `k`.
    pub attraction: f64,
    /// Velocity damping, strictly between 0 and 1.
    pub damping: f64,
    /// Softening term in `R / (d^2 + epsilon)`.
    pub epsilon: f64,
    pub repulsion_solver: RepulsionSolverKind,
    /// Wall-clock cap on the loop; `None` always runs every iteration.
    #[serde(rename = "time_budget_ms", deserialize_with = "deserialize_millis")]
    pub time_budget: Option<Duration>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 150,
            repulsion: 100.0,
            attraction: 0.015,
            damping: 0.85,
            epsilon: 0.01,
            repulsion_solver: RepulsionSolverKind::Pairwise,
            time_budget: None,
        }
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = Option::<u64>::deserialize(deserializer)?;
    Ok(millis.map(Duration::from_millis))
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        let non_negative = [("repulsion", self.repulsion), ("attraction", self.attraction)];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(GraphError::InvalidConfig(format!(
                "damping must lie strictly between 0 and 1, got {}",
                self.damping
            )));
        }

        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(GraphError::InvalidConfig(format!(
                "epsilon must be a finite positive number, got {}",
                self.epsilon
            )));
        }

        if let RepulsionSolverKind::BarnesHut { theta } = self.repulsion_solver
            && (!theta.is_finite() || theta <= 0.0)
        {
            return Err(GraphError::InvalidConfig(format!(
                "barnes-hut theta must be a finite positive number, got {theta}"
            )));
        }

        Ok(())
    }

    pub fn solver(&self) -> Box<dyn RepulsionSolver> {
        match self.repulsion_solver {
            RepulsionSolverKind::Pairwise => Box::new(PairwiseRepulsion),
            RepulsionSolverKind::BarnesHut { theta } => Box::new(BarnesHutRepulsion { theta }),
        }
    }

    fn repulsion_params(&self) -> RepulsionParams {
        RepulsionParams {
            strength: self.repulsion,
            epsilon: self.epsilon,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutReport {
    pub iterations_run: usize,
    /// The time budget ran out before `iterations` completed.
    pub budget_exhausted: bool,
    pub elapsed: Duration,
    pub mean_edge_length: Option<f64>,
}

/// Runs the layout with the solver named in `config`.
pub fn layout(graph: &mut Graph, config: &LayoutConfig) -> LayoutReport {
    let solver = config.solver();
    layout_with(graph, config, solver.as_ref())
}

/// Runs the layout with an explicit repulsion pass. Fewer than two nodes is a no-op.
pub fn layout_with(
    graph: &mut Graph,
    config: &LayoutConfig,
    solver: &dyn RepulsionSolver,
) -> LayoutReport {
    let started = Instant::now();
    let node_count = graph.node_count();
    if node_count < 2 {
        return LayoutReport {
            iterations_run: 0,
            budget_exhausted: false,
            elapsed: started.elapsed(),
            mean_edge_length: mean_edge_length(graph),
        };
    }

    let mut scratch = LayoutScratch::new(graph);
    let params = config.repulsion_params();
    let mut iterations_run = 0;
    let mut budget_exhausted = false;

    for _ in 0..config.iterations {
        if let Some(budget) = config.time_budget
            && started.elapsed() >= budget
        {
            budget_exhausted = true;
            break;
        }

        scratch.step(config, params, solver);
        iterations_run += 1;
    }

    if scratch.rejected_steps > 0 {
        warn!(
            rejected = scratch.rejected_steps,
            "kept previous positions for non-finite integration steps"
        );
    }

    for (node, position) in graph.nodes_mut().iter_mut().zip(&scratch.positions) {
        node.position = *position;
    }

    let report = LayoutReport {
        iterations_run,
        budget_exhausted,
        elapsed: started.elapsed(),
        mean_edge_length: mean_edge_length(graph),
    };
    info!(
        nodes = node_count,
        springs = scratch.springs.len(),
        iterations = report.iterations_run,
        budget_exhausted = report.budget_exhausted,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "layout finished"
    );
    report
}

/// Average length over edges whose endpoints both exist; `None` when there are none.
pub fn mean_edge_length(graph: &Graph) -> Option<f64> {
    let nodes = graph.nodes();
    let springs = graph.resolved_edges();
    if springs.is_empty() {
        return None;
    }

    let total = springs
        .iter()
        .map(|&(from, to, _)| nodes[from].position.distance(nodes[to].position))
        .sum::<f64>();
    Some(total / springs.len() as f64)
}

struct LayoutScratch {
    positions: Vec<DVec3>,
    velocities: Vec<DVec3>,
    forces: Vec<DVec3>,
    springs: Vec<(usize, usize, f64)>,
    rejected_steps: usize,
}

impl LayoutScratch {
    fn new(graph: &Graph) -> Self {
        let node_count = graph.node_count();
        let springs = graph
            .resolved_edges()
            .into_iter()
            .filter(|&(from, to, _)| from != to)
            .collect::<Vec<_>>();
        debug!(nodes = node_count, springs = springs.len(), "prepared layout");

        Self {
            positions: graph.positions(),
            velocities: vec![DVec3::ZERO; node_count],
            forces: vec![DVec3::ZERO; node_count],
            springs,
            rejected_steps: 0,
        }
    }

    fn step(
        &mut self,
        config: &LayoutConfig,
        params: RepulsionParams,
        solver: &dyn RepulsionSolver,
    ) {
        self.forces.fill(DVec3::ZERO);
        solver.accumulate(&self.positions, params, &mut self.forces);

        for &(from, to, strength) in &self.springs {
            let pull = (self.positions[to] - self.positions[from]) * (config.attraction * strength);
            self.forces[from] += pull;
            self.forces[to] -= pull;
        }

        for ((position, velocity), force) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(&self.forces)
        {
            let next_velocity = (*velocity + *force) * config.damping;
            let next_position = *position + next_velocity;
            if next_velocity.is_finite() && next_position.is_finite() {
                *velocity = next_velocity;
                *position = next_position;
            } else {
                *velocity = DVec3::ZERO;
                self.rejected_steps += 1;
            }
        }
    }
}
