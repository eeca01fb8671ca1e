use glam::DVec3;

use crate::util::fallback_direction;

use super::octree::OctNode;

const COINCIDENT_DISTANCE_SQ: f64 = 1e-18;

#[derive(Clone, Copy, Debug)]
pub struct RepulsionParams {
    /// Repulsion constant `R`.
    pub strength: f64,
    /// Softening term added to the squared distance.
    pub epsilon: f64,
}

/// Pairwise repulsion pass. Implementations add `R / (d^2 + eps)` along the separating
/// direction to each node's accumulator, equal and opposite per pair.
pub trait RepulsionSolver {
    fn accumulate(&self, positions: &[DVec3], params: RepulsionParams, forces: &mut [DVec3]);
}

fn repulsion_between(
    point_a: DVec3,
    point_b: DVec3,
    index_a: usize,
    index_b: usize,
    params: RepulsionParams,
) -> DVec3 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_squared();
    let direction = if distance_sq > COINCIDENT_DISTANCE_SQ {
        delta / distance_sq.sqrt()
    } else {
        fallback_direction(index_a.min(index_b), index_a.max(index_b))
            * if index_a < index_b { 1.0 } else { -1.0 }
    };
    direction * (params.strength / (distance_sq + params.epsilon))
}

/// Exact O(n^2) pass over every unordered pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairwiseRepulsion;

impl RepulsionSolver for PairwiseRepulsion {
    fn accumulate(&self, positions: &[DVec3], params: RepulsionParams, forces: &mut [DVec3]) {
        let node_count = positions.len().min(forces.len());
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let force = repulsion_between(positions[i], positions[j], i, j, params);
                forces[i] += force;
                forces[j] -= force;
            }
        }
    }
}

/// Barnes-Hut approximation over an octree: cells that look small from a node (side / distance
/// below `theta`) act as a single mass at their center.
#[derive(Clone, Copy, Debug)]
pub struct BarnesHutRepulsion {
    pub theta: f64,
}

impl Default for BarnesHutRepulsion {
    fn default() -> Self {
        Self { theta: 0.72 }
    }
}

impl RepulsionSolver for BarnesHutRepulsion {
    fn accumulate(&self, positions: &[DVec3], params: RepulsionParams, forces: &mut [DVec3]) {
        let Some(octree) = OctNode::build(positions) else {
            return;
        };

        for (index, force) in forces.iter_mut().enumerate().take(positions.len()) {
            accumulate_repulsion_for_node(&octree, index, positions, params, self.theta, force);
        }
    }
}

fn accumulate_repulsion_for_node(
    node: &OctNode,
    index: usize,
    positions: &[DVec3],
    params: RepulsionParams,
    theta: f64,
    force: &mut DVec3,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *force += repulsion_between(point, positions[other_index], index, other_index, params);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_squared().max(COINCIDENT_DISTANCE_SQ);
    let distance = distance_sq.sqrt();
    let can_approximate = !node.bounds.contains(point)
        && ((node.bounds.side_length() / distance) < theta)
        && node.mass > 1.0;

    if can_approximate {
        let direction = delta / distance;
        let scaled = (params.strength * node.mass) / (distance_sq + params.epsilon);
        *force += direction * scaled;
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, params, theta, force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: RepulsionParams = RepulsionParams {
        strength: 100.0,
        epsilon: 0.01,
    };

    #[test]
    fn pair_forces_are_equal_and_opposite() {
        let positions = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)];
        let mut forces = [DVec3::ZERO; 2];
        PairwiseRepulsion.accumulate(&positions, PARAMS, &mut forces);

        let expected = 100.0 / (4.0 + 0.01);
        assert!((forces[0].x + expected).abs() < 1e-12);
        assert!((forces[1].x - expected).abs() < 1e-12);
        assert_eq!(forces[0] + forces[1], DVec3::ZERO);
    }

    #[test]
    fn coincident_nodes_are_pushed_apart_with_finite_force() {
        let positions = [DVec3::ONE, DVec3::ONE];
        let mut forces = [DVec3::ZERO; 2];
        PairwiseRepulsion.accumulate(&positions, PARAMS, &mut forces);

        assert!(forces.iter().all(|force| force.is_finite()));
        assert!(forces[0].length() > 0.0);
        assert!((forces[0] + forces[1]).length() < 1e-9);
        assert!((forces[0].length() - 100.0 / 0.01).abs() < 1e-6);
    }

    #[test]
    fn barnes_hut_matches_pairwise_for_small_sets() {
        let positions = (0..10)
            .map(|index| DVec3::new(index as f64, (index * 2 % 5) as f64, (index % 3) as f64))
            .collect::<Vec<_>>();
        let mut exact = vec![DVec3::ZERO; positions.len()];
        let mut approx = vec![DVec3::ZERO; positions.len()];

        PairwiseRepulsion.accumulate(&positions, PARAMS, &mut exact);
        BarnesHutRepulsion::default().accumulate(&positions, PARAMS, &mut approx);

        // Ten points fit in a single leaf, so the tree walk is exact.
        for (a, b) in exact.iter().zip(&approx) {
            assert!((*a - *b).length() < 1e-9, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn barnes_hut_stays_close_to_pairwise_for_larger_sets() {
        let positions = (0..300)
            .map(|index| {
                let t = index as f64 * 0.61;
                DVec3::new(t.sin() * 40.0, t.cos() * 40.0, (t * 1.7).sin() * 40.0)
            })
            .collect::<Vec<_>>();
        let mut exact = vec![DVec3::ZERO; positions.len()];
        let mut approx = vec![DVec3::ZERO; positions.len()];

        PairwiseRepulsion.accumulate(&positions, PARAMS, &mut exact);
        BarnesHutRepulsion { theta: 0.35 }.accumulate(&positions, PARAMS, &mut approx);

        let error = exact
            .iter()
            .zip(&approx)
            .map(|(a, b)| (*a - *b).length())
            .sum::<f64>();
        let total = exact.iter().map(|force| force.length()).sum::<f64>();
        assert!(error / total < 0.1, "relative error {}", error / total);
        assert!(approx.iter().all(|force| force.is_finite()));
    }
}
