//! Host-provided capabilities the planner calls into.  Implementations must be shareable across
//! the candidate threads of an attempt.
//!
//! Joint states passed to these traits are group-local: ordered like the columns of the
//! restricted trajectory of the planning group being optimized.

use nalgebra::{DVector, Isometry3};
use crate::trajectory::trajectory_constraints::WaypointConstraintSet;

pub trait InverseKinematicsSolver: Send + Sync {
    /// A joint configuration reaching `target_pose`, searched from `seed_state`, or `None`.
    fn solve_ik(&self, target_pose: &Isometry3<f64>, seed_state: &DVector<f64>) -> Option<DVector<f64>>;
}

pub trait CollisionChecker: Send + Sync {
    fn is_colliding(&self, joint_state: &DVector<f64>) -> bool;
}

/// Source of roadmap-based seed paths.  The returned sets follow the naming convention of
/// `WaypointConstraintSet` so that each candidate can pick up its own path.  Start and goal
/// states are full body vectors.
pub trait RoadmapSeedProvider: Send + Sync {
    fn get_seed_trajectories(&self, start_state: &DVector<f64>, goal_states: &Vec<DVector<f64>>) -> Vec<WaypointConstraintSet>;
}
