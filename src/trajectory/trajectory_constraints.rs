use nalgebra::{UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointConstraint {
    joint_name: String,
    position: f64
}
impl JointConstraint {
    pub fn new(joint_name: &str, position: f64) -> Self {
        Self {
            joint_name: joint_name.to_string(),
            position
        }
    }
    pub fn joint_name(&self) -> &str {
        &self.joint_name
    }
    pub fn position(&self) -> f64 {
        self.position
    }
}

/// One waypoint of a seed path.  A set named with a candidate index (`"0"`, `"1"`, ...) opens
/// the waypoint run for that candidate; a set named `"end"` closes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaypointConstraintSet {
    name: String,
    joint_constraints: Vec<JointConstraint>
}
impl WaypointConstraintSet {
    pub fn new(name: &str, joint_constraints: Vec<JointConstraint>) -> Self {
        Self {
            name: name.to_string(),
            joint_constraints
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn joint_constraints(&self) -> &Vec<JointConstraint> {
        &self.joint_constraints
    }
    pub fn position_of(&self, joint_name: &str) -> Option<f64> {
        self.joint_constraints.iter().find(|c| c.joint_name() == joint_name).map(|c| c.position())
    }
}

/// Straight-line end effector path at a fixed orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartesianPathConstraint {
    start_position: Vector3<f64>,
    goal_position: Vector3<f64>,
    orientation: UnitQuaternion<f64>
}
impl CartesianPathConstraint {
    pub fn new(start_position: Vector3<f64>, goal_position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            start_position,
            goal_position,
            orientation
        }
    }
    pub fn start_position(&self) -> &Vector3<f64> {
        &self.start_position
    }
    pub fn goal_position(&self) -> &Vector3<f64> {
        &self.goal_position
    }
    pub fn orientation(&self) -> &UnitQuaternion<f64> {
        &self.orientation
    }
}

/// Everything that constrains how the candidates of one planning attempt are seeded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptConstraints {
    waypoint_constraints: Vec<WaypointConstraintSet>,
    cartesian_path: Option<CartesianPathConstraint>
}
impl AttemptConstraints {
    pub fn new(waypoint_constraints: Vec<WaypointConstraintSet>, cartesian_path: Option<CartesianPathConstraint>) -> Self {
        Self {
            waypoint_constraints,
            cartesian_path
        }
    }
    pub fn waypoint_constraints(&self) -> &Vec<WaypointConstraintSet> {
        &self.waypoint_constraints
    }
    pub fn cartesian_path(&self) -> Option<&CartesianPathConstraint> {
        self.cartesian_path.as_ref()
    }
    /// The half-open range of waypoint sets belonging to `candidate_idx`.  It starts at the set
    /// named with the candidate index (or at the first set) and runs through the next set named
    /// `"end"` (or to the last set).  `None` when there are no waypoint sets at all.
    pub fn waypoint_range_for_candidate(&self, candidate_idx: usize) -> Option<(usize, usize)> {
        if self.waypoint_constraints.is_empty() { return None; }

        let candidate_name = candidate_idx.to_string();
        let begin = self.waypoint_constraints.iter().position(|w| w.name() == candidate_name).unwrap_or(0);
        let end = match self.waypoint_constraints[begin..].iter().position(|w| w.name() == "end") {
            None => { self.waypoint_constraints.len() }
            Some(offset) => { begin + offset + 1 }
        };

        Some((begin, end))
    }
}
