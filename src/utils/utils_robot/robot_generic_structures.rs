use nalgebra::DVector;
use serde::{Serialize, Deserialize};

/// A joint position vector stamped with the time (seconds from trajectory start) it is reached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimedJointState {
    joint_state: DVector<f64>,
    time: f64
}
impl TimedJointState {
    pub fn new(joint_state: DVector<f64>, time: f64) -> Self {
        Self {
            joint_state,
            time
        }
    }
    pub fn joint_state(&self) -> &DVector<f64> {
        &self.joint_state
    }
    pub fn time(&self) -> f64 {
        self.time
    }
}

/// Joint values by name, as they arrive from the host framework.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NamedJointState {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>
}
impl NamedJointState {
    pub fn new_positions_only(names: Vec<String>, positions: Vec<f64>) -> Self {
        Self {
            names,
            positions,
            velocities: vec![],
            accelerations: vec![]
        }
    }
}
