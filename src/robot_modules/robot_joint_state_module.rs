use nalgebra::DVector;
use serde::{Serialize, Deserialize};
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::robot_generic_structures::NamedJointState;

/// Converts joint states given by name into full body vectors ordered like the columns of a
/// full body trajectory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotJointStateModule {
    robot_model_module: RobotModelModule
}
impl RobotJointStateModule {
    pub fn new(robot_model_module: RobotModelModule) -> Self {
        Self {
            robot_model_module
        }
    }
    /// Position, velocity, and acceleration vectors of a named start state.  Joints that are not
    /// named keep a value of zero; names that are not joints of the robot are skipped.
    pub fn convert_named_joint_state_to_full_state(&self, named_joint_state: &NamedJointState) -> Result<RobotFullJointState, OptimaError> {
        let n = named_joint_state.names.len();
        if named_joint_state.positions.len() != n {
            return Err(OptimaError::new_generic_error_str(&format!("joint state has {} names but {} positions.", n, named_joint_state.positions.len()), file!(), line!()));
        }

        let num_joints = self.robot_model_module.num_joints();
        let mut positions = DVector::zeros(num_joints);
        let mut velocities = DVector::zeros(num_joints);
        let mut accelerations = DVector::zeros(num_joints);

        for (i, name) in named_joint_state.names.iter().enumerate() {
            match self.robot_model_module.get_joint_idx_from_name(name) {
                None => {
                    optima_print(&format!("WARNING: joint {:?} is not part of robot {:?}; ignoring it.", name, self.robot_model_module.robot_name()), PrintMode::Println, PrintColor::Yellow, false, PrintVerbosity::Debug);
                }
                Some(idx) => {
                    positions[idx] = named_joint_state.positions[i];
                    if let Some(v) = named_joint_state.velocities.get(i) { velocities[idx] = *v; }
                    if let Some(a) = named_joint_state.accelerations.get(i) { accelerations[idx] = *a; }
                }
            }
        }

        Ok(RobotFullJointState {
            positions,
            velocities,
            accelerations
        })
    }
    /// Full body goal vector: `base_positions` overwritten by every joint named in `goal_state`.
    /// Unlike start states, an unknown joint name in a goal is an error.
    pub fn convert_goal_state_to_full_state(&self, goal_state: &NamedJointState, base_positions: &DVector<f64>) -> Result<DVector<f64>, OptimaError> {
        if goal_state.names.len() != goal_state.positions.len() {
            return Err(OptimaError::new_generic_error_str(&format!("invalid goal: {} names but {} positions.", goal_state.names.len(), goal_state.positions.len()), file!(), line!()));
        }
        if base_positions.len() != self.robot_model_module.num_joints() {
            return Err(OptimaError::new_generic_error_str("base positions do not cover every robot joint.", file!(), line!()));
        }

        let mut out = base_positions.clone();
        for (name, position) in goal_state.names.iter().zip(goal_state.positions.iter()) {
            let idx = self.robot_model_module.get_joint_idx_from_name(name).ok_or(OptimaError::new_generic_error_str(&format!("invalid goal: {:?} is not a joint of robot {:?}.", name, self.robot_model_module.robot_name()), file!(), line!()))?;
            out[idx] = *position;
        }
        Ok(out)
    }
    pub fn robot_model_module(&self) -> &RobotModelModule {
        &self.robot_model_module
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotFullJointState {
    positions: DVector<f64>,
    velocities: DVector<f64>,
    accelerations: DVector<f64>
}
impl RobotFullJointState {
    pub fn positions(&self) -> &DVector<f64> {
        &self.positions
    }
    pub fn velocities(&self) -> &DVector<f64> {
        &self.velocities
    }
    pub fn accelerations(&self) -> &DVector<f64> {
        &self.accelerations
    }
}
