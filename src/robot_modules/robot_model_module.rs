use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::joint_index_map::JointIndexMap;
use crate::utils::utils_robot::planning_group::{PlanningGroup, PlanningGroupJoint};

/// The `RobotModelModule` holds the planning-level description of a robot: the ordered list of
/// full body joint names, the named planning groups over those joints, and the decomposition
/// tables that split a whole-body group into the subgroups that are planned one after another.
///
/// Joint order is the order of the columns of a full body trajectory.  The first
/// `root_joint_threshold` joints (see `PlanningParameters`) are expected to describe the
/// floating root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotModelModule {
    robot_name: String,
    joint_names: Vec<String>,
    joint_name_to_idx_hashmap: HashMap<String, usize>,
    planning_groups: HashMap<String, PlanningGroup>,
    group_decompositions: HashMap<String, Vec<String>>
}
impl RobotModelModule {
    pub fn new(robot_name: &str, joint_names: Vec<String>) -> Result<Self, OptimaError> {
        let mut joint_name_to_idx_hashmap = HashMap::new();
        for (i, n) in joint_names.iter().enumerate() {
            if joint_name_to_idx_hashmap.insert(n.clone(), i).is_some() {
                return Err(OptimaError::new_generic_error_str(&format!("joint name {:?} appears more than once in robot {:?}.", n, robot_name), file!(), line!()));
            }
        }

        Ok(Self {
            robot_name: robot_name.to_string(),
            joint_names,
            joint_name_to_idx_hashmap,
            planning_groups: HashMap::new(),
            group_decompositions: HashMap::new()
        })
    }
    /// Registers a planning group made of the given joints, in the given order.
    pub fn add_planning_group(&mut self, group_name: &str, joint_names: &Vec<&str>, num_contacts: usize) -> Result<(), OptimaError> {
        let mut group_joints = vec![];
        for joint_name in joint_names {
            let idx = self.get_joint_idx_from_name(joint_name).ok_or(OptimaError::new_invalid_group_error(group_name, &format!("joint {:?} is not a joint of robot {:?}.", joint_name, self.robot_name), file!(), line!()))?;
            group_joints.push(PlanningGroupJoint::new(joint_name, idx));
        }
        let group = PlanningGroup::new(group_name, group_joints, num_contacts);

        // Surfaces empty or duplicated joint lists at registration time.
        JointIndexMap::new(&group, self.num_joints())?;

        self.planning_groups.insert(group_name.to_string(), group);
        Ok(())
    }
    /// Declares that planning `group_name` means planning each of `subgroup_names` in sequence.
    pub fn add_group_decomposition(&mut self, group_name: &str, subgroup_names: &Vec<&str>) -> Result<(), OptimaError> {
        for s in subgroup_names {
            if !self.planning_groups.contains_key(*s) {
                return Err(OptimaError::new_invalid_group_error(s, &format!("unknown subgroup in decomposition of {:?}.", group_name), file!(), line!()));
            }
        }
        self.group_decompositions.insert(group_name.to_string(), subgroup_names.iter().map(|s| s.to_string()).collect());
        Ok(())
    }
    pub fn get_planning_group(&self, group_name: &str) -> Result<&PlanningGroup, OptimaError> {
        return match self.planning_groups.get(group_name) {
            None => { Err(OptimaError::new_invalid_group_error(group_name, &format!("robot {:?} has no such planning group.", self.robot_name), file!(), line!())) }
            Some(g) => { Ok(g) }
        }
    }
    /// The groups that are planned, in order, when `group_name` is requested.  A group without a
    /// decomposition entry is planned on its own.
    pub fn get_planning_group_sequence(&self, group_name: &str) -> Result<Vec<String>, OptimaError> {
        return match self.group_decompositions.get(group_name) {
            Some(subgroups) => { Ok(subgroups.clone()) }
            None => {
                self.get_planning_group(group_name)?;
                Ok(vec![group_name.to_string()])
            }
        }
    }
    pub fn get_joint_idx_from_name(&self, joint_name: &str) -> Option<usize> {
        self.joint_name_to_idx_hashmap.get(joint_name).cloned()
    }
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }
    pub fn joint_names(&self) -> &Vec<String> {
        &self.joint_names
    }
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_robot() -> RobotModelModule {
        let names = vec!["base_x", "base_y", "base_z", "base_rx", "base_ry", "base_rz", "l_arm", "r_arm"];
        let mut r = RobotModelModule::new("test_robot", names.iter().map(|s| s.to_string()).collect()).unwrap();
        r.add_planning_group("lower_body", &vec!["base_x", "base_y", "base_z", "base_rx", "base_ry", "base_rz"], 2).unwrap();
        r.add_planning_group("left_arm", &vec!["l_arm"], 0).unwrap();
        r.add_planning_group("right_arm", &vec!["r_arm"], 0).unwrap();
        r.add_group_decomposition("decomposed_body", &vec!["lower_body", "left_arm", "right_arm"]).unwrap();
        r
    }

    #[test]
    fn decomposition_expands_in_order() {
        let r = test_robot();
        assert_eq!(r.get_planning_group_sequence("decomposed_body").unwrap(), vec!["lower_body", "left_arm", "right_arm"]);
        assert_eq!(r.get_planning_group_sequence("left_arm").unwrap(), vec!["left_arm"]);
    }

    #[test]
    fn unknown_group_is_an_invalid_group_error() {
        let r = test_robot();
        assert!(matches!(r.get_planning_group_sequence("tail"), Err(OptimaError::InvalidGroupError(_))));
    }

    #[test]
    fn group_with_unknown_joint_is_rejected() {
        let mut r = test_robot();
        assert!(r.add_planning_group("bad", &vec!["l_arm", "nope"], 0).is_err());
        assert!(r.add_planning_group("dup", &vec!["l_arm", "l_arm"], 0).is_err());
    }
}
