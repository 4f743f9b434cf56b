use serde::{Serialize, Deserialize};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::planning_group::PlanningGroup;

/// Group-local joint index -> full-body joint index table, validated against the number of
/// full-body joints when it is built.  Every group-local joint maps to exactly one
/// full-body joint and no full-body joint is used twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointIndexMap {
    group_name: String,
    group_to_full: Vec<usize>,
    full_to_group: Vec<Option<usize>>
}
impl JointIndexMap {
    pub fn new(group: &PlanningGroup, num_full_body_joints: usize) -> Result<Self, OptimaError> {
        if group.num_joints() == 0 {
            return Err(OptimaError::new_invalid_group_error(group.name(), "group has no joints.", file!(), line!()));
        }

        let mut group_to_full = vec![];
        let mut full_to_group = vec![None; num_full_body_joints];

        for (group_idx, joint) in group.group_joints().iter().enumerate() {
            let full_idx = joint.full_body_joint_idx();
            if full_idx >= num_full_body_joints {
                return Err(OptimaError::new_invalid_group_error(group.name(), &format!("joint {:?} refers to full body joint {} but the trajectory only has {} joints.", joint.joint_name(), full_idx, num_full_body_joints), file!(), line!()));
            }
            if full_to_group[full_idx].is_some() {
                return Err(OptimaError::new_invalid_group_error(group.name(), &format!("full body joint {} appears more than once.", full_idx), file!(), line!()));
            }
            full_to_group[full_idx] = Some(group_idx);
            group_to_full.push(full_idx);
        }

        Ok(Self {
            group_name: group.name().to_string(),
            group_to_full,
            full_to_group
        })
    }
    #[inline]
    pub fn full_idx(&self, group_idx: usize) -> usize {
        self.group_to_full[group_idx]
    }
    #[inline]
    pub fn group_idx(&self, full_idx: usize) -> Option<usize> {
        match self.full_to_group.get(full_idx) {
            None => { None }
            Some(g) => { *g }
        }
    }
    pub fn num_group_joints(&self) -> usize {
        self.group_to_full.len()
    }
    pub fn num_full_body_joints(&self) -> usize {
        self.full_to_group.len()
    }
    pub fn group_to_full(&self) -> &Vec<usize> {
        &self.group_to_full
    }
    pub fn group_name(&self) -> &str {
        &self.group_name
    }
}
