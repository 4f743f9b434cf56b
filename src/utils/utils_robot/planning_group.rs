use serde::{Serialize, Deserialize};

/// One joint of a planning group, mapping its group-local position to the full-body joint index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningGroupJoint {
    joint_name: String,
    full_body_joint_idx: usize
}
impl PlanningGroupJoint {
    pub fn new(joint_name: &str, full_body_joint_idx: usize) -> Self {
        Self {
            joint_name: joint_name.to_string(),
            full_body_joint_idx
        }
    }
    pub fn joint_name(&self) -> &str {
        &self.joint_name
    }
    pub fn full_body_joint_idx(&self) -> usize {
        self.full_body_joint_idx
    }
}

/// A named, ordered subset of the robot's joints that is optimized together.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanningGroup {
    name: String,
    group_joints: Vec<PlanningGroupJoint>,
    num_contacts: usize
}
impl PlanningGroup {
    pub fn new(name: &str, group_joints: Vec<PlanningGroupJoint>, num_contacts: usize) -> Self {
        Self {
            name: name.to_string(),
            group_joints,
            num_contacts
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn group_joints(&self) -> &Vec<PlanningGroupJoint> {
        &self.group_joints
    }
    pub fn num_joints(&self) -> usize {
        self.group_joints.len()
    }
    pub fn num_contacts(&self) -> usize {
        self.num_contacts
    }
    pub fn full_body_joint_idxs(&self) -> Vec<usize> {
        self.group_joints.iter().map(|j| j.full_body_joint_idx()).collect()
    }
}
