pub mod joint_index_map;
pub mod planning_group;
pub mod robot_generic_structures;
