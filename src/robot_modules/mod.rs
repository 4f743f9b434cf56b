pub mod robot_model_module;
pub mod robot_joint_state_module;
