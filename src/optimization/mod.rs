pub mod best_cost_manager;
pub mod improvement_delegate;
pub mod improvement_manager;
pub mod parallel_run_controller;
pub mod trajectory_cost;
pub mod trajectory_optimizer;
