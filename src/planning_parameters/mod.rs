//! Tunable planner parameters.
//!
//! Parameters may be changed between planning calls through a [`PlanningParametersRegistry`],
//! but every planning attempt works from one immutable [`PlanningParametersSnapshot`] taken when
//! the attempt starts.  Each update of the registry bumps its version, which is what the
//! improvement managers compare against to detect a new parameter generation.

use std::sync::{Arc, RwLock};
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::PrintVerbosity;
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_traits::{load_object_from_json_string, SaveAndLoadable, ToAndFromRonString, ToAndFromTomlString};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningParameters {
    pub trajectory_duration: f64,
    pub trajectory_discretization: f64,
    pub phase_duration: f64,
    pub num_contacts: usize,
    pub contact_variable_initial_values: Vec<f64>,
    pub contact_variable_goal_values: Vec<f64>,
    /// Population size: number of candidate trajectories optimized in parallel per attempt.
    pub num_trajectories: usize,
    pub num_trials: usize,
    pub max_iterations: usize,
    /// Threads available to the cost evaluation of a single candidate.
    pub num_parallel_threads: usize,
    /// Number of samples of the finite difference rule used by the cost terms.
    pub diff_rule_length: usize,
    /// Joints with a full body index below this value belong to the floating root and are
    /// extrapolated from the start velocity/acceleration.
    pub root_joint_threshold: usize,
    pub has_root_6d: bool,
    pub yaw_joint_index: usize,
    pub max_ik_attempts: usize,
    pub seed_perturbation_std: f64,
    pub random_seed: Option<u64>,
    pub terminate_on_first_convergence: bool,
    pub convergence_cost_threshold: f64,
    pub max_stall_iterations: usize,
    pub min_cost_improvement: f64,
    pub smoothness_cost_weight: f64,
    pub collision_cost_weight: f64,
    pub gradient_step_size: f64,
    pub exploration_noise_std: f64,
    pub print_planning_info: bool,
    pub print_verbosity: PrintVerbosity
}
impl PlanningParameters {
    pub fn validate(&self) -> Result<(), OptimaError> {
        if self.num_trajectories == 0 {
            return Err(OptimaError::new_generic_error_str("num_trajectories must be at least 1.", file!(), line!()));
        }
        if self.num_trials == 0 {
            return Err(OptimaError::new_generic_error_str("num_trials must be at least 1.", file!(), line!()));
        }
        if self.max_iterations == 0 {
            return Err(OptimaError::new_generic_error_str("max_iterations must be at least 1.", file!(), line!()));
        }
        if self.num_parallel_threads == 0 {
            return Err(OptimaError::new_generic_error_str("num_parallel_threads must be at least 1.", file!(), line!()));
        }
        if self.diff_rule_length < 3 || self.diff_rule_length % 2 == 0 {
            return Err(OptimaError::new_generic_error_str(&format!("diff_rule_length must be odd and at least 3 (got {}).", self.diff_rule_length), file!(), line!()));
        }
        if self.contact_variable_initial_values.len() < self.num_contacts || self.contact_variable_goal_values.len() < self.num_contacts {
            return Err(OptimaError::new_generic_error_str(&format!("need {} initial and goal contact values.", self.num_contacts), file!(), line!()));
        }
        Ok(())
    }
}
impl Default for PlanningParameters {
    fn default() -> Self {
        Self {
            trajectory_duration: 2.0,
            trajectory_discretization: 0.1,
            phase_duration: 0.5,
            num_contacts: 0,
            contact_variable_initial_values: vec![],
            contact_variable_goal_values: vec![],
            num_trajectories: 4,
            num_trials: 1,
            max_iterations: 100,
            num_parallel_threads: 1,
            diff_rule_length: 7,
            root_joint_threshold: 6,
            has_root_6d: false,
            yaw_joint_index: 5,
            max_ik_attempts: 100,
            seed_perturbation_std: 0.0,
            random_seed: None,
            terminate_on_first_convergence: false,
            convergence_cost_threshold: 1e-6,
            max_stall_iterations: 10,
            min_cost_improvement: 1e-9,
            smoothness_cost_weight: 1.0,
            collision_cost_weight: 100.0,
            gradient_step_size: 1e-3,
            exploration_noise_std: 0.0,
            print_planning_info: false,
            print_verbosity: PrintVerbosity::Info
        }
    }
}
impl SaveAndLoadable for PlanningParameters {
    type SaveType = PlanningParameters;

    fn get_save_serialization_object(&self) -> Self::SaveType {
        self.clone()
    }

    fn load_from_json_string(json_str: &str) -> Result<Self, OptimaError> where Self: Sized {
        let load: PlanningParameters = load_object_from_json_string(json_str)?;
        load.validate()?;
        Ok(load)
    }
}
impl PlanningParameters {
    pub fn load_from_ron(ron_str: &str) -> Result<Self, OptimaError> {
        let load = Self::load_from_ron_string(ron_str)?;
        load.validate()?;
        Ok(load)
    }
    pub fn load_from_toml(toml_str: &str) -> Result<Self, OptimaError> {
        let load = Self::load_from_toml_string(toml_str)?;
        load.validate()?;
        Ok(load)
    }
}

/// Immutable view of the parameters taken at the start of a planning attempt.
#[derive(Clone, Debug)]
pub struct PlanningParametersSnapshot {
    version: u64,
    parameters: Arc<PlanningParameters>
}
impl PlanningParametersSnapshot {
    pub fn new(version: u64, parameters: PlanningParameters) -> Self {
        Self {
            version,
            parameters: Arc::new(parameters)
        }
    }
    pub fn version(&self) -> u64 {
        self.version
    }
    pub fn parameters(&self) -> &PlanningParameters {
        &self.parameters
    }
}

/// Owner of the current parameter generation.  Share it behind an `Arc` to let several
/// planners pick up the same updates.
#[derive(Debug)]
pub struct PlanningParametersRegistry {
    current: RwLock<PlanningParametersSnapshot>
}
impl PlanningParametersRegistry {
    pub fn new(parameters: PlanningParameters) -> Result<Self, OptimaError> {
        parameters.validate()?;
        Ok(Self {
            current: RwLock::new(PlanningParametersSnapshot::new(0, parameters))
        })
    }
    /// Installs a new parameter generation and returns its version.
    pub fn update(&self, parameters: PlanningParameters) -> Result<u64, OptimaError> {
        parameters.validate()?;
        let mut current = self.current.write().map_err(|_| OptimaError::new_generic_error_str("planning parameter lock poisoned.", file!(), line!()))?;
        let version = current.version() + 1;
        *current = PlanningParametersSnapshot::new(version, parameters);
        Ok(version)
    }
    pub fn snapshot(&self) -> Result<PlanningParametersSnapshot, OptimaError> {
        let current = self.current.read().map_err(|_| OptimaError::new_generic_error_str("planning parameter lock poisoned.", file!(), line!()))?;
        Ok(current.clone())
    }
}
impl Default for PlanningParametersRegistry {
    fn default() -> Self {
        Self {
            current: RwLock::new(PlanningParametersSnapshot::new(0, PlanningParameters::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let p = PlanningParameters::load_from_json_string(r#"{"num_trajectories": 8, "random_seed": 3}"#).unwrap();
        assert_eq!(p.num_trajectories, 8);
        assert_eq!(p.random_seed, Some(3));
        assert_eq!(p.trajectory_duration, PlanningParameters::default().trajectory_duration);
    }

    #[test]
    fn ron_and_toml_round_trip() {
        let mut p = PlanningParameters::default();
        p.num_contacts = 2;
        p.contact_variable_initial_values = vec![1.0, 0.5];
        p.contact_variable_goal_values = vec![0.0, 0.0];
        p.print_verbosity = PrintVerbosity::Debug;

        let ron_str = p.convert_to_ron_string().unwrap();
        assert_eq!(PlanningParameters::load_from_ron(&ron_str).unwrap(), p);
        let toml_str = p.convert_to_toml_string().unwrap();
        assert_eq!(PlanningParameters::load_from_toml(&toml_str).unwrap(), p);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(PlanningParameters::load_from_json_string("{not json"), Err(OptimaError::ParameterLoadError(_))));
        assert!(PlanningParameters::load_from_json_string(r#"{"diff_rule_length": 6}"#).is_err());
        assert!(PlanningParameters::load_from_json_string(r#"{"num_contacts": 1}"#).is_err());
    }

    #[test]
    fn registry_versions_every_update() {
        let r = PlanningParametersRegistry::default();
        let s0 = r.snapshot().unwrap();
        let mut p = PlanningParameters::default();
        p.max_iterations = 5;
        assert_eq!(r.update(p).unwrap(), 1);
        let s1 = r.snapshot().unwrap();
        assert_eq!(s0.version(), 0);
        assert_eq!(s0.parameters().max_iterations, 100);
        assert_eq!(s1.parameters().max_iterations, 5);
    }
}
