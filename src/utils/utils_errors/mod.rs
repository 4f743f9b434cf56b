use std::fmt::{Display, Formatter};

/// A common error type returned by functions throughout the toolbox.
#[derive(Clone, Debug)]
pub enum OptimaError {
    GenericError(String),
    IdxOutOfBoundError(String),
    UnsupportedOperationError(String),
    InvalidGroupError(String),
    InvalidDurationError(String),
    SeedingFailure(String),
    NoFeasibleCandidate(String),
    ParameterLoadError(String)
}
impl OptimaError {
    pub fn new_generic_error_str(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: {} -- File: {}, Line: {}", s.to_string(), file, line);
        return Self::GenericError(s);
    }
    pub fn new_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Index {:?} is too large for the array of length {:?} -- File: {}, Line: {}", given_idx, length_of_array, file, line);
        return Self::IdxOutOfBoundError(s)
    }
    pub fn new_check_for_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Result<(), Self> {
        return if given_idx >= length_of_array {
            Err(Self::new_idx_out_of_bound_error(given_idx, length_of_array, file, line))
        } else {
            Ok(())
        }
    }
    pub fn new_unsupported_operation_error(function_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Unsupported operation error in function {}.  {} -- File: {}, Line: {}", function_name, message, file, line);
        return Self::UnsupportedOperationError(s);
    }
    pub fn new_invalid_group_error(group_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Invalid planning group {:?}.  {} -- File: {}, Line: {}", group_name, message, file, line);
        return Self::InvalidGroupError(s);
    }
    pub fn new_invalid_duration_error(duration: f64, discretization: f64, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Invalid trajectory duration {:?} with discretization {:?}.  {} -- File: {}, Line: {}", duration, discretization, message, file, line);
        return Self::InvalidDurationError(s);
    }
    pub fn new_seeding_failure(step: usize, num_attempts: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Could not find an IK solution for trajectory step {:?} after {:?} attempts. -- File: {}, Line: {}", step, num_attempts, file, line);
        return Self::SeedingFailure(s);
    }
    pub fn new_no_feasible_candidate_error(group_name: &str, population_size: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: None of the {:?} candidate trajectories for group {:?} converged. -- File: {}, Line: {}", population_size, group_name, file, line);
        return Self::NoFeasibleCandidate(s);
    }
    pub fn new_parameter_load_error(format_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Could not load planning parameters from {} string.  {} -- File: {}, Line: {}", format_name, message, file, line);
        return Self::ParameterLoadError(s);
    }
    pub fn message(&self) -> &str {
        match self {
            OptimaError::GenericError(s) => { s }
            OptimaError::IdxOutOfBoundError(s) => { s }
            OptimaError::UnsupportedOperationError(s) => { s }
            OptimaError::InvalidGroupError(s) => { s }
            OptimaError::InvalidDurationError(s) => { s }
            OptimaError::SeedingFailure(s) => { s }
            OptimaError::NoFeasibleCandidate(s) => { s }
            OptimaError::ParameterLoadError(s) => { s }
        }
    }
}
impl Display for OptimaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}
impl std::error::Error for OptimaError { }
