use rand_chacha::ChaCha8Rng;
use crate::optimization::improvement_delegate::{ImprovementResult, TrajectoryImprovementDelegate};
use crate::planning_parameters::PlanningParametersSnapshot;
use crate::trajectory::CIOTrajectory;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;

/// Drives one candidate's improvement delegate, refreshing the delegate's parameter-derived state
/// exactly when the parameter version it last saw differs from the current one.
#[derive(Clone)]
pub struct ImprovementManager {
    delegate: Box<dyn TrajectoryImprovementDelegate>,
    last_planning_parameter_version: Option<u64>
}
impl ImprovementManager {
    pub fn new(delegate: Box<dyn TrajectoryImprovementDelegate>) -> Self {
        Self {
            delegate,
            last_planning_parameter_version: None
        }
    }
    /// Returns true if the delegate was refreshed.
    pub fn update_planning_parameters(&mut self, snapshot: &PlanningParametersSnapshot) -> Result<bool, OptimaError> {
        if self.last_planning_parameter_version == Some(snapshot.version()) { return Ok(false); }

        optima_print(&format!("Refreshing improvement delegate for parameter version {}.", snapshot.version()), PrintMode::Println, PrintColor::None, false, PrintVerbosity::Debug);
        self.delegate.on_planning_parameters_updated(snapshot.parameters())?;
        self.last_planning_parameter_version = Some(snapshot.version());
        Ok(true)
    }
    pub fn run_single_iteration(&mut self, snapshot: &PlanningParametersSnapshot, trajectory: &mut CIOTrajectory, iteration: usize, rng: &mut ChaCha8Rng) -> Result<ImprovementResult, OptimaError> {
        self.update_planning_parameters(snapshot)?;
        self.delegate.improve(trajectory, iteration, rng)
    }
    pub fn last_planning_parameter_version(&self) -> Option<u64> {
        self.last_planning_parameter_version
    }
}
