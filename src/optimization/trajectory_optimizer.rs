use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use nalgebra::DMatrix;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumIter};
use crate::optimization::best_cost_manager::BestCostManager;
use crate::optimization::improvement_manager::ImprovementManager;
use crate::planning_parameters::PlanningParametersSnapshot;
use crate::trajectory::CIOTrajectory;
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;

/// Lifecycle of a single candidate:
/// `Seeded -> Iterating -> (Converged | BudgetExhausted | Cancelled) -> Reported`.
/// `Cancelled` means a sibling converged first and the shared flag stopped this candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum OptimizerState {
    Seeded,
    Iterating,
    Converged,
    BudgetExhausted,
    Cancelled,
    Reported
}

/// One member of the candidate population.  It owns its trajectory, improvement manager and
/// random stream, and shares only the best cost coordinator and the cancellation flag with its
/// siblings.
pub struct TrajectoryOptimizer {
    trajectory_index: usize,
    trajectory: CIOTrajectory,
    best_trajectory: DMatrix<f64>,
    improvement_manager: ImprovementManager,
    best_cost_manager: Arc<BestCostManager>,
    snapshot: PlanningParametersSnapshot,
    rng: ChaCha8Rng,
    cancellation_token: Arc<AtomicBool>,
    state: OptimizerState,
    termination_state: Option<OptimizerState>,
    iterations: usize,
    best_cost: f64,
    error: Option<OptimaError>
}
impl TrajectoryOptimizer {
    pub fn new(trajectory_index: usize, trajectory: CIOTrajectory, improvement_manager: ImprovementManager, best_cost_manager: Arc<BestCostManager>, snapshot: PlanningParametersSnapshot, rng: ChaCha8Rng, cancellation_token: Arc<AtomicBool>) -> Self {
        let best_trajectory = trajectory.trajectory().clone();
        Self {
            trajectory_index,
            trajectory,
            best_trajectory,
            improvement_manager,
            best_cost_manager,
            snapshot,
            rng,
            cancellation_token,
            state: OptimizerState::Seeded,
            termination_state: None,
            iterations: 0,
            best_cost: f64::INFINITY,
            error: None
        }
    }
    /// Runs improvement iterations until the delegate reports convergence, the iteration budget
    /// runs out, a sibling cancels the attempt, or the delegate fails.  The best trajectory seen
    /// is kept and every new best cost is reported to the coordinator.
    pub fn optimize(&mut self) {
        if self.state != OptimizerState::Seeded { return; }
        self.state = OptimizerState::Iterating;

        let max_iterations = self.snapshot.parameters().max_iterations;
        let terminate_on_first_convergence = self.snapshot.parameters().terminate_on_first_convergence;

        let mut cancelled = false;
        while self.iterations < max_iterations {
            if self.cancellation_token.load(Ordering::Acquire) {
                cancelled = true;
                break;
            }

            let res = self.improvement_manager.run_single_iteration(&self.snapshot, &mut self.trajectory, self.iterations, &mut self.rng);
            let result = match res {
                Ok(r) => { r }
                Err(e) => {
                    optima_print(&format!("Candidate {} stopped after {} iterations: {}", self.trajectory_index, self.iterations, e), PrintMode::Println, PrintColor::Red, false, PrintVerbosity::Info);
                    self.error = Some(e);
                    break;
                }
            };
            self.iterations += 1;

            if result.cost().is_finite() && result.cost() < self.best_cost {
                self.best_cost = result.cost();
                self.best_trajectory = self.trajectory.trajectory().clone();
                self.best_cost_manager.report_cost(self.trajectory_index, self.best_cost);
            }

            if result.converged() {
                self.state = OptimizerState::Converged;
                if terminate_on_first_convergence {
                    self.cancellation_token.store(true, Ordering::Release);
                }
                break;
            }
        }

        if self.state != OptimizerState::Converged {
            self.state = if cancelled { OptimizerState::Cancelled } else { OptimizerState::BudgetExhausted };
        }
        self.termination_state = Some(self.state);

        *self.trajectory.trajectory_mut() = self.best_trajectory.clone();
        self.state = OptimizerState::Reported;

        optima_print(&format!("Candidate {} finished: {:?} after {} iterations, best cost {:.6}.", self.trajectory_index, self.termination_state, self.iterations, self.best_cost), PrintMode::Println, PrintColor::None, false, PrintVerbosity::Debug);
    }
    pub fn trajectory_index(&self) -> usize {
        self.trajectory_index
    }
    pub fn trajectory(&self) -> &CIOTrajectory {
        &self.trajectory
    }
    pub fn into_trajectory(self) -> CIOTrajectory {
        self.trajectory
    }
    pub fn state(&self) -> OptimizerState {
        self.state
    }
    /// `Converged`, `BudgetExhausted` or `Cancelled` once the candidate has finished.
    pub fn termination_state(&self) -> Option<OptimizerState> {
        self.termination_state
    }
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }
    pub fn is_succeed(&self) -> bool {
        self.termination_state == Some(OptimizerState::Converged)
    }
    pub fn error(&self) -> Option<&OptimaError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::improvement_delegate::{ImprovementResult, TrajectoryImprovementDelegate};
    use crate::planning_parameters::PlanningParameters;
    use crate::utils::utils_sampling::SeededRngUtils;

    #[derive(Clone)]
    struct Countdown {
        converge_at: usize
    }
    impl TrajectoryImprovementDelegate for Countdown {
        fn on_planning_parameters_updated(&mut self, _parameters: &PlanningParameters) -> Result<(), OptimaError> {
            Ok(())
        }
        fn improve(&mut self, _trajectory: &mut CIOTrajectory, iteration: usize, _rng: &mut ChaCha8Rng) -> Result<ImprovementResult, OptimaError> {
            Ok(ImprovementResult::new(10.0 - iteration as f64, iteration + 1 >= self.converge_at))
        }
    }

    fn optimizer(converge_at: usize, parameters: PlanningParameters, token: Arc<AtomicBool>, manager: Arc<BestCostManager>) -> TrajectoryOptimizer {
        let trajectory = CIOTrajectory::new(1, 1.0, 0.1, 0, 0.5).unwrap();
        TrajectoryOptimizer::new(0, trajectory, ImprovementManager::new(Box::new(Countdown { converge_at })), manager, PlanningParametersSnapshot::new(0, parameters), SeededRngUtils::candidate_rng(Some(0), 0), token)
    }

    #[test]
    fn converges_and_reports() {
        let manager = Arc::new(BestCostManager::new());
        let mut o = optimizer(3, PlanningParameters::default(), Arc::new(AtomicBool::new(false)), manager.clone());
        assert_eq!(o.state(), OptimizerState::Seeded);
        o.optimize();
        assert_eq!(o.state(), OptimizerState::Reported);
        assert_eq!(o.termination_state(), Some(OptimizerState::Converged));
        assert_eq!(o.iterations(), 3);
        assert_eq!(o.best_cost(), 8.0);
        assert!(o.is_succeed());
        assert_eq!(manager.best_cost(), 8.0);
    }

    #[test]
    fn budget_exhaustion_is_not_success() {
        let mut p = PlanningParameters::default();
        p.max_iterations = 4;
        let mut o = optimizer(100, p, Arc::new(AtomicBool::new(false)), Arc::new(BestCostManager::new()));
        o.optimize();
        assert_eq!(o.termination_state(), Some(OptimizerState::BudgetExhausted));
        assert_eq!(o.iterations(), 4);
        assert!(!o.is_succeed());
    }

    #[test]
    fn cancelled_candidate_stops_at_iteration_boundary() {
        let manager = Arc::new(BestCostManager::new());
        let mut o = optimizer(1, PlanningParameters::default(), Arc::new(AtomicBool::new(true)), manager.clone());
        o.optimize();
        assert_eq!(o.iterations(), 0);
        assert_eq!(o.termination_state(), Some(OptimizerState::Cancelled));
        assert!(!o.is_succeed());
        assert_eq!(manager.best_trajectory_index(), None);

        let mut p = PlanningParameters::default();
        p.terminate_on_first_convergence = true;
        let token = Arc::new(AtomicBool::new(false));
        let mut o = optimizer(1, p, token.clone(), manager);
        o.optimize();
        assert!(token.load(Ordering::Acquire));
    }

    #[derive(Clone)]
    struct NanFirst;
    impl TrajectoryImprovementDelegate for NanFirst {
        fn on_planning_parameters_updated(&mut self, _parameters: &PlanningParameters) -> Result<(), OptimaError> {
            Ok(())
        }
        fn improve(&mut self, _trajectory: &mut CIOTrajectory, iteration: usize, _rng: &mut ChaCha8Rng) -> Result<ImprovementResult, OptimaError> {
            let cost = if iteration == 0 { f64::NAN } else { 5.0 - iteration as f64 };
            Ok(ImprovementResult::new(cost, false))
        }
    }

    #[test]
    fn non_finite_costs_never_become_the_best() {
        let mut p = PlanningParameters::default();
        p.max_iterations = 3;
        let manager = Arc::new(BestCostManager::new());
        let trajectory = CIOTrajectory::new(1, 1.0, 0.1, 0, 0.5).unwrap();
        let mut o = TrajectoryOptimizer::new(2, trajectory, ImprovementManager::new(Box::new(NanFirst)), manager.clone(), PlanningParametersSnapshot::new(0, p), SeededRngUtils::candidate_rng(Some(0), 2), Arc::new(AtomicBool::new(false)));
        o.optimize();
        assert_eq!(o.best_cost(), 3.0);
        assert_eq!(manager.best_trajectory_index(), Some(2));
        assert_eq!(manager.best_cost(), 3.0);
        assert_eq!(o.termination_state(), Some(OptimizerState::BudgetExhausted));
    }
}
