use std::sync::Arc;
use std::thread;
use nalgebra::DVector;
use rand_chacha::ChaCha8Rng;
use optima_cio::optimization::best_cost_manager::BestCostManager;
use optima_cio::optimization::improvement_delegate::{GradientImprovementDelegate, ImprovementResult, TrajectoryImprovementDelegate};
use optima_cio::optimization::parallel_run_controller::ParallelRunController;
use optima_cio::optimization::trajectory_optimizer::OptimizerState;
use optima_cio::optimization::trajectory_cost::{SmoothnessCostEvaluator, TrajectoryCostEvaluator};
use optima_cio::planning_parameters::{PlanningParameters, PlanningParametersSnapshot};
use optima_cio::trajectory::CIOTrajectory;
use optima_cio::trajectory::trajectory_constraints::AttemptConstraints;
use optima_cio::utils::utils_errors::OptimaError;
use optima_cio::utils::utils_robot::planning_group::{PlanningGroup, PlanningGroupJoint};

#[derive(Clone)]
struct FixedDelegate {
    cost: f64,
    converge_at: Option<usize>,
    fail: bool
}
impl TrajectoryImprovementDelegate for FixedDelegate {
    fn on_planning_parameters_updated(&mut self, _parameters: &PlanningParameters) -> Result<(), OptimaError> {
        Ok(())
    }
    fn improve(&mut self, _trajectory: &mut CIOTrajectory, iteration: usize, _rng: &mut ChaCha8Rng) -> Result<ImprovementResult, OptimaError> {
        if self.fail {
            return Err(OptimaError::new_generic_error_str("delegate failure", file!(), line!()));
        }
        Ok(ImprovementResult::new(self.cost, self.converge_at.map_or(false, |c| iteration >= c)))
    }
}

fn setup(params: PlanningParameters) -> (PlanningParametersSnapshot, CIOTrajectory, PlanningGroup) {
    let mut full = CIOTrajectory::new(3, params.trajectory_duration, params.trajectory_discretization, 0, params.phase_duration).unwrap();
    full.initialize_from_start_state(&DVector::zeros(3), &DVector::zeros(3), &DVector::zeros(3)).unwrap();
    full.set_goal_positions(&vec![0, 1, 2], &DVector::from_vec(vec![1.0, -1.0, 0.5])).unwrap();
    let group = PlanningGroup::new("arm", vec![PlanningGroupJoint::new("a", 0), PlanningGroupJoint::new("b", 1), PlanningGroupJoint::new("c", 2)], 0);
    (PlanningParametersSnapshot::new(0, params), full, group)
}

#[test]
fn coordinator_keeps_minimum_under_any_interleaving() {
    for _ in 0..50 {
        let m = Arc::new(BestCostManager::new());
        let handles: Vec<_> = [5.0, 3.0, 3.0, 7.0].iter().enumerate().map(|(i, c)| {
            let m = m.clone();
            let c = *c;
            thread::spawn(move || { m.report_cost(i, c); })
        }).collect();
        for h in handles { h.join().unwrap(); }

        assert_eq!(m.best_trajectory_index(), Some(1));
        assert_eq!(m.best_cost(), 3.0);
    }
}

#[test]
fn coordinator_reset_forgets_previous_attempt() {
    let m = BestCostManager::new();
    m.report_cost(0, 1.0);
    m.reset();
    assert_eq!(m.best_trajectory_index(), None);
    m.report_cost(2, 4.2);
    assert_eq!(m.best_trajectory_index(), Some(2));
    assert_eq!(m.best_cost(), 4.2);
}

#[test]
fn one_iteration_delegate_converges_every_candidate() {
    let (snapshot, full, group) = setup(PlanningParameters::default());
    let mut controller = ParallelRunController::new(Box::new(FixedDelegate { cost: 1.0, converge_at: Some(0), fail: false }), None, None);

    let result = controller.run_attempt(&snapshot, &full, &group, &AttemptConstraints::default(), 4).unwrap();
    assert!(result.succeeded());
    assert_eq!(result.iterations(), 1);
    assert_eq!(result.candidate_index(), 0);
    assert_eq!(result.candidates().len(), 4);
    assert!(result.candidates().iter().all(|c| c.succeeded && c.iterations == 1));
    assert!(result.candidates().iter().all(|c| c.termination_state == Some(OptimizerState::Converged)));
    assert_eq!(result.trajectory().num_interior_points(), full.num_interior_points());
    assert!(result.ensure_feasible().is_ok());
}

#[test]
fn exhausted_budget_is_an_outcome_not_an_error() {
    let mut params = PlanningParameters::default();
    params.max_iterations = 5;
    let (snapshot, full, group) = setup(params);
    let mut controller = ParallelRunController::new(Box::new(FixedDelegate { cost: 2.0, converge_at: None, fail: false }), None, None);

    let result = controller.run_attempt(&snapshot, &full, &group, &AttemptConstraints::default(), 3).unwrap();
    assert!(!result.succeeded());
    assert_eq!(result.iterations(), 5);
    assert_eq!(result.cost(), 2.0);
    assert!(matches!(result.ensure_feasible(), Err(OptimaError::NoFeasibleCandidate(_))));
}

#[test]
fn failing_delegates_leave_no_feasible_candidate() {
    let (snapshot, full, group) = setup(PlanningParameters::default());
    let mut controller = ParallelRunController::new(Box::new(FixedDelegate { cost: 0.0, converge_at: Some(0), fail: true }), None, None);
    let res = controller.run_attempt(&snapshot, &full, &group, &AttemptConstraints::default(), 2);
    assert!(matches!(res, Err(OptimaError::NoFeasibleCandidate(_))));
}

#[test]
fn empty_population_is_rejected_before_running() {
    let (snapshot, full, group) = setup(PlanningParameters::default());
    let mut controller = ParallelRunController::new(Box::new(FixedDelegate { cost: 0.0, converge_at: Some(0), fail: false }), None, None);
    assert!(controller.run_attempt(&snapshot, &full, &group, &AttemptConstraints::default(), 0).is_err());
}

#[test]
fn gradient_delegate_improves_perturbed_candidates_reproducibly() {
    let mut params = PlanningParameters::default();
    params.random_seed = Some(11);
    params.seed_perturbation_std = 0.05;
    params.max_iterations = 30;
    params.gradient_step_size = 1e-4;
    let (snapshot, full, group) = setup(params.clone());

    let evaluator = SmoothnessCostEvaluator::new(&params, None).unwrap();
    let delegate = GradientImprovementDelegate::new(Box::new(evaluator.clone()));

    let mut controller = ParallelRunController::new(Box::new(delegate.clone()), None, None);
    let first = controller.run_attempt(&snapshot, &full, &group, &AttemptConstraints::default(), 3).unwrap();
    let second = controller.run_attempt(&snapshot, &full, &group, &AttemptConstraints::default(), 3).unwrap();

    assert_eq!(first.candidate_index(), second.candidate_index());
    assert_eq!(first.trajectory().trajectory(), second.trajectory().trajectory());
    assert!(first.cost().is_finite());
    assert!((evaluator.evaluate(first.trajectory()).unwrap().cost() - first.cost()).abs() < 1e-9 * first.cost().max(1.0));
    for c in first.candidates() {
        assert!(c.best_cost >= first.cost());
    }
}
