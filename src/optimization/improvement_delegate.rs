use nalgebra::DMatrix;
use rand_chacha::ChaCha8Rng;
use crate::optimization::trajectory_cost::TrajectoryCostEvaluator;
use crate::planning_parameters::PlanningParameters;
use crate::trajectory::CIOTrajectory;
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_sampling::SimpleSamplers;

const MAX_BACKTRACKING_STEPS: usize = 5;

/// Outcome of one improvement step.  `cost` is the cost of the trajectory as it stands after the
/// step; `converged` means the delegate considers the candidate done.
#[derive(Clone, Debug, PartialEq)]
pub struct ImprovementResult {
    cost: f64,
    converged: bool
}
impl ImprovementResult {
    pub fn new(cost: f64, converged: bool) -> Self {
        Self {
            cost,
            converged
        }
    }
    pub fn cost(&self) -> f64 {
        self.cost
    }
    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// The per-candidate improvement algorithm.  Each candidate owns its own delegate, so
/// implementations may keep mutable search state between iterations.
pub trait TrajectoryImprovementDelegate: Send + TrajectoryImprovementDelegateClone {
    /// Re-reads every parameter-derived setting.  Called before the first iteration and again
    /// whenever the parameter version changes.
    fn on_planning_parameters_updated(&mut self, parameters: &PlanningParameters) -> Result<(), OptimaError>;
    fn improve(&mut self, trajectory: &mut CIOTrajectory, iteration: usize, rng: &mut ChaCha8Rng) -> Result<ImprovementResult, OptimaError>;
}

pub trait TrajectoryImprovementDelegateClone {
    fn clone_box(&self) -> Box<dyn TrajectoryImprovementDelegate>;
}
impl<T> TrajectoryImprovementDelegateClone for T where T: 'static + TrajectoryImprovementDelegate + Clone {
    fn clone_box(&self) -> Box<dyn TrajectoryImprovementDelegate> {
        Box::new(self.clone())
    }
}
impl Clone for Box<dyn TrajectoryImprovementDelegate> {
    fn clone(&self) -> Box<dyn TrajectoryImprovementDelegate> {
        self.clone_box()
    }
}

/// Gradient descent on the interior of the trajectory with step halving, optionally mixed with
/// gaussian exploration noise.  A candidate converges once its cost drops to the convergence
/// threshold or stops improving for `max_stall_iterations` iterations.
#[derive(Clone)]
pub struct GradientImprovementDelegate {
    evaluator: Box<dyn TrajectoryCostEvaluator>,
    gradient_step_size: f64,
    exploration_noise_std: f64,
    convergence_cost_threshold: f64,
    max_stall_iterations: usize,
    min_cost_improvement: f64,
    best_cost: f64,
    stall_count: usize
}
impl GradientImprovementDelegate {
    pub fn new(evaluator: Box<dyn TrajectoryCostEvaluator>) -> Self {
        let p = PlanningParameters::default();
        Self {
            evaluator,
            gradient_step_size: p.gradient_step_size,
            exploration_noise_std: p.exploration_noise_std,
            convergence_cost_threshold: p.convergence_cost_threshold,
            max_stall_iterations: p.max_stall_iterations,
            min_cost_improvement: p.min_cost_improvement,
            best_cost: f64::INFINITY,
            stall_count: 0
        }
    }
    fn step_direction(&self, trajectory: &CIOTrajectory, gradient: Option<&DMatrix<f64>>, rng: &mut ChaCha8Rng) -> DMatrix<f64> {
        let mut direction = DMatrix::zeros(trajectory.num_points(), trajectory.num_joints());
        for i in trajectory.start_index()..=trajectory.end_index() {
            for j in 0..trajectory.num_joints() {
                let g = match gradient {
                    None => { 0.0 }
                    Some(g) => { g[(i, j)] }
                };
                direction[(i, j)] = -self.gradient_step_size * g + SimpleSamplers::zero_mean_normal_sample(self.exploration_noise_std, rng);
            }
        }
        direction
    }
}
impl TrajectoryImprovementDelegate for GradientImprovementDelegate {
    fn on_planning_parameters_updated(&mut self, parameters: &PlanningParameters) -> Result<(), OptimaError> {
        self.gradient_step_size = parameters.gradient_step_size;
        self.exploration_noise_std = parameters.exploration_noise_std;
        self.convergence_cost_threshold = parameters.convergence_cost_threshold;
        self.max_stall_iterations = parameters.max_stall_iterations;
        self.min_cost_improvement = parameters.min_cost_improvement;
        self.evaluator.on_planning_parameters_updated(parameters)
    }
    fn improve(&mut self, trajectory: &mut CIOTrajectory, iteration: usize, rng: &mut ChaCha8Rng) -> Result<ImprovementResult, OptimaError> {
        let current = self.evaluator.evaluate(trajectory)?;
        if iteration == 0 {
            self.best_cost = current.cost();
            self.stall_count = 0;
        }

        let original = trajectory.trajectory().clone();
        let direction = self.step_direction(trajectory, current.gradient(), rng);

        let mut cost = current.cost();
        let mut scale = 1.0;
        for _ in 0..MAX_BACKTRACKING_STEPS {
            *trajectory.trajectory_mut() = &original + &direction * scale;
            let candidate_cost = self.evaluator.evaluate(trajectory)?.cost();
            if candidate_cost < cost {
                cost = candidate_cost;
                break;
            }
            scale *= 0.5;
        }
        if cost >= current.cost() {
            *trajectory.trajectory_mut() = original;
        }

        if self.best_cost - cost > self.min_cost_improvement {
            self.stall_count = 0;
        } else {
            self.stall_count += 1;
        }
        self.best_cost = self.best_cost.min(cost);

        let converged = cost <= self.convergence_cost_threshold || self.stall_count >= self.max_stall_iterations;
        Ok(ImprovementResult::new(cost, converged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::trajectory_cost::SmoothnessCostEvaluator;
    use crate::utils::utils_robot::planning_group::{PlanningGroup, PlanningGroupJoint};
    use crate::utils::utils_sampling::SeededRngUtils;

    #[test]
    fn gradient_steps_never_increase_cost() {
        let full = CIOTrajectory::new(1, 1.0, 0.1, 0, 0.5).unwrap();
        let group = PlanningGroup::new("g", vec![PlanningGroupJoint::new("j0", 0)], 0);
        let mut v = full.project(&group, 7, 0).unwrap();
        for i in v.start_index()..=v.end_index() { v[(i, 0)] = if i % 2 == 0 { 0.1 } else { -0.1 }; }

        let params = PlanningParameters::default();
        let evaluator = SmoothnessCostEvaluator::new(&params, None).unwrap();
        let mut delegate = GradientImprovementDelegate::new(Box::new(evaluator.clone()));
        delegate.on_planning_parameters_updated(&params).unwrap();
        let mut rng = SeededRngUtils::candidate_rng(Some(3), 0);

        let mut last = evaluator.evaluate(&v).unwrap().cost();
        for it in 0..10 {
            let r = delegate.improve(&mut v, it, &mut rng).unwrap();
            assert!(r.cost() <= last);
            assert!((evaluator.evaluate(&v).unwrap().cost() - r.cost()).abs() < 1e-9 * r.cost().max(1.0));
            last = r.cost();
        }
        assert_eq!(v[(0, 0)], 0.0);
    }
}
