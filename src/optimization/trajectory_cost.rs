use std::sync::Arc;
use nalgebra::DMatrix;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::planning_capabilities::CollisionChecker;
use crate::planning_parameters::PlanningParameters;
use crate::trajectory::CIOTrajectory;
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::finite_difference::FiniteDifferenceUtils;

/// Scalar cost of a trajectory and, optionally, its gradient with respect to every trajectory
/// entry (same shape as the trajectory matrix; rows outside the interior are zero).
#[derive(Clone, Debug)]
pub struct TrajectoryCost {
    cost: f64,
    gradient: Option<DMatrix<f64>>
}
impl TrajectoryCost {
    pub fn new(cost: f64, gradient: Option<DMatrix<f64>>) -> Self {
        Self {
            cost,
            gradient
        }
    }
    pub fn cost(&self) -> f64 {
        self.cost
    }
    pub fn gradient(&self) -> Option<&DMatrix<f64>> {
        self.gradient.as_ref()
    }
}

pub trait TrajectoryCostEvaluator: Send + Sync + TrajectoryCostEvaluatorClone {
    fn evaluate(&self, trajectory: &CIOTrajectory) -> Result<TrajectoryCost, OptimaError>;
    /// Called whenever a new parameter generation is observed.
    fn on_planning_parameters_updated(&mut self, _parameters: &PlanningParameters) -> Result<(), OptimaError> {
        Ok(())
    }
}

pub trait TrajectoryCostEvaluatorClone {
    fn clone_box(&self) -> Box<dyn TrajectoryCostEvaluator>;
}
impl<T> TrajectoryCostEvaluatorClone for T where T: 'static + TrajectoryCostEvaluator + Clone {
    fn clone_box(&self) -> Box<dyn TrajectoryCostEvaluator> {
        Box::new(self.clone())
    }
}
impl Clone for Box<dyn TrajectoryCostEvaluator> {
    fn clone(&self) -> Box<dyn TrajectoryCostEvaluator> {
        self.clone_box()
    }
}

const DISCRETIZATION_TOLERANCE: f64 = 1e-12;

/// Integrated squared joint acceleration over the interior, estimated with the central finite
/// difference rule of `diff_rule_length` samples, plus a fixed penalty for every interior step
/// the collision checker reports as colliding.  Joints are evaluated in parallel on a private
/// pool of `num_parallel_threads` threads.
#[derive(Clone)]
pub struct SmoothnessCostEvaluator {
    smoothness_cost_weight: f64,
    collision_cost_weight: f64,
    diff_rule_length: usize,
    discretization: f64,
    /// Second derivative rule for `diff_rule_length` samples spaced `discretization` apart.
    coefficients: Vec<f64>,
    num_parallel_threads: usize,
    collision_checker: Option<Arc<dyn CollisionChecker>>,
    thread_pool: Option<Arc<ThreadPool>>
}
impl SmoothnessCostEvaluator {
    pub fn new(parameters: &PlanningParameters, collision_checker: Option<Arc<dyn CollisionChecker>>) -> Result<Self, OptimaError> {
        let mut out_self = Self {
            smoothness_cost_weight: parameters.smoothness_cost_weight,
            collision_cost_weight: parameters.collision_cost_weight,
            diff_rule_length: parameters.diff_rule_length,
            discretization: parameters.trajectory_discretization,
            coefficients: vec![],
            num_parallel_threads: 0,
            collision_checker,
            thread_pool: None
        };
        out_self.refresh_coefficients()?;
        out_self.set_num_parallel_threads(parameters.num_parallel_threads)?;
        Ok(out_self)
    }
    fn refresh_coefficients(&mut self) -> Result<(), OptimaError> {
        self.coefficients = FiniteDifferenceUtils::central_difference_coefficients(self.diff_rule_length, 2, self.discretization)?;
        Ok(())
    }
    pub fn coefficients(&self) -> &Vec<f64> {
        &self.coefficients
    }
    fn set_num_parallel_threads(&mut self, num_parallel_threads: usize) -> Result<(), OptimaError> {
        if num_parallel_threads == self.num_parallel_threads { return Ok(()); }

        self.thread_pool = if num_parallel_threads > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(num_parallel_threads)
                .build()
                .map_err(|e| OptimaError::new_generic_error_str(&format!("could not build cost evaluation thread pool: {}", e), file!(), line!()))?;
            Some(Arc::new(pool))
        } else {
            None
        };
        self.num_parallel_threads = num_parallel_threads;
        Ok(())
    }
    /// Cost and gradient column of a single joint.
    fn evaluate_joint(trajectory: &CIOTrajectory, joint_idx: usize, coefficients: &Vec<f64>, weight: f64) -> (f64, Vec<f64>) {
        let half = (coefficients.len() / 2) as i64;
        let last = trajectory.num_points() as i64 - 1;
        let dt = trajectory.discretization();
        let mut cost = 0.0;
        let mut gradient = vec![0.0; trajectory.num_points()];

        for i in trajectory.start_index()..=trajectory.end_index() {
            let sample = |o: usize| (i as i64 + o as i64 - half).clamp(0, last) as usize;

            let mut acc = 0.0;
            for (o, c) in coefficients.iter().enumerate() {
                acc += c * trajectory[(sample(o), joint_idx)];
            }
            cost += weight * acc * acc * dt;

            for (o, c) in coefficients.iter().enumerate() {
                let k = sample(o);
                if k >= trajectory.start_index() && k <= trajectory.end_index() {
                    gradient[k] += 2.0 * weight * dt * acc * c;
                }
            }
        }

        (cost, gradient)
    }
}
impl TrajectoryCostEvaluator for SmoothnessCostEvaluator {
    fn evaluate(&self, trajectory: &CIOTrajectory) -> Result<TrajectoryCost, OptimaError> {
        let recomputed;
        let coefficients = if (trajectory.discretization() - self.discretization).abs() <= DISCRETIZATION_TOLERANCE {
            &self.coefficients
        } else {
            recomputed = FiniteDifferenceUtils::central_difference_coefficients(self.diff_rule_length, 2, trajectory.discretization())?;
            &recomputed
        };
        let weight = self.smoothness_cost_weight;

        let per_joint: Vec<(f64, Vec<f64>)> = match &self.thread_pool {
            None => {
                (0..trajectory.num_joints()).map(|j| Self::evaluate_joint(trajectory, j, coefficients, weight)).collect()
            }
            Some(pool) => {
                pool.install(|| (0..trajectory.num_joints()).into_par_iter().map(|j| Self::evaluate_joint(trajectory, j, coefficients, weight)).collect())
            }
        };

        let mut cost = 0.0;
        let mut gradient = DMatrix::zeros(trajectory.num_points(), trajectory.num_joints());
        for (j, (joint_cost, joint_gradient)) in per_joint.iter().enumerate() {
            cost += joint_cost;
            for (k, g) in joint_gradient.iter().enumerate() {
                gradient[(k, j)] = *g;
            }
        }

        if let Some(checker) = &self.collision_checker {
            for i in trajectory.start_index()..=trajectory.end_index() {
                if checker.is_colliding(&trajectory.trajectory_point_as_vector(i)) {
                    cost += self.collision_cost_weight * trajectory.discretization();
                }
            }
        }

        Ok(TrajectoryCost::new(cost, Some(gradient)))
    }
    fn on_planning_parameters_updated(&mut self, parameters: &PlanningParameters) -> Result<(), OptimaError> {
        self.smoothness_cost_weight = parameters.smoothness_cost_weight;
        self.collision_cost_weight = parameters.collision_cost_weight;
        if self.diff_rule_length != parameters.diff_rule_length || self.discretization != parameters.trajectory_discretization {
            self.diff_rule_length = parameters.diff_rule_length;
            self.discretization = parameters.trajectory_discretization;
            self.refresh_coefficients()?;
        }
        self.set_num_parallel_threads(parameters.num_parallel_threads)
    }
}
