use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use instant::Instant;
use rayon::ThreadPoolBuilder;
use serde::{Serialize, Deserialize};
use crate::optimization::best_cost_manager::BestCostManager;
use crate::optimization::improvement_delegate::TrajectoryImprovementDelegate;
use crate::optimization::improvement_manager::ImprovementManager;
use crate::optimization::trajectory_optimizer::{OptimizerState, TrajectoryOptimizer};
use crate::planning_capabilities::{CollisionChecker, InverseKinematicsSolver};
use crate::planning_parameters::PlanningParametersSnapshot;
use crate::trajectory::CIOTrajectory;
use crate::trajectory::trajectory_constraints::AttemptConstraints;
use crate::trajectory::trajectory_seeding::{SeedingStrategy, TrajectorySeeder};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::planning_group::PlanningGroup;
use crate::utils::utils_sampling::SeededRngUtils;

/// Runs one planning attempt for one planning group: a population of independently seeded
/// candidates is optimized concurrently, one thread per candidate, and the best one is returned
/// once every candidate has finished.
pub struct ParallelRunController {
    best_cost_manager: Arc<BestCostManager>,
    delegate_prototype: Box<dyn TrajectoryImprovementDelegate>,
    ik_solver: Option<Arc<dyn InverseKinematicsSolver>>,
    collision_checker: Option<Arc<dyn CollisionChecker>>
}
impl ParallelRunController {
    /// Every candidate gets its own clone of `delegate_prototype`.
    pub fn new(delegate_prototype: Box<dyn TrajectoryImprovementDelegate>, ik_solver: Option<Arc<dyn InverseKinematicsSolver>>, collision_checker: Option<Arc<dyn CollisionChecker>>) -> Self {
        Self {
            best_cost_manager: Arc::new(BestCostManager::new()),
            delegate_prototype,
            ik_solver,
            collision_checker
        }
    }
    pub fn run_attempt(&mut self, snapshot: &PlanningParametersSnapshot, full_trajectory: &CIOTrajectory, group: &PlanningGroup, constraints: &AttemptConstraints, population_size: usize) -> Result<AttemptResult, OptimaError> {
        if population_size == 0 {
            return Err(OptimaError::new_generic_error_str("population size must be at least 1.", file!(), line!()));
        }
        let parameters = snapshot.parameters();

        let projected = full_trajectory.project(group, parameters.diff_rule_length, parameters.root_joint_threshold)?;
        let seeder = TrajectorySeeder::new(parameters, self.ik_solver.as_deref(), self.collision_checker.as_deref());
        let cancellation_token = Arc::new(AtomicBool::new(false));

        let mut optimizers = vec![];
        let mut seeding_strategies = vec![];
        for trajectory_index in 0..population_size {
            let mut rng = SeededRngUtils::candidate_rng(parameters.random_seed, trajectory_index);
            let mut trajectory = projected.clone();
            let strategy = seeder.seed_trajectory(&mut trajectory, group, trajectory_index, constraints)?;
            if trajectory_index > 0 {
                TrajectorySeeder::perturb_interior(&mut trajectory, parameters.seed_perturbation_std, &mut rng);
            }
            seeding_strategies.push(strategy);

            optimizers.push(TrajectoryOptimizer::new(
                trajectory_index,
                trajectory,
                ImprovementManager::new(self.delegate_prototype.clone()),
                self.best_cost_manager.clone(),
                snapshot.clone(),
                rng,
                cancellation_token.clone()
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(population_size)
            .build()
            .map_err(|e| OptimaError::new_generic_error_str(&format!("could not build candidate thread pool: {}", e), file!(), line!()))?;

        self.best_cost_manager.reset();
        let start = Instant::now();
        pool.scope(|s| {
            for optimizer in optimizers.iter_mut() {
                s.spawn(move |_| optimizer.optimize());
            }
        });
        let elapsed = start.elapsed();

        let candidate_index = self.best_cost_manager.best_trajectory_index().ok_or(OptimaError::new_no_feasible_candidate_error(group.name(), population_size, file!(), line!()))?;

        let candidates: Vec<CandidateSummary> = optimizers.iter().zip(seeding_strategies.iter()).map(|(o, s)| CandidateSummary {
            trajectory_index: o.trajectory_index(),
            seeding_strategy: *s,
            iterations: o.iterations(),
            best_cost: o.best_cost(),
            succeeded: o.is_succeed(),
            termination_state: o.termination_state()
        }).collect();

        let winner = optimizers.swap_remove(candidate_index);
        let out = AttemptResult {
            group_name: group.name().to_string(),
            candidate_index,
            succeeded: winner.is_succeed(),
            cost: winner.best_cost(),
            iterations: winner.iterations(),
            elapsed,
            candidates,
            trajectory: winner.into_trajectory()
        };

        optima_print(&format!("Group {:?}: candidate {} of {} won with cost {:.6} after {} iterations ({:?}).", out.group_name, out.candidate_index, population_size, out.cost, out.iterations, out.elapsed), PrintMode::Println, PrintColor::Blue, false, PrintVerbosity::Debug);

        Ok(out)
    }
    pub fn best_cost_manager(&self) -> &Arc<BestCostManager> {
        &self.best_cost_manager
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub trajectory_index: usize,
    pub seeding_strategy: SeedingStrategy,
    pub iterations: usize,
    pub best_cost: f64,
    pub succeeded: bool,
    pub termination_state: Option<OptimizerState>
}

/// The winning candidate of an attempt.  `trajectory` is the winner's restricted trajectory,
/// ready to be merged back into the full body trajectory the attempt was projected from.
#[derive(Clone, Debug)]
pub struct AttemptResult {
    group_name: String,
    trajectory: CIOTrajectory,
    candidate_index: usize,
    succeeded: bool,
    cost: f64,
    iterations: usize,
    elapsed: Duration,
    candidates: Vec<CandidateSummary>
}
impl AttemptResult {
    /// Turns an unsuccessful winner into a `NoFeasibleCandidate` error.
    pub fn ensure_feasible(self) -> Result<Self, OptimaError> {
        return if self.succeeded {
            Ok(self)
        } else {
            Err(OptimaError::new_no_feasible_candidate_error(&self.group_name, self.candidates.len(), file!(), line!()))
        }
    }
    pub fn group_name(&self) -> &str {
        &self.group_name
    }
    pub fn trajectory(&self) -> &CIOTrajectory {
        &self.trajectory
    }
    pub fn candidate_index(&self) -> usize {
        self.candidate_index
    }
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }
    pub fn cost(&self) -> f64 {
        self.cost
    }
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
    pub fn candidates(&self) -> &Vec<CandidateSummary> {
        &self.candidates
    }
}
