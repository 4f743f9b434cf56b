//! Outer planning loop: request validation, group decomposition, trials, and result assembly.

pub mod planning_info;

use std::sync::Arc;
use serde::{Serialize, Deserialize};
use crate::optimization::improvement_delegate::TrajectoryImprovementDelegate;
use crate::optimization::parallel_run_controller::ParallelRunController;
use crate::planner::planning_info::{PlanningInfo, PlanningInfoCollection};
use crate::planning_capabilities::{CollisionChecker, InverseKinematicsSolver, RoadmapSeedProvider};
use crate::planning_parameters::{PlanningParameters, PlanningParametersRegistry};
use crate::robot_modules::robot_joint_state_module::RobotJointStateModule;
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::trajectory::CIOTrajectory;
use crate::trajectory::trajectory_constraints::{AttemptConstraints, CartesianPathConstraint, WaypointConstraintSet};
use crate::utils::utils_console::{optima_print, set_print_verbosity, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::planning_group::PlanningGroup;
use crate::utils::utils_robot::robot_generic_structures::{NamedJointState, TimedJointState};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MotionPlanRequest {
    pub group_name: String,
    pub start_state: NamedJointState,
    /// Only the first goal is planned to; all of them are offered to the roadmap provider.
    pub goal_states: Vec<NamedJointState>,
    pub path_constraint: Option<CartesianPathConstraint>,
    pub trajectory_constraints: Vec<WaypointConstraintSet>
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MotionPlanResponse {
    joint_names: Vec<String>,
    trajectory: Vec<TimedJointState>,
    succeeded: bool,
    planning_infos: PlanningInfoCollection
}
impl MotionPlanResponse {
    pub fn joint_names(&self) -> &Vec<String> {
        &self.joint_names
    }
    pub fn trajectory(&self) -> &Vec<TimedJointState> {
        &self.trajectory
    }
    /// True if every planning group succeeded in the last trial.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }
    pub fn planning_infos(&self) -> &PlanningInfoCollection {
        &self.planning_infos
    }
}

pub struct CIOPlanner {
    robot_joint_state_module: RobotJointStateModule,
    parameters_registry: Arc<PlanningParametersRegistry>,
    parallel_run_controller: ParallelRunController,
    roadmap_seed_provider: Option<Arc<dyn RoadmapSeedProvider>>,
    trajectory: Option<CIOTrajectory>,
    planning_infos: PlanningInfoCollection,
    planning_count: usize
}
impl CIOPlanner {
    pub fn new(robot_model_module: RobotModelModule,
               parameters_registry: Arc<PlanningParametersRegistry>,
               delegate_prototype: Box<dyn TrajectoryImprovementDelegate>,
               ik_solver: Option<Arc<dyn InverseKinematicsSolver>>,
               collision_checker: Option<Arc<dyn CollisionChecker>>,
               roadmap_seed_provider: Option<Arc<dyn RoadmapSeedProvider>>) -> Self {
        Self {
            robot_joint_state_module: RobotJointStateModule::new(robot_model_module),
            parameters_registry,
            parallel_run_controller: ParallelRunController::new(delegate_prototype, ik_solver, collision_checker),
            roadmap_seed_provider,
            trajectory: None,
            planning_infos: PlanningInfoCollection::default(),
            planning_count: 0
        }
    }
    pub fn plan(&mut self, request: &MotionPlanRequest) -> Result<MotionPlanResponse, OptimaError> {
        let snapshot = self.parameters_registry.snapshot()?;
        let parameters = snapshot.parameters();
        set_print_verbosity(parameters.print_verbosity);

        optima_print(&format!("Received planning request for group {:?} (trajectory duration {}).", request.group_name, parameters.trajectory_duration), PrintMode::Println, PrintColor::Blue, true, PrintVerbosity::Info);

        let start_state = self.robot_joint_state_module.convert_named_joint_state_to_full_state(&request.start_state)?;
        if request.goal_states.is_empty() {
            return Err(OptimaError::new_generic_error_str("invalid goal: request has no goal state.", file!(), line!()));
        }
        let mut goal_states = vec![];
        for g in &request.goal_states {
            goal_states.push(self.robot_joint_state_module.convert_goal_state_to_full_state(g, start_state.positions())?);
        }

        let robot_model_module = self.robot_joint_state_module.robot_model_module();
        let mut planning_groups: Vec<PlanningGroup> = vec![];
        for group_name in robot_model_module.get_planning_group_sequence(&request.group_name)? {
            planning_groups.push(robot_model_module.get_planning_group(&group_name)?.clone());
        }
        let mut goal_joint_idxs = vec![];
        for g in &planning_groups { goal_joint_idxs.extend(g.full_body_joint_idxs()); }

        let mut waypoint_constraints = request.trajectory_constraints.clone();
        if let Some(roadmap) = &self.roadmap_seed_provider {
            waypoint_constraints.extend(roadmap.get_seed_trajectories(start_state.positions(), &goal_states));
        }
        let constraints = AttemptConstraints::new(waypoint_constraints, request.path_constraint.clone());

        let num_joints = robot_model_module.num_joints();
        let mut trajectory = match self.trajectory.take() {
            Some(t) if Self::template_matches(&t, num_joints, parameters) => { t }
            _ => { CIOTrajectory::new(num_joints, parameters.trajectory_duration, parameters.trajectory_discretization, parameters.num_contacts, parameters.phase_duration)? }
        };

        self.planning_infos = PlanningInfoCollection::new(parameters.num_trials, planning_groups.len());
        let mut last_trial_succeeded = false;
        for trial in 0..parameters.num_trials {
            optima_print(&format!("Trial [{}]", self.planning_count + trial), PrintMode::Println, PrintColor::Cyan, false, PrintVerbosity::Info);

            trajectory.initialize_from_start_state(start_state.positions(), start_state.velocities(), start_state.accelerations())?;
            trajectory.initialize_contacts(&parameters.contact_variable_initial_values, &parameters.contact_variable_goal_values)?;
            trajectory.set_goal_positions(&goal_joint_idxs, &goal_states[0])?;

            last_trial_succeeded = true;
            for (component, group) in planning_groups.iter().enumerate() {
                let info = match self.parallel_run_controller.run_attempt(&snapshot, &trajectory, group, &constraints, parameters.num_trajectories) {
                    Ok(result) => {
                        trajectory.merge_back(result.trajectory())?;
                        if !result.succeeded() {
                            optima_print(&format!("Group {:?} did not converge; keeping best effort trajectory (cost {:.6}).", group.name(), result.cost()), PrintMode::Println, PrintColor::Yellow, false, PrintVerbosity::Info);
                        }
                        PlanningInfo::new(result.elapsed().as_secs_f64(), result.iterations(), result.cost(), result.succeeded())
                    }
                    Err(OptimaError::NoFeasibleCandidate(s)) => {
                        optima_print(&s, PrintMode::Println, PrintColor::Red, false, PrintVerbosity::Info);
                        PlanningInfo::new(0.0, 0, f64::INFINITY, false)
                    }
                    Err(e) => {
                        self.trajectory = Some(trajectory);
                        return Err(e);
                    }
                };
                last_trial_succeeded &= info.succeeded();
                self.planning_infos.write(trial, component, info);
            }
        }

        if parameters.print_planning_info {
            self.planning_infos.print_summary();
        }
        trajectory.print_trajectory();
        self.planning_count += parameters.num_trials;

        let response = MotionPlanResponse {
            joint_names: robot_model_module.joint_names().clone(),
            trajectory: trajectory.to_timed_waypoints(),
            succeeded: last_trial_succeeded,
            planning_infos: self.planning_infos.clone()
        };
        self.trajectory = Some(trajectory);

        Ok(response)
    }
    fn template_matches(trajectory: &CIOTrajectory, num_joints: usize, parameters: &PlanningParameters) -> bool {
        trajectory.num_joints() == num_joints &&
            trajectory.duration() == parameters.trajectory_duration &&
            trajectory.discretization() == parameters.trajectory_discretization &&
            trajectory.contact_phase_duration() == parameters.phase_duration &&
            trajectory.num_contacts() == parameters.num_contacts
    }
    /// Full body trajectory produced by the last call to `plan`.
    pub fn trajectory(&self) -> Option<&CIOTrajectory> {
        self.trajectory.as_ref()
    }
    pub fn planning_infos(&self) -> &PlanningInfoCollection {
        &self.planning_infos
    }
    pub fn planning_count(&self) -> usize {
        self.planning_count
    }
    pub fn parameters_registry(&self) -> &Arc<PlanningParametersRegistry> {
        &self.parameters_registry
    }
}
