//! Two-resolution trajectory container.
//!
//! A `CIOTrajectory` stores joint positions at every fine time step together with contact
//! activation values that are held constant over coarser contact phases.  A full body trajectory
//! covers every robot joint; a restricted view (see [`CIOTrajectory::project`]) covers a single
//! planning group and is padded on both ends so that finite difference rules can be evaluated on
//! every interior step.

pub mod trajectory_constraints;
pub mod trajectory_seeding;

use std::ops::{Index, IndexMut};
use nalgebra::{DMatrix, DVector, Dynamic, MatrixSlice, MatrixSliceMut, U1};
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_robot::joint_index_map::JointIndexMap;
use crate::utils::utils_robot::planning_group::PlanningGroup;
use crate::utils::utils_robot::robot_generic_structures::TimedJointState;

pub type TrajectoryRow<'a> = MatrixSlice<'a, f64, U1, Dynamic, U1, Dynamic>;
pub type TrajectoryRowMut<'a> = MatrixSliceMut<'a, f64, U1, Dynamic, U1, Dynamic>;

const DURATION_TOLERANCE: f64 = 1e-6;

#[inline]
fn safe_to_int(a: f64) -> usize {
    (a + 1e-7) as usize
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CIOTrajectory {
    num_points: usize,
    num_joints: usize,
    discretization: f64,
    duration: f64,
    num_contacts: usize,
    contact_phase_duration: f64,
    num_contact_phases: usize,
    phase_stride: usize,
    start_index: usize,
    end_index: usize,
    /// num_points x num_joints
    trajectory: DMatrix<f64>,
    /// (num_contact_phases + 1) x num_contacts
    contact_trajectory: DMatrix<f64>,
    contact_start_points: Vec<usize>,
    start_velocities: DVector<f64>,
    start_accelerations: DVector<f64>,
    restriction: Option<TrajectoryRestriction>
}
impl CIOTrajectory {
    /// Creates a full body trajectory.  Fails with `InvalidDurationError` if `duration` is not a
    /// whole multiple of `discretization`, or if the contact phases do not tile the interior.
    pub fn new(num_joints: usize, duration: f64, discretization: f64, num_contacts: usize, contact_phase_duration: f64) -> Result<Self, OptimaError> {
        if !(duration > 0.0) || !(discretization > 0.0) || !(contact_phase_duration > 0.0) || !duration.is_finite() || !discretization.is_finite() {
            return Err(OptimaError::new_invalid_duration_error(duration, discretization, &format!("duration, discretization, and phase duration ({}) must be positive.", contact_phase_duration), file!(), line!()));
        }

        let num_points = safe_to_int(duration / discretization) + 1;
        let recomputed_duration = (num_points - 1) as f64 * discretization;
        if (recomputed_duration - duration).abs() > DURATION_TOLERANCE {
            return Err(OptimaError::new_invalid_duration_error(duration, discretization, &format!("duration is not a multiple of the discretization ({} steps cover {}).", num_points - 1, recomputed_duration), file!(), line!()));
        }
        if num_points < 3 {
            return Err(OptimaError::new_invalid_duration_error(duration, discretization, "trajectory needs at least one interior step.", file!(), line!()));
        }

        let phase_stride = safe_to_int(contact_phase_duration / discretization);
        if phase_stride == 0 {
            return Err(OptimaError::new_invalid_duration_error(duration, discretization, &format!("phase duration {} is shorter than one step.", contact_phase_duration), file!(), line!()));
        }
        let num_contact_phases = safe_to_int(duration / contact_phase_duration) + 2;

        let start_index = 1;
        let end_index = num_points - 2;
        let contact_start_points = Self::compute_contact_start_points(start_index, end_index, phase_stride);
        if contact_start_points.len() != num_contact_phases {
            return Err(OptimaError::new_invalid_duration_error(duration, discretization, &format!("phase duration {} gives {} phase boundaries but {} contact phases.", contact_phase_duration, contact_start_points.len(), num_contact_phases), file!(), line!()));
        }

        Ok(Self {
            num_points,
            num_joints,
            discretization,
            duration,
            num_contacts,
            contact_phase_duration,
            num_contact_phases,
            phase_stride,
            start_index,
            end_index,
            trajectory: DMatrix::zeros(num_points, num_joints),
            contact_trajectory: DMatrix::zeros(num_contact_phases + 1, num_contacts),
            contact_start_points,
            start_velocities: DVector::zeros(num_joints),
            start_accelerations: DVector::zeros(num_joints),
            restriction: None
        })
    }
    fn compute_contact_start_points(start_index: usize, end_index: usize, phase_stride: usize) -> Vec<usize> {
        let mut out_vec = vec![0];
        let mut i = start_index;
        while i <= end_index {
            out_vec.push(i);
            i += phase_stride;
        }
        out_vec.push(end_index + 1);
        out_vec
    }

    /// Builds the restricted view of this full body trajectory for `group`.
    ///
    /// The view keeps the same interior steps, widened to `diff_rule_length - 1` padding steps on
    /// each end.  Padding copies the boundary value, except the leading padding of joints with a
    /// full body index below `root_joint_threshold`, which is extrapolated backwards from the
    /// cached start velocity and acceleration.
    pub fn project(&self, group: &PlanningGroup, diff_rule_length: usize, root_joint_threshold: usize) -> Result<CIOTrajectory, OptimaError> {
        if self.restriction.is_some() {
            return Err(OptimaError::new_unsupported_operation_error("project", "cannot project a trajectory that is already restricted to a planning group.", file!(), line!()));
        }
        let joint_index_map = JointIndexMap::new(group, self.num_joints)?;

        let num_trailing_source = (self.num_points - 1) - self.end_index;
        if diff_rule_length < 1 + self.start_index.max(num_trailing_source) {
            return Err(OptimaError::new_unsupported_operation_error("project", &format!("diff rule length {} is too short for the source padding.", diff_rule_length), file!(), line!()));
        }

        let start_extra = (diff_rule_length - 1) - self.start_index;
        let end_extra = (diff_rule_length - 1) - num_trailing_source;

        let num_points = self.num_points + start_extra + end_extra;
        let start_index = diff_rule_length - 1;
        let end_index = (num_points - 1) - (diff_rule_length - 1);
        let num_joints = group.num_joints();

        let mut full_trajectory_index = Vec::with_capacity(num_points);
        for i in 0..num_points {
            let source_point = (i as i64 - start_extra as i64).clamp(0, self.num_points as i64 - 1);
            full_trajectory_index.push(source_point as usize);
        }

        let mut trajectory = DMatrix::zeros(num_points, num_joints);
        for i in 0..num_points {
            let source_point = full_trajectory_index[i];
            for j in 0..num_joints {
                trajectory[(i, j)] = self.trajectory[(source_point, joint_index_map.full_idx(j))];
            }
        }

        let mut start_velocities = DVector::zeros(num_joints);
        let mut start_accelerations = DVector::zeros(num_joints);
        for j in 0..num_joints {
            let source_joint = joint_index_map.full_idx(j);
            start_velocities[j] = self.start_velocities[source_joint];
            start_accelerations[j] = self.start_accelerations[source_joint];

            if source_joint < root_joint_threshold {
                let mut pos = self.trajectory[(0, source_joint)];
                let mut vel = self.start_velocities[source_joint];
                let acc = self.start_accelerations[source_joint];
                for i in (0..start_extra).rev() {
                    let new_vel = vel - acc * self.discretization;
                    let new_pos = pos - vel * self.discretization;
                    trajectory[(i, j)] = new_pos;
                    vel = new_vel;
                    pos = new_pos;
                }
            }
        }

        let contact_start_points = Self::compute_contact_start_points(start_index, end_index, self.phase_stride);
        debug_assert_eq!(contact_start_points.len(), self.num_contact_phases);

        Ok(CIOTrajectory {
            num_points,
            num_joints,
            discretization: self.discretization,
            duration: self.duration,
            num_contacts: self.num_contacts,
            contact_phase_duration: self.contact_phase_duration,
            num_contact_phases: self.num_contact_phases,
            phase_stride: self.phase_stride,
            start_index,
            end_index,
            trajectory,
            contact_trajectory: self.contact_trajectory.clone(),
            contact_start_points,
            start_velocities,
            start_accelerations,
            restriction: Some(TrajectoryRestriction {
                joint_index_map,
                full_trajectory_index,
                num_group_contacts: group.num_contacts(),
                diff_rule_length
            })
        })
    }
    /// Copies the interior of a restricted view (and the free contact phases of the group's
    /// contacts) back into this full body trajectory.  Padding steps of the view are ignored.
    pub fn merge_back(&mut self, group_trajectory: &CIOTrajectory) -> Result<(), OptimaError> {
        let restriction = self.check_mergeable(group_trajectory)?;

        let num_vars_free = self.num_interior_points();
        for i in 0..group_trajectory.num_joints {
            let target_joint = restriction.joint_index_map.full_idx(i);
            for k in 0..num_vars_free {
                self.trajectory[(self.start_index + k, target_joint)] = group_trajectory.trajectory[(group_trajectory.start_index + k, i)];
            }
        }

        if self.num_contact_phases >= 3 {
            let contact_start_index = 1;
            let contact_end_index = self.num_contact_phases - 2;
            let num_contacts = restriction.num_group_contacts.min(self.num_contacts).min(group_trajectory.num_contacts);
            for c in 0..num_contacts {
                for p in contact_start_index..=contact_end_index {
                    self.contact_trajectory[(p, c)] = group_trajectory.contact_trajectory[(p, c)];
                }
            }
        }

        Ok(())
    }
    /// Copies a single interior sample of one group joint back into this full body trajectory.
    /// `point_index` counts from the first interior step.
    pub fn merge_back_point(&mut self, group_trajectory: &CIOTrajectory, point_index: usize, joint_index: usize) -> Result<(), OptimaError> {
        let restriction = self.check_mergeable(group_trajectory)?;
        OptimaError::new_check_for_idx_out_of_bound_error(point_index, self.num_interior_points(), file!(), line!())?;
        OptimaError::new_check_for_idx_out_of_bound_error(joint_index, group_trajectory.num_joints, file!(), line!())?;

        let target_joint = restriction.joint_index_map.full_idx(joint_index);
        self.trajectory[(self.start_index + point_index, target_joint)] = group_trajectory.trajectory[(group_trajectory.start_index + point_index, joint_index)];

        Ok(())
    }
    fn check_mergeable<'a>(&self, group_trajectory: &'a CIOTrajectory) -> Result<&'a TrajectoryRestriction, OptimaError> {
        if self.restriction.is_some() {
            return Err(OptimaError::new_unsupported_operation_error("merge_back", "target of a merge must be a full body trajectory.", file!(), line!()));
        }
        let restriction = match &group_trajectory.restriction {
            None => { return Err(OptimaError::new_unsupported_operation_error("merge_back", "source of a merge must be a restricted trajectory.", file!(), line!())); }
            Some(r) => { r }
        };
        if restriction.joint_index_map.num_full_body_joints() != self.num_joints {
            return Err(OptimaError::new_invalid_group_error(restriction.joint_index_map.group_name(), &format!("group was projected from a trajectory with {} joints, not {}.", restriction.joint_index_map.num_full_body_joints(), self.num_joints), file!(), line!()));
        }
        if group_trajectory.num_interior_points() != self.num_interior_points() {
            return Err(OptimaError::new_unsupported_operation_error("merge_back", &format!("interior lengths differ ({} vs {}).", group_trajectory.num_interior_points(), self.num_interior_points()), file!(), line!()));
        }
        Ok(restriction)
    }

    /// Writes `positions` into every step and caches the start velocities/accelerations.
    pub fn initialize_from_start_state(&mut self, positions: &DVector<f64>, velocities: &DVector<f64>, accelerations: &DVector<f64>) -> Result<(), OptimaError> {
        for v in [positions, velocities, accelerations] {
            if v.len() != self.num_joints {
                return Err(OptimaError::new_generic_error_str(&format!("start state has {} entries but the trajectory has {} joints.", v.len(), self.num_joints), file!(), line!()));
            }
        }
        for i in 0..self.num_points {
            self.trajectory.set_row(i, &positions.transpose());
        }
        self.start_velocities = velocities.clone();
        self.start_accelerations = accelerations.clone();
        Ok(())
    }
    /// First contact row takes `initial_values`, the last takes `goal_values`, and every phase
    /// in between starts out at `initial_values`.
    pub fn initialize_contacts(&mut self, initial_values: &Vec<f64>, goal_values: &Vec<f64>) -> Result<(), OptimaError> {
        if initial_values.len() < self.num_contacts || goal_values.len() < self.num_contacts {
            return Err(OptimaError::new_generic_error_str(&format!("need {} initial and goal contact values.", self.num_contacts), file!(), line!()));
        }
        for c in 0..self.num_contacts {
            for p in 0..self.num_contact_phases {
                self.contact_trajectory[(p, c)] = initial_values[c];
            }
            self.contact_trajectory[(self.num_contact_phases, c)] = goal_values[c];
        }
        Ok(())
    }
    /// Sets the goal (last step) positions of the given full body joints.
    pub fn set_goal_positions(&mut self, full_body_joint_idxs: &Vec<usize>, goal_state: &DVector<f64>) -> Result<(), OptimaError> {
        let goal_index = self.num_points - 1;
        for idx in full_body_joint_idxs {
            OptimaError::new_check_for_idx_out_of_bound_error(*idx, self.num_joints, file!(), line!())?;
            OptimaError::new_check_for_idx_out_of_bound_error(*idx, goal_state.len(), file!(), line!())?;
            self.trajectory[(goal_index, *idx)] = goal_state[*idx];
        }
        Ok(())
    }

    pub fn trajectory_point(&self, step: usize) -> TrajectoryRow<'_> {
        self.trajectory.row(step)
    }
    pub fn trajectory_point_mut(&mut self, step: usize) -> TrajectoryRowMut<'_> {
        self.trajectory.row_mut(step)
    }
    pub fn trajectory_point_as_vector(&self, step: usize) -> DVector<f64> {
        self.trajectory.row(step).transpose()
    }
    pub fn contact_point(&self, phase: usize) -> TrajectoryRow<'_> {
        self.contact_trajectory.row(phase)
    }
    pub fn contact_point_mut(&mut self, phase: usize) -> TrajectoryRowMut<'_> {
        self.contact_trajectory.row_mut(phase)
    }
    /// Time-stamped joint vectors for every step, for handing the trajectory to the host.
    pub fn to_timed_waypoints(&self) -> Vec<TimedJointState> {
        let mut out_vec = vec![];
        for i in 0..self.num_points {
            out_vec.push(TimedJointState::new(self.trajectory_point_as_vector(i), i as f64 * self.discretization));
        }
        out_vec
    }
    /// Dumps every step at `Debug` verbosity.
    pub fn print_trajectory(&self) {
        if !PrintVerbosity::Debug.is_enabled() { return; }
        optima_print("Full Trajectory", PrintMode::Println, PrintColor::Cyan, true, PrintVerbosity::Debug);
        for i in 0..self.num_points {
            let mut s = format!("{} : ", i);
            for j in 0..self.num_joints {
                s += &format!("{:.6} ", self.trajectory[(i, j)]);
            }
            optima_print(&s, PrintMode::Println, PrintColor::None, false, PrintVerbosity::Debug);
        }
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }
    pub fn num_joints(&self) -> usize {
        self.num_joints
    }
    pub fn discretization(&self) -> f64 {
        self.discretization
    }
    pub fn duration(&self) -> f64 {
        self.duration
    }
    pub fn num_contacts(&self) -> usize {
        self.num_contacts
    }
    pub fn contact_phase_duration(&self) -> f64 {
        self.contact_phase_duration
    }
    pub fn num_contact_phases(&self) -> usize {
        self.num_contact_phases
    }
    pub fn phase_stride(&self) -> usize {
        self.phase_stride
    }
    pub fn start_index(&self) -> usize {
        self.start_index
    }
    pub fn end_index(&self) -> usize {
        self.end_index
    }
    pub fn num_interior_points(&self) -> usize {
        self.end_index - self.start_index + 1
    }
    pub fn contact_start_points(&self) -> &Vec<usize> {
        &self.contact_start_points
    }
    pub fn trajectory(&self) -> &DMatrix<f64> {
        &self.trajectory
    }
    pub fn trajectory_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.trajectory
    }
    pub fn contact_trajectory(&self) -> &DMatrix<f64> {
        &self.contact_trajectory
    }
    pub fn start_velocities(&self) -> &DVector<f64> {
        &self.start_velocities
    }
    pub fn start_accelerations(&self) -> &DVector<f64> {
        &self.start_accelerations
    }
    pub fn is_restricted(&self) -> bool {
        self.restriction.is_some()
    }
    pub fn joint_index_map(&self) -> Option<&JointIndexMap> {
        self.restriction.as_ref().map(|r| &r.joint_index_map)
    }
    pub fn full_trajectory_index(&self) -> Option<&Vec<usize>> {
        self.restriction.as_ref().map(|r| &r.full_trajectory_index)
    }
    pub fn diff_rule_length(&self) -> Option<usize> {
        self.restriction.as_ref().map(|r| r.diff_rule_length)
    }
    /// Full body index of local column `joint_idx` (identity for full body trajectories).
    pub fn full_body_joint_idx(&self, joint_idx: usize) -> usize {
        match &self.restriction {
            None => { joint_idx }
            Some(r) => { r.joint_index_map.full_idx(joint_idx) }
        }
    }
    /// Local column of full body joint `full_idx`, if this trajectory covers it.
    pub fn local_joint_idx(&self, full_idx: usize) -> Option<usize> {
        match &self.restriction {
            None => { if full_idx < self.num_joints { Some(full_idx) } else { None } }
            Some(r) => { r.joint_index_map.group_idx(full_idx) }
        }
    }
}
impl Index<(usize, usize)> for CIOTrajectory {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.trajectory[index]
    }
}
impl IndexMut<(usize, usize)> for CIOTrajectory {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.trajectory[index]
    }
}

/// Bookkeeping that ties a restricted view to the full body trajectory it was projected from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryRestriction {
    joint_index_map: JointIndexMap,
    /// For every step of the view, the clamped step of the source trajectory it was copied from.
    full_trajectory_index: Vec<usize>,
    num_group_contacts: usize,
    diff_rule_length: usize
}
