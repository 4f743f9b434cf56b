use std::f64::consts::FRAC_PI_2;
use nalgebra::{DVector, Isometry3, Translation3};
use rand::Rng;
use serde::{Serialize, Deserialize};
use strum_macros::{Display, EnumIter};
use crate::planning_capabilities::{CollisionChecker, InverseKinematicsSolver};
use crate::planning_parameters::PlanningParameters;
use crate::trajectory::CIOTrajectory;
use crate::trajectory::trajectory_constraints::{AttemptConstraints, CartesianPathConstraint, WaypointConstraintSet};
use crate::utils::utils_console::{optima_print, PrintColor, PrintMode, PrintVerbosity};
use crate::utils::utils_errors::OptimaError;
use crate::utils::utils_math::interpolation::SimpleInterpolationUtils;
use crate::utils::utils_math::polynomial::QuinticPolynomial;
use crate::utils::utils_robot::planning_group::PlanningGroup;
use crate::utils::utils_sampling::SimpleSamplers;
use crate::utils::utils_splines::NaturalCubicSpline;

const PLANAR_MOTION_EPSILON: f64 = 1e-7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum SeedingStrategy {
    WaypointPath,
    MinJerk,
    CartesianPath
}

/// Fills the interior of a restricted trajectory with an initial guess.  Only steps in
/// `[start_index, end_index]` are written; the padding rows on both ends act as boundary values.
pub struct TrajectorySeeder<'a> {
    root_joint_threshold: usize,
    has_root_6d: bool,
    yaw_joint_index: usize,
    max_ik_attempts: usize,
    ik_solver: Option<&'a dyn InverseKinematicsSolver>,
    collision_checker: Option<&'a dyn CollisionChecker>
}
impl<'a> TrajectorySeeder<'a> {
    pub fn new(parameters: &PlanningParameters, ik_solver: Option<&'a dyn InverseKinematicsSolver>, collision_checker: Option<&'a dyn CollisionChecker>) -> Self {
        Self {
            root_joint_threshold: parameters.root_joint_threshold,
            has_root_6d: parameters.has_root_6d,
            yaw_joint_index: parameters.yaw_joint_index,
            max_ik_attempts: parameters.max_ik_attempts,
            ik_solver,
            collision_checker
        }
    }
    /// Waypoints win over a Cartesian path, and a Cartesian path wins over plain min-jerk.
    pub fn select_strategy(constraints: &AttemptConstraints, candidate_idx: usize) -> SeedingStrategy {
        if constraints.waypoint_range_for_candidate(candidate_idx).is_some() {
            return SeedingStrategy::WaypointPath;
        }
        return match constraints.cartesian_path() {
            None => { SeedingStrategy::MinJerk }
            Some(_) => { SeedingStrategy::CartesianPath }
        }
    }
    pub fn seed_trajectory(&self, trajectory: &mut CIOTrajectory, group: &PlanningGroup, candidate_idx: usize, constraints: &AttemptConstraints) -> Result<SeedingStrategy, OptimaError> {
        let strategy = Self::select_strategy(constraints, candidate_idx);
        optima_print(&format!("Seeding candidate {} of group {:?} with {}.", candidate_idx, group.name(), strategy), PrintMode::Println, PrintColor::None, false, PrintVerbosity::Debug);

        match strategy {
            SeedingStrategy::WaypointPath => {
                let (begin, end) = constraints.waypoint_range_for_candidate(candidate_idx).ok_or(OptimaError::new_generic_error_str("no waypoints for candidate.", file!(), line!()))?;
                self.fill_in_min_jerk_with_waypoints(trajectory, group, &constraints.waypoint_constraints()[begin..end])?;
            }
            SeedingStrategy::MinJerk => {
                self.fill_in_min_jerk(trajectory)?;
            }
            SeedingStrategy::CartesianPath => {
                let path = constraints.cartesian_path().ok_or(OptimaError::new_generic_error_str("no cartesian path.", file!(), line!()))?;
                self.fill_in_min_jerk_cartesian(trajectory, path)?;
            }
        }

        Ok(strategy)
    }

    /// Per-joint quintic from the leading boundary state to the trailing boundary value at rest.
    /// Root joints start with the cached start velocity and acceleration; all others start at
    /// rest.  With a 6D root that translates in the plane, the yaw joint is instead turned to
    /// face the direction of travel between the first and last contact phases.
    pub fn fill_in_min_jerk(&self, trajectory: &mut CIOTrajectory) -> Result<(), OptimaError> {
        let (s, e) = Self::boundary_steps(trajectory)?;
        let dt = trajectory.discretization();
        let total_time = (e - s) as f64 * dt;
        let yaw_joint = self.planar_yaw_joint(trajectory);

        for j in 0..trajectory.num_joints() {
            if yaw_joint.map(|y| y.0) == Some(j) { continue; }

            let (v0, a0) = self.start_derivatives(trajectory, j);
            let poly = QuinticPolynomial::min_jerk_to_rest(0.0, trajectory[(s, j)], v0, a0, total_time, trajectory[(e, j)]);
            for i in s + 1..e {
                trajectory[(i, j)] = poly.evaluate((i - s) as f64 * dt);
            }
        }

        if let Some((yaw, heading)) = yaw_joint {
            self.fill_in_yaw(trajectory, yaw, heading);
        }

        Ok(())
    }
    fn fill_in_yaw(&self, trajectory: &mut CIOTrajectory, yaw: usize, heading: f64) {
        let (s, e) = (trajectory.start_index() - 1, trajectory.end_index() + 1);
        let dt = trajectory.discretization();
        let b = trajectory.contact_start_points().clone();
        let n = b.len();

        let knot_steps = [s, b[2] - 1, b[n - 3] - 1, b[n - 2] - 1, e - 1];
        let knot_values = [trajectory[(s, yaw)], heading, heading, trajectory[(e, yaw)], trajectory[(e, yaw)]];

        for seg in 0..knot_steps.len() - 1 {
            let seg_start = knot_steps[seg];
            let seg_end = knot_steps[seg + 1];
            if seg_end <= seg_start { continue; }

            let (v0, a0) = if seg == 0 { (trajectory.start_velocities()[yaw], trajectory.start_accelerations()[yaw]) } else { (0.0, 0.0) };
            let poly = QuinticPolynomial::min_jerk_to_rest(0.0, knot_values[seg], v0, a0, (seg_end - seg_start) as f64 * dt, knot_values[seg + 1]);
            for i in seg_start + 1..=seg_end {
                trajectory[(i, yaw)] = poly.evaluate((i - seg_start) as f64 * dt);
            }
        }
    }
    /// Local yaw column and heading, when the trajectory has a planar-translating 6D root.
    fn planar_yaw_joint(&self, trajectory: &CIOTrajectory) -> Option<(usize, f64)> {
        if !self.has_root_6d || trajectory.contact_start_points().len() < 5 { return None; }

        let yaw = trajectory.local_joint_idx(self.yaw_joint_index)?;
        let x = trajectory.local_joint_idx(0)?;
        let y = trajectory.local_joint_idx(1)?;
        let (s, e) = (trajectory.start_index() - 1, trajectory.end_index() + 1);

        let dx = trajectory[(e, x)] - trajectory[(s, x)];
        let dy = trajectory[(e, y)] - trajectory[(s, y)];
        if dx.abs() <= PLANAR_MOTION_EPSILON && dy.abs() <= PLANAR_MOTION_EPSILON { return None; }

        Some((yaw, dy.atan2(dx) - FRAC_PI_2))
    }

    /// Seeds from an ordered run of waypoint sets.  Every joint named in the first set follows a
    /// natural cubic spline through the waypoint values, parameterized by cumulative distance in
    /// the space of constrained joints; every other joint follows a rest-to-rest quintic between
    /// the boundary values.
    pub fn fill_in_min_jerk_with_waypoints(&self, trajectory: &mut CIOTrajectory, group: &PlanningGroup, waypoints: &[WaypointConstraintSet]) -> Result<(), OptimaError> {
        if waypoints.is_empty() {
            return Err(OptimaError::new_generic_error_str("waypoint seeding needs at least one waypoint set.", file!(), line!()));
        }
        if group.num_joints() != trajectory.num_joints() {
            return Err(OptimaError::new_invalid_group_error(group.name(), &format!("group has {} joints but the trajectory has {}.", group.num_joints(), trajectory.num_joints()), file!(), line!()));
        }
        let (s, e) = Self::boundary_steps(trajectory)?;

        let constrained_names: Vec<&str> = waypoints[0].joint_constraints().iter().map(|c| c.joint_name()).collect();
        let mut points = vec![];
        for w in waypoints {
            let mut point = DVector::zeros(constrained_names.len());
            for (k, name) in constrained_names.iter().enumerate() {
                point[k] = w.position_of(name).ok_or(OptimaError::new_generic_error_str(&format!("waypoint {:?} has no value for joint {:?}.", w.name(), name), file!(), line!()))?;
            }
            points.push(point);
        }
        let distances = SimpleInterpolationUtils::cumulative_distances(&points);
        let total_distance = distances[distances.len() - 1];

        for j in 0..trajectory.num_joints() {
            let joint_name = group.group_joints()[j].joint_name();
            match constrained_names.iter().position(|n| *n == joint_name) {
                None => {
                    let poly = QuinticPolynomial::rest_to_rest_normalized(trajectory[(s, j)], trajectory[(e, j)]);
                    for i in s + 1..e {
                        trajectory[(i, j)] = poly.evaluate_normalized(SimpleInterpolationUtils::normalized_index(i, s, e));
                    }
                }
                Some(k) => {
                    let mut knots_x: Vec<f64> = vec![];
                    let mut knots_y = vec![];
                    for (m, d) in distances.iter().enumerate() {
                        // zero length segments collapse onto the previous knot
                        if knots_x.last().map_or(true, |last| *d > *last) {
                            knots_x.push(*d);
                            knots_y.push(points[m][k]);
                        }
                    }

                    if knots_x.len() < 2 {
                        for i in s + 1..e {
                            trajectory[(i, j)] = knots_y[0];
                        }
                    } else {
                        let spline = NaturalCubicSpline::new(knots_x, knots_y)?;
                        for i in s + 1..e {
                            trajectory[(i, j)] = spline.interpolate(SimpleInterpolationUtils::normalized_index(i, s, e) * total_distance);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Moves the end effector along a straight line with a rest-to-rest quintic time scaling and
    /// asks the inverse kinematics solver for each interior step, seeding it from the previously
    /// accepted configuration.  Solutions that collide are retried up to `max_ik_attempts` times.
    pub fn fill_in_min_jerk_cartesian(&self, trajectory: &mut CIOTrajectory, path: &CartesianPathConstraint) -> Result<(), OptimaError> {
        let ik_solver = self.ik_solver.ok_or(OptimaError::new_unsupported_operation_error("fill_in_min_jerk_cartesian", "cartesian seeding needs an inverse kinematics solver.", file!(), line!()))?;
        let (s, e) = Self::boundary_steps(trajectory)?;

        let axis_polys: Vec<QuinticPolynomial> = (0..3).map(|a| QuinticPolynomial::rest_to_rest_normalized(path.start_position()[a], path.goal_position()[a])).collect();
        let mut seed_state = trajectory.trajectory_point_as_vector(s);

        for i in s + 1..e {
            let t = SimpleInterpolationUtils::normalized_index(i, s, e);
            let translation = Translation3::new(axis_polys[0].evaluate_normalized(t), axis_polys[1].evaluate_normalized(t), axis_polys[2].evaluate_normalized(t));
            let target_pose = Isometry3::from_parts(translation, *path.orientation());

            let mut solution = None;
            for attempt in 0..self.max_ik_attempts {
                match ik_solver.solve_ik(&target_pose, &seed_state) {
                    None => { continue; }
                    Some(q) => {
                        if q.len() != trajectory.num_joints() {
                            return Err(OptimaError::new_generic_error_str(&format!("inverse kinematics returned {} values for a {} joint trajectory.", q.len(), trajectory.num_joints()), file!(), line!()));
                        }
                        if let Some(c) = self.collision_checker {
                            if c.is_colliding(&q) {
                                optima_print(&format!("IK solution for step {} collides (attempt {}).", i, attempt), PrintMode::Println, PrintColor::Yellow, false, PrintVerbosity::Debug);
                                continue;
                            }
                        }
                        solution = Some(q);
                        break;
                    }
                }
            }

            let q = solution.ok_or(OptimaError::new_seeding_failure(i, self.max_ik_attempts, file!(), line!()))?;
            trajectory.trajectory_point_mut(i).copy_from(&q.transpose());
            seed_state = q;
        }

        Ok(())
    }

    /// Adds zero mean gaussian noise to every interior value.
    pub fn perturb_interior<R: Rng>(trajectory: &mut CIOTrajectory, standard_deviation: f64, rng: &mut R) {
        if !(standard_deviation > 0.0) { return; }
        for i in trajectory.start_index()..=trajectory.end_index() {
            for j in 0..trajectory.num_joints() {
                trajectory[(i, j)] += SimpleSamplers::zero_mean_normal_sample(standard_deviation, rng);
            }
        }
    }

    fn boundary_steps(trajectory: &CIOTrajectory) -> Result<(usize, usize), OptimaError> {
        if trajectory.start_index() == 0 || trajectory.end_index() + 1 >= trajectory.num_points() {
            return Err(OptimaError::new_unsupported_operation_error("seed_trajectory", "trajectory has no boundary padding around its interior.", file!(), line!()));
        }
        Ok((trajectory.start_index() - 1, trajectory.end_index() + 1))
    }
    fn start_derivatives(&self, trajectory: &CIOTrajectory, joint_idx: usize) -> (f64, f64) {
        return if trajectory.full_body_joint_idx(joint_idx) < self.root_joint_threshold {
            (trajectory.start_velocities()[joint_idx], trajectory.start_accelerations()[joint_idx])
        } else {
            (0.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use nalgebra::{UnitQuaternion, Vector3};
    use strum::IntoEnumIterator;
    use crate::utils::utils_robot::planning_group::PlanningGroupJoint;

    fn root_group(num_joints: usize) -> PlanningGroup {
        let joints = (0..num_joints).map(|i| PlanningGroupJoint::new(&format!("j{}", i), i)).collect();
        PlanningGroup::new("root", joints, 0)
    }

    #[test]
    fn planar_root_turns_to_face_travel_direction() {
        let mut full = CIOTrajectory::new(6, 2.0, 0.1, 0, 0.5).unwrap();
        let last = full.num_points() - 1;
        full[(last, 1)] = 1.0;
        let group = root_group(6);
        let mut view = full.project(&group, 7, 6).unwrap();

        let mut params = PlanningParameters::default();
        params.has_root_6d = true;
        TrajectorySeeder::new(&params, None, None).fill_in_min_jerk(&mut view).unwrap();

        // moving along +y means a heading of atan2(1, 0) - pi/2 = 0, so yaw stays at 0
        for i in view.start_index()..=view.end_index() {
            assert!(view[(i, 5)].abs() < 1e-12);
        }

        let mut full = CIOTrajectory::new(6, 2.0, 0.1, 0, 0.5).unwrap();
        full[(last, 0)] = 1.0;
        let mut view = full.project(&group, 7, 6).unwrap();
        TrajectorySeeder::new(&params, None, None).fill_in_min_jerk(&mut view).unwrap();
        let b = view.contact_start_points().clone();
        assert!((view[(b[2] - 1, 5)] + FRAC_PI_2).abs() < 1e-12);
        assert!(view[(view.end_index(), 5)].abs() < 1e-12);
    }

    struct CountingIk {
        calls: AtomicUsize
    }
    impl InverseKinematicsSolver for CountingIk {
        fn solve_ik(&self, target_pose: &Isometry3<f64>, _seed_state: &DVector<f64>) -> Option<DVector<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let t = target_pose.translation.vector;
            Some(DVector::from_vec(vec![t[0], t[1]]))
        }
    }

    struct AlwaysColliding;
    impl CollisionChecker for AlwaysColliding {
        fn is_colliding(&self, _joint_state: &DVector<f64>) -> bool { true }
    }

    #[test]
    fn cartesian_seeding_tracks_line() {
        let full = CIOTrajectory::new(2, 1.0, 0.1, 0, 0.5).unwrap();
        let mut view = full.project(&root_group(2), 3, 0).unwrap();
        let ik = CountingIk { calls: AtomicUsize::new(0) };
        let path = CartesianPathConstraint::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 0.0), UnitQuaternion::identity());

        TrajectorySeeder::new(&PlanningParameters::default(), Some(&ik), None).fill_in_min_jerk_cartesian(&mut view, &path).unwrap();

        assert_eq!(ik.calls.load(Ordering::SeqCst), view.num_interior_points());
        for i in view.start_index()..=view.end_index() {
            assert!((view[(i, 1)] - 2.0 * view[(i, 0)]).abs() < 1e-12);
        }
    }

    #[test]
    fn colliding_ik_solutions_exhaust_the_attempt_cap() {
        let full = CIOTrajectory::new(2, 1.0, 0.1, 0, 0.5).unwrap();
        let mut view = full.project(&root_group(2), 3, 0).unwrap();
        let ik = CountingIk { calls: AtomicUsize::new(0) };
        let path = CartesianPathConstraint::new(Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0), UnitQuaternion::identity());
        let mut params = PlanningParameters::default();
        params.max_ik_attempts = 5;

        let res = TrajectorySeeder::new(&params, Some(&ik), Some(&AlwaysColliding)).fill_in_min_jerk_cartesian(&mut view, &path);
        assert!(matches!(res, Err(OptimaError::SeedingFailure(_))));
        assert_eq!(ik.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn strategy_priority() {
        let path = CartesianPathConstraint::new(Vector3::zeros(), Vector3::zeros(), UnitQuaternion::identity());
        assert_eq!(TrajectorySeeder::select_strategy(&AttemptConstraints::default(), 0), SeedingStrategy::MinJerk);
        assert_eq!(TrajectorySeeder::select_strategy(&AttemptConstraints::new(vec![], Some(path.clone())), 0), SeedingStrategy::CartesianPath);
        let w = WaypointConstraintSet::new("0", vec![]);
        assert_eq!(TrajectorySeeder::select_strategy(&AttemptConstraints::new(vec![w], Some(path)), 0), SeedingStrategy::WaypointPath);
        assert_eq!(SeedingStrategy::iter().count(), 3);
    }
}
