use nalgebra::DVector;
use optima_cio::planning_parameters::PlanningParameters;
use optima_cio::trajectory::CIOTrajectory;
use optima_cio::trajectory::trajectory_constraints::{AttemptConstraints, JointConstraint, WaypointConstraintSet};
use optima_cio::trajectory::trajectory_seeding::{SeedingStrategy, TrajectorySeeder};
use optima_cio::utils::utils_math::polynomial::QuinticPolynomial;
use optima_cio::utils::utils_robot::planning_group::{PlanningGroup, PlanningGroupJoint};
use optima_cio::utils::utils_splines::NaturalCubicSpline;

fn named_group(names: &[&str]) -> PlanningGroup {
    let joints = names.iter().enumerate().map(|(i, n)| PlanningGroupJoint::new(n, i)).collect();
    PlanningGroup::new("g", joints, 0)
}

fn start_to_goal(num_joints: usize, goal: &[f64]) -> CIOTrajectory {
    let mut full = CIOTrajectory::new(num_joints, 2.0, 0.1, 0, 0.5).unwrap();
    full.initialize_from_start_state(&DVector::zeros(num_joints), &DVector::zeros(num_joints), &DVector::zeros(num_joints)).unwrap();
    let all: Vec<usize> = (0..num_joints).collect();
    full.set_goal_positions(&all, &DVector::from_column_slice(goal)).unwrap();
    full
}

#[test]
fn quintic_matches_boundary_conditions() {
    let p = QuinticPolynomial::interpolation(0.5, 0.2, -1.0, 3.0, 2.5, 1.7, 0.4, -2.0);
    assert!((p.evaluate(0.5) - 0.2).abs() < 1e-9);
    assert!((p.derivative(0.5) + 1.0).abs() < 1e-9);
    assert!((p.second_derivative(0.5) - 3.0).abs() < 1e-9);
    assert!((p.evaluate(2.5) - 1.7).abs() < 1e-9);
    assert!((p.derivative(2.5) - 0.4).abs() < 1e-9);
    assert!((p.second_derivative(2.5) + 2.0).abs() < 1e-9);
}

#[test]
fn natural_spline_reproduces_its_knots() {
    let s = NaturalCubicSpline::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 2.0, 1.0, 3.0]).unwrap();
    for (x, y) in [(0.0, 0.0), (1.0, 2.0), (2.0, 1.0), (3.0, 3.0)] {
        assert!((s.interpolate(x) - y).abs() < 1e-9);
    }
}

#[test]
fn min_jerk_seed_is_monotone_and_bounded() {
    let full = start_to_goal(6, &[1.0; 6]);
    let group = named_group(&["x", "y", "z", "rx", "ry", "rz"]);
    let mut view = full.project(&group, 7, 6).unwrap();

    let strategy = TrajectorySeeder::new(&PlanningParameters::default(), None, None).seed_trajectory(&mut view, &group, 0, &AttemptConstraints::default()).unwrap();
    assert_eq!(strategy, SeedingStrategy::MinJerk);

    let mut merged = full.clone();
    merged.merge_back(&view).unwrap();
    for j in 0..6 {
        for i in 1..merged.num_points() {
            assert!(merged[(i, j)] >= merged[(i - 1, j)]);
            assert!(merged[(i, j)] <= 1.0 + 1e-12);
        }
        assert_eq!(merged[(0, j)], 0.0);
        assert_eq!(merged[(merged.num_points() - 1, j)], 1.0);
    }
}

#[test]
fn seeding_leaves_padding_untouched() {
    let full = start_to_goal(2, &[1.0, -1.0]);
    let group = named_group(&["a", "b"]);
    let mut view = full.project(&group, 7, 0).unwrap();
    let before = view.clone();

    TrajectorySeeder::new(&PlanningParameters::default(), None, None).fill_in_min_jerk(&mut view).unwrap();
    for i in (0..view.start_index()).chain(view.end_index() + 1..view.num_points()) {
        for j in 0..2 {
            assert_eq!(view[(i, j)], before[(i, j)]);
        }
    }
}

#[test]
fn waypoint_seed_follows_constrained_and_unconstrained_joints() {
    let full = start_to_goal(2, &[1.0, 2.0]);
    let group = named_group(&["a", "b"]);
    let mut view = full.project(&group, 7, 0).unwrap();

    let waypoints = vec![
        WaypointConstraintSet::new("0", vec![JointConstraint::new("a", 0.0)]),
        WaypointConstraintSet::new("via", vec![JointConstraint::new("a", 0.5)]),
        WaypointConstraintSet::new("via_again", vec![JointConstraint::new("a", 0.5)]),
        WaypointConstraintSet::new("end", vec![JointConstraint::new("a", 1.0)])
    ];
    let constraints = AttemptConstraints::new(waypoints, None);
    let strategy = TrajectorySeeder::new(&PlanningParameters::default(), None, None).seed_trajectory(&mut view, &group, 0, &constraints).unwrap();
    assert_eq!(strategy, SeedingStrategy::WaypointPath);

    let s = view.start_index() - 1;
    let e = view.end_index() + 1;
    for i in view.start_index()..=view.end_index() {
        let t = (i - s) as f64 / (e - s) as f64;
        assert!((view[(i, 0)] - t).abs() < 1e-9);
    }
    let mid = (s + e) / 2;
    assert!((view[(mid, 1)] - 1.0).abs() < 1e-9);
}

#[test]
fn waypoint_seed_passes_through_waypoints_at_their_arc_length() {
    let full = start_to_goal(1, &[3.0]);
    let group = named_group(&["a"]);
    let mut view = full.project(&group, 7, 0).unwrap();
    let s = view.start_index() - 1;
    let e = view.end_index() + 1;
    assert_eq!(e - s, 20);

    // cumulative distances 0, 2, 3, 5 put the inner waypoints at 8/20 and 12/20
    let waypoints = vec![
        WaypointConstraintSet::new("0", vec![JointConstraint::new("a", 0.0)]),
        WaypointConstraintSet::new("up", vec![JointConstraint::new("a", 2.0)]),
        WaypointConstraintSet::new("back", vec![JointConstraint::new("a", 1.0)]),
        WaypointConstraintSet::new("end", vec![JointConstraint::new("a", 3.0)])
    ];
    TrajectorySeeder::new(&PlanningParameters::default(), None, None).fill_in_min_jerk_with_waypoints(&mut view, &group, &waypoints).unwrap();

    assert!((view[(s + 8, 0)] - 2.0).abs() < 1e-9);
    assert!((view[(s + 12, 0)] - 1.0).abs() < 1e-9);
    assert_eq!(view[(s, 0)], 0.0);
    assert_eq!(view[(e, 0)], 3.0);
    assert!(view[(s + 1, 0)] > 0.0 && view[(s + 1, 0)] < 2.0);
    assert!(view[(e - 1, 0)] > 1.0 && view[(e - 1, 0)] < 3.0);
}

#[test]
fn waypoints_at_a_single_point_give_a_constant_seed() {
    let full = start_to_goal(1, &[1.0]);
    let group = named_group(&["a"]);
    let mut view = full.project(&group, 3, 0).unwrap();
    let waypoints = vec![
        WaypointConstraintSet::new("0", vec![JointConstraint::new("a", 0.3)]),
        WaypointConstraintSet::new("end", vec![JointConstraint::new("a", 0.3)])
    ];
    TrajectorySeeder::new(&PlanningParameters::default(), None, None).fill_in_min_jerk_with_waypoints(&mut view, &group, &waypoints).unwrap();
    for i in view.start_index()..=view.end_index() {
        assert_eq!(view[(i, 0)], 0.3);
    }
}

#[test]
fn cartesian_path_without_ik_solver_is_unsupported() {
    use nalgebra::{UnitQuaternion, Vector3};
    use optima_cio::trajectory::trajectory_constraints::CartesianPathConstraint;
    use optima_cio::utils::utils_errors::OptimaError;

    let full = start_to_goal(1, &[1.0]);
    let group = named_group(&["a"]);
    let mut view = full.project(&group, 3, 0).unwrap();
    let constraints = AttemptConstraints::new(vec![], Some(CartesianPathConstraint::new(Vector3::zeros(), Vector3::x(), UnitQuaternion::identity())));
    let res = TrajectorySeeder::new(&PlanningParameters::default(), None, None).seed_trajectory(&mut view, &group, 0, &constraints);
    assert!(matches!(res, Err(OptimaError::UnsupportedOperationError(_))));
}
