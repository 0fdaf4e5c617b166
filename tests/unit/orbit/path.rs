use super::*;
use approx::assert_relative_eq;
use std::f64::consts::PI;

fn scenario() -> OrbitSpec {
    OrbitSpec {
        origin: Vector3::ZERO,
        start_offset: Vector3::new(13.0, 2.0, 3.0),
        angular_step_degrees: 0.5,
        frame_count: 3,
    }
}

#[test]
fn initial_state_is_spherical_start_offset() {
    let s = initial_state(&scenario()).delta;
    assert_relative_eq!(s.radius, 13.454, epsilon = 1e-3);
    assert_relative_eq!(s.polar, 1.347, epsilon = 1e-3);
    assert_relative_eq!(s.azimuth, 0.1532, epsilon = 1e-4);
}

#[test]
fn first_frame_is_start_position() {
    let tasks = plan_path(&scenario());
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].index, FrameIndex(0));
    assert_eq!(tasks[0].lookat, Vector3::ZERO);
    assert_relative_eq!(tasks[0].lookfrom.x, 13.0, epsilon = 1e-12);
    assert_relative_eq!(tasks[0].lookfrom.y, 2.0, epsilon = 1e-12);
    assert_relative_eq!(tasks[0].lookfrom.z, 3.0, epsilon = 1e-12);
}

#[test]
fn advance_steps_only_the_polar_angle() {
    let spec = scenario();
    let s0 = initial_state(&spec);
    let (_, s1) = advance(s0, &spec);
    assert_relative_eq!(s1.delta.polar - s0.delta.polar, 0.008727, epsilon = 1e-6);
    assert_eq!(s1.delta.radius, s0.delta.radius);
    assert_eq!(s1.delta.azimuth, s0.delta.azimuth);

    let (d1, _) = advance(s1, &spec);
    assert_relative_eq!(d1.length(), s0.delta.radius, epsilon = 1e-9);
}

#[test]
fn polar_angle_grows_linearly_with_steps() {
    let spec = OrbitSpec {
        angular_step_degrees: -7.25,
        ..scenario()
    };
    let start = initial_state(&spec);
    let mut state = start;
    for k in 1..=500u32 {
        state = advance(state, &spec).1;
        let expected = start.delta.polar + f64::from(k) * -7.25 * PI / 180.0;
        assert_relative_eq!(state.delta.polar, expected, epsilon = 1e-9);
    }
    assert_eq!(state.delta.radius, start.delta.radius);
    assert_eq!(state.delta.azimuth, start.delta.azimuth);
}

#[test]
fn path_passes_through_poles_without_error() {
    let spec = OrbitSpec {
        origin: Vector3::new(1.0, 1.0, 1.0),
        start_offset: Vector3::new(0.0, 0.0, 10.0),
        angular_step_degrees: 45.0,
        frame_count: 17,
    };
    let tasks = plan_path(&spec);
    assert_eq!(tasks.len(), 17);
    for t in &tasks {
        assert!(t.lookfrom.is_finite());
        assert_relative_eq!((t.lookfrom - spec.origin).length(), 10.0, epsilon = 1e-9);
    }
    // Half a turn puts the camera under the south pole.
    assert_relative_eq!(tasks[4].lookfrom.z, -9.0, epsilon = 1e-9);
    // A full turn comes back to the start.
    assert_relative_eq!(tasks[8].lookfrom.z, tasks[0].lookfrom.z, epsilon = 1e-9);
    assert_relative_eq!(tasks[16].lookfrom.x, tasks[0].lookfrom.x, epsilon = 1e-9);
}

#[test]
fn zero_offset_keeps_camera_on_origin() {
    let spec = OrbitSpec {
        origin: Vector3::new(5.0, -1.0, 2.0),
        start_offset: Vector3::ZERO,
        angular_step_degrees: 10.0,
        frame_count: 4,
    };
    for t in plan_path(&spec) {
        assert_eq!(t.lookfrom, spec.origin);
    }
}

#[test]
fn path_is_deterministic() {
    let spec = OrbitSpec::from_start_position(
        Vector3::new(278.0, 278.0, 400.0),
        Vector3::new(478.0, 278.0, -600.0),
        0.5,
        64,
    );
    assert_eq!(plan_path(&spec), plan_path(&spec));
}

#[test]
fn iterator_yields_exactly_frame_count() {
    let mut spec = scenario();
    spec.frame_count = 0;
    assert_eq!(OrbitPath::new(spec).count(), 0);

    spec.frame_count = 9;
    let path = OrbitPath::new(spec);
    assert_eq!(path.size_hint(), (9, Some(9)));
    let indices: Vec<u64> = path.map(|t| t.index.0).collect();
    assert_eq!(indices, (0..9).collect::<Vec<_>>());
}

#[test]
fn from_start_position_subtracts_origin() {
    let spec = OrbitSpec::from_start_position(
        Vector3::new(278.0, 278.0, 400.0),
        Vector3::new(478.0, 278.0, -600.0),
        0.5,
        10,
    );
    assert_eq!(spec.start_offset, Vector3::new(200.0, 0.0, -1000.0));
}

#[test]
fn validation_rejects_non_finite_orbits() {
    assert!(scenario().validate().is_ok());
    let bad = [
        OrbitSpec {
            origin: Vector3::new(f64::NAN, 0.0, 0.0),
            ..scenario()
        },
        OrbitSpec {
            start_offset: Vector3::new(0.0, f64::INFINITY, 0.0),
            ..scenario()
        },
        OrbitSpec {
            angular_step_degrees: f64::NAN,
            ..scenario()
        },
    ];
    for spec in bad {
        assert!(spec.validate().is_err());
    }
}
