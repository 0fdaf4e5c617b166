use super::*;

#[test]
fn presets_are_valid() {
    for preset in [Preset::FinalScene, Preset::RandomScene] {
        preset.config().validate().unwrap();
    }
}

#[test]
fn final_scene_preset_orbits_the_box_center() {
    let cfg = Preset::FinalScene.config();
    assert_eq!(cfg.orbit.origin, Vector3::new(278.0, 278.0, 400.0));
    assert_eq!(cfg.orbit.start_offset, Vector3::new(200.0, 0.0, -1000.0));
    assert_eq!(cfg.orbit.angular_step_degrees, 0.5);
    assert_eq!(cfg.render.world, "final_scene");
    assert_eq!(cfg.render.aspect_ratio, "1:1");
    assert_eq!(cfg.render.seed, 42);
    assert_eq!(cfg.failure_policy, FailurePolicy::Abort);
    assert_eq!(cfg, RunConfig::default());
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let cfg = RunConfig::from_json(
        r#"{
            "orbit": { "frame_count": 3, "start_offset": { "x": 13, "y": 2, "z": 3 } },
            "render": { "samples_per_pixel": 8, "converter": { "kind": "builtin" } },
            "failure_policy": "continue"
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.orbit.frame_count, 3);
    assert_eq!(cfg.orbit.start_offset, Vector3::new(13.0, 2.0, 3.0));
    assert_eq!(cfg.orbit.origin, Vector3::new(278.0, 278.0, 400.0));
    assert_eq!(cfg.render.samples_per_pixel, 8);
    assert_eq!(cfg.render.converter, Converter::Builtin);
    assert_eq!(cfg.render.image_width, 640);
    assert_eq!(cfg.failure_policy, FailurePolicy::Continue);
    cfg.validate().unwrap();
}

#[test]
fn json_roundtrips_through_pretty_output() {
    let cfg = Preset::RandomScene.config();
    let text = cfg.to_json_pretty().unwrap();
    assert_eq!(RunConfig::from_json(&text).unwrap(), cfg);
}

#[test]
fn from_path_reports_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();

    let err = RunConfig::from_path(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(
        err,
        FlyaroundError::Io {
            operation: IoOperation::ReadConfig,
            index: None,
            ..
        }
    ));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    let err = RunConfig::from_path(&bad).unwrap_err();
    assert!(matches!(err, FlyaroundError::Serde(_)));
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn aspect_ratio_must_be_two_positive_integers() {
    assert_eq!(parse_aspect_ratio("16:9").unwrap(), (16, 9));
    assert_eq!(parse_aspect_ratio("1:1").unwrap(), (1, 1));
    for bad in ["16/9", "16:", ":9", "0:1", "1:0", "1.5:1", "a:b", "16:9:1"] {
        assert!(parse_aspect_ratio(bad).is_err(), "{bad} should be rejected");
    }
}

#[test]
fn render_validation_catches_bad_values() {
    let base = RenderConfig::default();

    let cases: Vec<RenderConfig> = vec![
        RenderConfig {
            image_width: 0,
            ..base.clone()
        },
        RenderConfig {
            samples_per_pixel: 0,
            ..base.clone()
        },
        RenderConfig {
            world: " ".to_string(),
            ..base.clone()
        },
        RenderConfig {
            engine: ProgramSpec::new(""),
            ..base.clone()
        },
        RenderConfig {
            raw_ext: "png".to_string(),
            ..base.clone()
        },
        RenderConfig {
            display_ext: "p.ng".to_string(),
            ..base.clone()
        },
        RenderConfig {
            field_of_view: Some(180.0),
            ..base.clone()
        },
        RenderConfig {
            up: Some(Vector3::ZERO),
            ..base.clone()
        },
        RenderConfig {
            timeout_secs: Some(0.0),
            ..base.clone()
        },
        RenderConfig {
            timeout_secs: Some(f64::NAN),
            ..base.clone()
        },
        RenderConfig {
            timeout_secs: Some(1e30),
            ..base.clone()
        },
    ];
    for cfg in cases {
        assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
    }

    let ok = RenderConfig {
        field_of_view: Some(40.0),
        up: Some(Vector3::new(0.0, 1.0, 0.0)),
        timeout_secs: Some(2.5),
        ..base
    };
    ok.validate().unwrap();
    assert_eq!(ok.timeout(), Some(Duration::from_millis(2500)));
}

#[test]
fn unrepresentable_timeout_is_rejected_without_panicking() {
    let cfg = RenderConfig {
        timeout_secs: Some(1e30),
        ..RenderConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
    assert_eq!(cfg.timeout(), None);
}

#[test]
fn zero_offset_orbit_is_accepted() {
    let mut cfg = RunConfig::default();
    cfg.orbit.start_offset = Vector3::ZERO;
    cfg.validate().unwrap();

    cfg.orbit.angular_step_degrees = f64::INFINITY;
    assert!(cfg.validate().is_err());
}
