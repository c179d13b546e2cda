use routeforge::{
    Building, Config, EntityOutput, GeoPoint, RunContext, Route, SurfaceKind, build_ribbon,
    extrude_footprint, haversine_distance, project, synthesize,
};
use std::io::Write;

fn origin() -> GeoPoint {
    let _ = env_logger::builder().is_test(true).try_init();
    GeoPoint::new(48.858, 2.294)
}

#[test]
fn test_projection_fixes_origin() {
    let o = origin();
    let local = project(&o, &o).unwrap();
    assert_eq!((local.x, local.y, local.z), (0.0, 0.0, 0.0));
}

#[test]
fn test_projection_landmark_scenario() {
    // A point slightly north-east of the origin lands in the positive
    // quadrant with both axes in the low hundreds of meters.
    let target = GeoPoint::new(48.859, 2.296);
    let local = project(&origin(), &target).unwrap();

    assert!(local.x > 0.0 && local.z > 0.0);
    assert!((100.0..=170.0).contains(&local.x), "x = {}", local.x);
    assert!((100.0..=170.0).contains(&local.z), "z = {}", local.z);
}

#[test]
fn test_projection_agrees_with_haversine() {
    let a = origin();
    let b = GeoPoint::new(48.862, 2.299);

    let local = project(&a, &b).unwrap();
    let planar = (local.x * local.x + local.z * local.z).sqrt();
    let great_circle = haversine_distance(&a, &b);

    let relative = (planar - great_circle).abs() / great_circle;
    assert!(relative < 5e-3, "relative error {relative}");
}

#[test]
fn test_full_run_buildings_and_routes() {
    let buildings = vec![
        Building::new(
            vec![
                GeoPoint::new(48.8580, 2.2940),
                GeoPoint::new(48.8580, 2.2944),
                GeoPoint::new(48.8583, 2.2944),
                GeoPoint::new(48.8583, 2.2940),
            ],
            Some(15.0),
            "commercial",
        ),
        Building::new(
            vec![
                GeoPoint::new(48.8590, 2.2950),
                GeoPoint::new(48.8590, 2.2953),
                GeoPoint::new(48.8592, 2.2953),
            ],
            None,
            "yes",
        ),
    ];
    let routes = vec![Route::named(
        vec![
            GeoPoint::new(48.8580, 2.2940),
            GeoPoint::new(48.8590, 2.2960),
            GeoPoint::new(48.8600, 2.2980),
        ],
        "Line 42",
    )];

    let mut ctx = RunContext::new(Config::default()).unwrap();
    let report = ctx.convert(&origin(), &buildings, &routes);

    assert!(report.complete);
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.succeeded(), 3);

    // Rectangular building: 4 wall quads + 2 cap quads.
    let Ok(EntityOutput::Building(rect)) = &report.outcomes[0].result else {
        panic!("expected building mesh");
    };
    assert_eq!(rect.quad_count(), 6);
    assert!(rect.validate().is_ok());

    // Triangular building: 6 shared vertices, 3 wall quads, 2 cap faces.
    let Ok(EntityOutput::Building(tri)) = &report.outcomes[1].result else {
        panic!("expected building mesh");
    };
    assert_eq!(tri.vertex_count(), 6);
    assert_eq!(tri.quad_count(), 3);
    assert_eq!(tri.face_count(), 5);

    // 3-point route: 4 triangles per ribbon, road plus two sidewalks.
    let Ok(EntityOutput::Road(road)) = &report.outcomes[2].result else {
        panic!("expected road meshes");
    };
    assert_eq!(road.road.triangle_count(), 4);
    assert_eq!(road.sidewalks[0].triangle_count(), 4);
    assert_eq!(road.sidewalks[1].triangle_count(), 4);
}

#[test]
fn test_run_with_elevation_source_grounds_meshes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.xyz");
    let mut file = std::fs::File::create(&path).unwrap();
    // Flat 20 m plateau wide enough to cover the footprint below.
    for x in 0..10 {
        for z in 0..10 {
            writeln!(file, "{} {} 20.0", x * 10, z * 10).unwrap();
        }
    }
    drop(file);

    let mut ctx = RunContext::new(Config::default()).unwrap();
    assert!(ctx.load_elevation(&path));

    let building = Building::new(
        vec![
            GeoPoint::new(48.8580, 2.2940),
            GeoPoint::new(48.8580, 2.2943),
            GeoPoint::new(48.8582, 2.2943),
            GeoPoint::new(48.8582, 2.2940),
        ],
        Some(10.0),
        "residential",
    );
    let report = ctx.convert(&origin(), &[building], &[]);

    let Ok(EntityOutput::Building(mesh)) = &report.outcomes[0].result else {
        panic!("expected building mesh");
    };
    // Floor sits on the surveyed ground, not on the datum.
    assert!((mesh.positions[0][1] - 20.0).abs() < 1e-4);
    assert_eq!(report.datum_substitutions, 0);
}

#[test]
fn test_run_without_elevation_counts_substitutions() {
    let config = Config::default().with_datum_elevation(5.0);
    let mut ctx = RunContext::new(config).unwrap();

    let route = Route::new(vec![
        GeoPoint::new(48.8580, 2.2940),
        GeoPoint::new(48.8585, 2.2950),
    ]);
    let report = ctx.convert(&origin(), &[], &[route]);

    assert!(report.complete);
    // One datum fallback per route point.
    assert_eq!(report.datum_substitutions, 2);
    let Ok(EntityOutput::Road(road)) = &report.outcomes[0].result else {
        panic!("expected road meshes");
    };
    assert!((road.road.positions[0][1] - 5.0).abs() < 1e-6);
}

#[test]
fn test_extrusion_direct_api() {
    use routeforge::LocalPoint;

    let ring = [
        LocalPoint::new(0.0, 0.0, 0.0),
        LocalPoint::new(12.0, 0.0, 0.0),
        LocalPoint::new(12.0, 0.0, 12.0),
        LocalPoint::new(0.0, 0.0, 12.0),
    ];
    let mesh = extrude_footprint(&ring, 9.0, 0.0).unwrap();
    assert_eq!(mesh.quad_count(), 6);
    assert_eq!(mesh.triangle_count(), 12);
}

#[test]
fn test_ribbon_direct_api() {
    use routeforge::LocalPoint;

    let path = [
        LocalPoint::new(0.0, 0.0, 0.0),
        LocalPoint::new(10.0, 0.0, 0.0),
        LocalPoint::new(20.0, 0.0, 0.0),
    ];
    let mesh = build_ribbon(&path, 4.0, 0.0).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
}

#[test]
fn test_texture_catalog_end_to_end() {
    let ctx = RunContext::new(Config::default()).unwrap();
    let assets = ctx.synthesize_textures(32, 32);

    assert_eq!(assets.len(), 5);
    let names: Vec<&str> = assets.iter().map(|a| a.file_name.as_str()).collect();
    assert!(names.iter().any(|n| n.starts_with("road_asphalt")));
    assert!(names.iter().any(|n| n.starts_with("building_wall")));

    // Same context settings give byte-identical assets.
    let again = ctx.synthesize_textures(32, 32);
    for (a, b) in assets.iter().zip(&again) {
        assert_eq!(a.data, b.data);
    }
}

#[test]
fn test_texture_determinism_across_calls() {
    let a = synthesize(SurfaceKind::Asphalt, 64, 64, 42);
    let b = synthesize(SurfaceKind::Asphalt, 64, 64, 42);
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn test_config_json_round_trip() {
    let config = Config::default()
        .with_datum_elevation(35.0)
        .with_road_width(7.5)
        .with_texture_seed(7);
    let json = config.to_json().unwrap();
    let back = Config::from_json(&json).unwrap();
    assert_eq!(back.datum_elevation, 35.0);
    assert_eq!(back.road_width, 7.5);
    assert_eq!(back.texture_seed, 7);
}
