use mesh_recombine::recombine::{HexPatterns, RecombineOptions, RelaxationOptions};

#[test]
fn options_round_trip_through_json() {
    let options = RecombineOptions {
        prisms: false,
        hex_min_quality: 0.4,
        hex_patterns: HexPatterns {
            crossed_diagonals: false,
            ..Default::default()
        },
        relaxation: RelaxationOptions {
            max_volume_iterations: 10,
            ..Default::default()
        },
        merge_apex_pairs: true,
        ..Default::default()
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: RecombineOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn missing_fields_take_defaults() {
    let back: RecombineOptions =
        serde_json::from_str(r#"{ "pyramids": false, "relaxation": { "min_quality": 0.3 } }"#)
            .unwrap();
    assert!(!back.pyramids);
    assert!(back.hexahedra);
    assert_eq!(back.prism_min_quality, 0.15);
    assert_eq!(back.relaxation.min_quality, 0.3);
    assert_eq!(back.relaxation.max_quality_iterations, 6);
}
