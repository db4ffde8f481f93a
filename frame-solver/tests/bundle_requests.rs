use approx::assert_relative_eq;
use frame_solver::prelude::*;

const REQUEST: &str = r#"{
    "model": {
        "nodes": [[0.0, 0.0], [4.0, 0.0], [10.0, 0.0]],
        "beams": [[0, 1], [1, 2]],
        "stiffness": [[2.0e7, 4.0e5], [2.0e7, 4.0e5]],
        "releases": [[false, false], [true, false]],
        "loads": [
            {
                "name": "DC",
                "distributed": [
                    {"beam": 0, "start": {"qy": -1.0}, "end": {"qy": -1.0}, "axes": "global"},
                    {"beam": 1, "start": {"qy": -1.0}, "end": {"qy": -1.0}, "axes": "global"}
                ]
            },
            {
                "name": "LL",
                "point": [{"beam": 1, "distance": 3.0, "fy": -10.0}]
            }
        ],
        "boundary_conditions": {
            "restricted_degrees": [
                {"node": 0, "x": true, "y": true, "rotation": true},
                {"node": 2, "y": true}
            ]
        }
    },
    "options": {"meshing": {"fixed_count": 3}},
    "combinations": {
        "STR-I": {"sum": [{"scale": [1.25, {"case": "DC"}]}, {"scale": [1.75, {"case": "LL"}]}]},
        "MAX": {"envelope_max": [{"case": "DC"}, {"case": "LL"}]}
    },
    "points": [{"beam": 1, "distance": 3.0}, {"beam": 0, "distance": -1.0}]
}"#;

#[test]
fn test_request_runs_end_to_end() {
    let request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    let response = request.run().unwrap();

    assert_eq!(response.groups.len(), 2);
    assert_eq!(response.groups[0].name, "DC");
    assert!(response.warnings.is_empty());

    // Gerber beam under self-weight
    let dc = &response.groups[0];
    assert_relative_eq!(dc.support_reactions[0].fy, 7.0, epsilon = 1e-6);
    assert_relative_eq!(dc.support_reactions[0].mz, 20.0, epsilon = 1e-6);
    assert_relative_eq!(dc.internal_forces[1][0].m, 0.0, epsilon = 1e-8);

    // Combinations come back in name order
    let names: Vec<&str> = response.combinations.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["MAX", "STR-I"]);
    let str_i = &response.combinations[1];
    let ll = &response.groups[1];
    assert_relative_eq!(
        str_i.support_reactions[1].fy,
        1.25 * dc.support_reactions[1].fy + 1.75 * ll.support_reactions[1].fy,
        epsilon = 1e-9
    );

    // One report per group and per combination
    let reports: Vec<&str> = response.points.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(reports, vec!["DC", "LL", "MAX", "STR-I"]);
    let dc_mid = response.points[0].points[0];
    assert_relative_eq!(dc_mid.force.m, 4.5, epsilon = 1e-8);
    // LL: 10 at mid-span of the suspended 6 m span
    let ll_mid = response.points[1].points[0];
    assert_relative_eq!(ll_mid.force.m, 15.0, epsilon = 1e-8);
    let str_mid = response.points[3].points[0];
    assert_relative_eq!(str_mid.force.m, 1.25 * 4.5 + 1.75 * 15.0, epsilon = 1e-8);
    assert_relative_eq!(response.points[0].points[1].distance, 3.0);

    assert!(response.summaries.contains_key("STR-I"));
    assert_relative_eq!(response.summaries["DC"].max_moment, 20.0, epsilon = 1e-8);
}

#[test]
fn test_response_serializes() {
    let request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    let response = request.run().unwrap();
    let value = serde_json::to_value(&response).unwrap();

    let group = &value["groups"][0];
    assert_eq!(group["name"], "DC");
    assert!(group["displacements"][0][0]["dy"].is_number());
    assert!(group["internal_forces"][1][0]["m"].is_number());
    assert_eq!(group["support_reactions"][1]["node"], 2);
    assert!(value["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_request_errors_surface() {
    let mut request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    request.model.stiffness.pop();
    assert!(matches!(request.run(), Err(FrameError::InputConsistency(_))));

    let mut request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    request.points.push(PointQuery { beam: 9, distance: 0.0 });
    assert!(matches!(request.run(), Err(FrameError::InvalidQuery(_))));

    // An unnamed second group defaults to "G1"
    let mut request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    request.model.loads[0].name = Some("G1".to_string());
    request.model.loads[1].name = None;
    request.combinations.clear();
    assert!(matches!(request.run(), Err(FrameError::InputConsistency(_))));

    let mut request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    request
        .combinations
        .insert("BAD".to_string(), Combination::case("WS"));
    assert!(matches!(request.run(), Err(FrameError::UnknownLoadGroup(_))));
}

#[test]
fn test_model_bundle_round_trip_solves_the_same() {
    let request: SolveRequest = serde_json::from_str(REQUEST).unwrap();
    let model = Model::try_from(request.model).unwrap();
    let json = serde_json::to_string(&ModelBundle::from(&model)).unwrap();
    let again = Model::try_from(serde_json::from_str::<ModelBundle>(&json).unwrap()).unwrap();

    let options = AnalysisOptions::new().with_elements(2);
    let a = model.solve(&options).unwrap();
    let b = again.solve(&options).unwrap();
    assert_eq!(a.groups(), b.groups());
}
