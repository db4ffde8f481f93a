use approx::assert_relative_eq;
use frame_solver::prelude::*;

fn simply_supported(length: f64) -> Model {
    let mut model = Model::new();
    let a = model.add_node(Node::new(0.0, 0.0));
    let b = model.add_node(Node::new(length, 0.0));
    model.add_beam(Beam::new(a, b, SectionStiffness::new(2.0e7, 4.0e5))).unwrap();
    model.add_restraint(RestrictedDegree::pinned(a)).unwrap();
    model.add_restraint(RestrictedDegree::roller_y(b)).unwrap();
    model
}

fn assert_results_close(a: &GroupResult, b: &GroupResult) {
    for (da, db) in a.displacements.iter().flatten().zip(b.displacements.iter().flatten()) {
        assert_relative_eq!(da.dx, db.dx, epsilon = 1e-12);
        assert_relative_eq!(da.dy, db.dy, epsilon = 1e-12);
        assert_relative_eq!(da.drz, db.drz, epsilon = 1e-12);
    }
    for (fa, fb) in a.internal_forces.iter().flatten().zip(b.internal_forces.iter().flatten()) {
        assert_relative_eq!(fa.n, fb.n, epsilon = 1e-7);
        assert_relative_eq!(fa.v, fb.v, epsilon = 1e-7);
        assert_relative_eq!(fa.m, fb.m, epsilon = 1e-7);
    }
    for (ra, rb) in a.support_reactions.iter().zip(&b.support_reactions) {
        assert_relative_eq!(ra.fy, rb.fy, epsilon = 1e-6);
    }
}

#[test]
fn test_functional_load_matches_linear_load() {
    let mut model = simply_supported(10.0);
    model.add_load_group(LoadGroup::named("linear").with_distributed(DistributedLoad::new(
        0,
        2.0,
        8.0,
        LineLoad::new(0.5, -1.0, 0.2),
        LineLoad::new(0.5, -4.0, 0.2),
    )));
    model.add_load_group(
        LoadGroup::named("function").with_function(
            FunctionalLoad::new(0, 2.0, 8.0)
                .with_qx(|_| 0.5)
                .with_qy(|x| -1.0 - 3.0 * (x - 2.0) / 6.0)
                .with_mz(|_| 0.2),
        ),
    );

    let solution = model.solve(&AnalysisOptions::new().with_elements(4)).unwrap();
    assert_results_close(
        solution.group("linear").unwrap(),
        solution.group("function").unwrap(),
    );

    for distance in [1.0, 3.3, 5.0, 7.9] {
        let a = solution.point("linear", 0, distance).unwrap();
        let b = solution.point("function", 0, distance).unwrap();
        assert_relative_eq!(a.force.n, b.force.n, epsilon = 1e-7);
        assert_relative_eq!(a.force.v, b.force.v, epsilon = 1e-7);
        assert_relative_eq!(a.force.m, b.force.m, epsilon = 1e-7);
        assert_relative_eq!(a.displacement.dy, b.displacement.dy, epsilon = 1e-12);
    }
}

#[test]
fn test_functional_load_in_global_axes() {
    let mut model = Model::new();
    let a = model.add_node(Node::new(0.0, 0.0));
    let b = model.add_node(Node::new(8.0, 6.0));
    model.add_beam(Beam::new(a, b, SectionStiffness::new(2.0e7, 4.0e5))).unwrap();
    model.add_restraint(RestrictedDegree::pinned(a)).unwrap();
    model.add_restraint(RestrictedDegree::roller_y(b)).unwrap();
    model.add_load_group(
        LoadGroup::named("dist").with_distributed(DistributedLoad::self_weight(0, 1.5)),
    );
    model.add_load_group(
        LoadGroup::named("fn").with_function(
            FunctionalLoad::new(0, 0.0, 0.0).with_qy(|_| -1.5).in_global_axes(),
        ),
    );

    let solution = model.solve(&AnalysisOptions::new().with_elements(3)).unwrap();
    assert_results_close(solution.group("dist").unwrap(), solution.group("fn").unwrap());
}

#[test]
fn test_point_load_position_from_beam_end() {
    let mut model = simply_supported(10.0);
    model.add_load_group(
        LoadGroup::named("start").with_point(PointLoad::transverse(0, 7.5, -10.0)),
    );
    model.add_load_group(LoadGroup::named("end").with_point(PointLoad::transverse(0, -2.5, -10.0)));

    let solution = model.solve(&AnalysisOptions::new().with_elements(4)).unwrap();
    assert_results_close(solution.group("start").unwrap(), solution.group("end").unwrap());

    // 7.5 is an inner element boundary: the load is shared, moment under the load is P·a·b/L
    let under = solution.point("start", 0, 7.5).unwrap();
    assert_relative_eq!(under.force.m, 10.0 * 7.5 * 2.5 / 10.0, epsilon = 1e-8);
}

#[test]
fn test_point_moment_jump() {
    let mut model = simply_supported(10.0);
    model.add_load_group(LoadGroup::named("M").with_point(PointLoad::moment(0, 4.0, 20.0)));
    let solution = model.solve(&AnalysisOptions::new().with_elements(3)).unwrap();

    // Reactions form a couple of 20 / 10 against the counter-clockwise moment
    let result = solution.group("M").unwrap();
    assert_relative_eq!(result.support_reactions[0].fy, 2.0, epsilon = 1e-6);
    assert_relative_eq!(result.support_reactions[1].fy, -2.0, epsilon = 1e-6);

    let before = solution.point("M", 0, 4.0 - 1e-9).unwrap();
    let after = solution.point("M", 0, 4.0 + 1e-6).unwrap();
    assert_relative_eq!(before.force.m, 8.0, epsilon = 1e-6);
    assert_relative_eq!(after.force.m - before.force.m, -20.0, epsilon = 1e-5);
    assert_relative_eq!(after.force.v, 2.0, epsilon = 1e-8);
}

#[test]
fn test_load_range_is_checked() {
    let mut model = simply_supported(10.0);
    model.add_load_group(LoadGroup::new().with_point(PointLoad::transverse(0, -12.0, -1.0)));
    assert!(matches!(
        model.solve_default(),
        Err(FrameError::LoadRange { beam: 0, .. })
    ));
}

fn two_group_solution() -> Solution {
    let mut model = simply_supported(10.0);
    model.add_load_group(
        LoadGroup::named("DC")
            .with_distributed(DistributedLoad::uniform(0, LineLoad::transverse(-2.0))),
    );
    model.add_load_group(LoadGroup::named("LL").with_point(PointLoad::transverse(0, 3.0, -10.0)));
    model.add_load_group(LoadGroup::named("UP").with_point(PointLoad::transverse(0, 6.0, 8.0)));
    model.solve(&AnalysisOptions::new().with_elements(5)).unwrap()
}

#[test]
fn test_factored_combination_is_linear() {
    let mut solution = two_group_solution();
    let dc = solution.group("DC").unwrap().clone();
    let ll = solution.group("LL").unwrap().clone();

    solution.define_combination("STR-I", Combination::factored(&[("DC", 1.25), ("LL", 1.75)]));
    let combined = solution.combination("STR-I").unwrap();
    assert_eq!(combined.name, "STR-I");

    for beam in 0..dc.internal_forces.len() {
        for k in 0..dc.internal_forces[beam].len() {
            let expected =
                1.25 * dc.internal_forces[beam][k].m + 1.75 * ll.internal_forces[beam][k].m;
            assert_relative_eq!(combined.internal_forces[beam][k].m, expected, epsilon = 1e-9);
            let expected =
                1.25 * dc.displacements[beam][k].dy + 1.75 * ll.displacements[beam][k].dy;
            assert_relative_eq!(combined.displacements[beam][k].dy, expected, epsilon = 1e-15);
        }
    }
    let expected = 1.25 * dc.support_reactions[0].fy + 1.75 * ll.support_reactions[0].fy;
    assert_relative_eq!(combined.support_reactions[0].fy, expected, epsilon = 1e-9);
}

#[test]
fn test_envelopes_take_extremes() {
    let mut solution = two_group_solution();
    let cases = vec![Combination::case("DC"), Combination::case("LL"), Combination::case("UP")];
    solution.define_combination("max", Combination::envelope_max(cases.clone()));
    solution.define_combination("min", Combination::envelope_min(cases));

    let groups: Vec<GroupResult> = solution.groups().to_vec();
    let max = solution.combination("max").unwrap().clone();
    let min = solution.combination("min").unwrap().clone();

    for k in 0..max.internal_forces[0].len() {
        let values: Vec<f64> = groups.iter().map(|g| g.internal_forces[0][k].m).collect();
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!(max.internal_forces[0][k].m, hi);
        assert_eq!(min.internal_forces[0][k].m, lo);
    }
}

#[test]
fn test_combination_is_cached_and_redefinable() {
    let mut solution = two_group_solution();
    solution.define_combination("c", Combination::case("DC") * 2.0);
    let first = solution.combination("c").unwrap().internal_forces[0][2].m;
    let again = solution.combination("c").unwrap().internal_forces[0][2].m;
    assert_eq!(first, again);

    solution.define_combination("c", Combination::case("DC") * 3.0);
    let redefined = solution.combination("c").unwrap().internal_forces[0][2].m;
    assert_relative_eq!(redefined, 1.5 * first, epsilon = 1e-9);
}

#[test]
fn test_combination_errors() {
    let mut solution = two_group_solution();
    assert!(matches!(
        solution.combination("nope"),
        Err(FrameError::UnknownCombination(_))
    ));

    solution.define_combination("bad", Combination::case("DC") + Combination::case("WS"));
    assert!(matches!(
        solution.combination("bad"),
        Err(FrameError::UnknownLoadGroup(name)) if name == "WS"
    ));
}

#[test]
fn test_combined_point() {
    let solution = two_group_solution();
    let combination = Combination::case("DC") * 1.25 + Combination::case("LL") * 1.75;

    let point = solution.combined_point("STR-I", &combination, 0, 4.2).unwrap();
    let dc = solution.point("DC", 0, 4.2).unwrap();
    let ll = solution.point("LL", 0, 4.2).unwrap();
    assert_eq!(point.beam, 0);
    assert_relative_eq!(point.distance, 4.2);
    assert_relative_eq!(point.force.m, 1.25 * dc.force.m + 1.75 * ll.force.m, epsilon = 1e-9);
    assert_relative_eq!(
        point.displacement.dy,
        1.25 * dc.displacement.dy + 1.75 * ll.displacement.dy,
        epsilon = 1e-15
    );
}
