use approx::assert_relative_eq;
use frame_solver::prelude::*;

fn steel_model() -> FrameModel {
    let mut model = FrameModel::new();
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("Column", Section::rectangular(0.4, 0.4)).unwrap();
    model.add_section("Beam", Section::rectangular(0.3, 0.6)).unwrap();
    model.add_load_case(LoadCase::dead()).unwrap();
    model.add_load_case(LoadCase::live()).unwrap();
    model.add_load_case(LoadCase::wind()).unwrap();
    model
}

/// Fixed-base portal frame loaded in all three directions
fn portal_frame() -> FrameModel {
    let mut model = steel_model();
    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(6.0, 0.0, 0.0)).unwrap();
    model.add_node("N3", Node::new(0.0, 4.0, 0.0)).unwrap();
    model.add_node("N4", Node::new(6.0, 4.0, 0.0)).unwrap();

    model.add_member("Col1", Member::new("N1", "N3", "Steel", "Column")).unwrap();
    model.add_member("Col2", Member::new("N2", "N4", "Steel", "Column")).unwrap();
    model.add_member("Beam", Member::new("N3", "N4", "Steel", "Beam")).unwrap();

    model.def_support("N1", Support::fixed()).unwrap();
    model.def_support("N2", Support::fixed()).unwrap();

    model
        .add_member_dist_load("Beam", DistributedLoad::uniform_downward(20000.0, "D"))
        .unwrap();
    model
        .add_member_dist_load(
            "Beam",
            DistributedLoad::new(0.0, -8000.0, 1.0, 5.0, LoadDirection::FZ, "L"),
        )
        .unwrap();
    model
        .add_member_point_load("Beam", PointLoad::downward(15000.0, 2.0, "L"))
        .unwrap();
    model
        .add_member_point_load("Col1", PointLoad::new(5000.0, 2.5, LoadDirection::FX, "W"))
        .unwrap();
    model
        .add_member_point_load("Col2", PointLoad::new(1200.0, 1.0, LoadDirection::MZ, "W"))
        .unwrap();
    model.add_node_load("N3", NodeLoad::fx(10000.0, "W")).unwrap();
    model
        .add_node_load("N4", NodeLoad::new(0.0, 0.0, 2000.0, 500.0, 0.0, 0.0, "W"))
        .unwrap();

    model.add_load_combo(LoadCombination::lrfd_dead_only()).unwrap();
    model.add_load_combo(LoadCombination::lrfd_dead_live()).unwrap();
    model
        .add_load_combo(
            LoadCombination::new("1.2D+1.0W+1.0L")
                .with_case("D", 1.2)
                .with_case("W", 1.0)
                .with_case("L", 1.0)
                .with_tag("lateral"),
        )
        .unwrap();
    model
}

#[test]
fn portal_frame_statics_balanced() {
    let mut model = portal_frame();
    let analysis = model
        .analyze(AnalysisOptions::linear().with_statics_check())
        .unwrap();

    let reports = analysis.statics_reports();
    assert_eq!(reports.len(), 3);
    for report in reports {
        assert!(report.balanced, "{:?}", report);
    }

    let combo = analysis.combo("1.4D").unwrap().statics.as_ref().unwrap();
    assert_relative_eq!(combo.applied_force[1], -1.4 * 20000.0 * 6.0, max_relative = 1e-9);
    assert_relative_eq!(combo.reaction_force[1], 1.4 * 20000.0 * 6.0, max_relative = 1e-8);
}

#[test]
fn gable_frame_statics_balanced() {
    let mut model = steel_model();
    model.add_node("A", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("B", Node::new(0.0, 5.0, 0.0)).unwrap();
    model.add_node("C", Node::new(6.0, 7.0, 1.0)).unwrap();
    model.add_node("D", Node::new(12.0, 5.0, 0.0)).unwrap();
    model.add_node("E", Node::new(12.0, 0.0, 0.0)).unwrap();

    model.add_member("AB", Member::new("A", "B", "Steel", "Column")).unwrap();
    model.add_member("BC", Member::new("B", "C", "Steel", "Beam")).unwrap();
    model
        .add_member("CD", Member::new("C", "D", "Steel", "Beam").with_rotation(0.2))
        .unwrap();
    model
        .add_member("DE", Member::new("D", "E", "Steel", "Column").with_releases(MemberReleases::pin_i()))
        .unwrap();

    model.def_support("A", Support::fixed()).unwrap();
    model.def_support("E", Support::fixed()).unwrap();

    for rafter in ["BC", "CD"] {
        model
            .add_member_dist_load(rafter, DistributedLoad::uniform(-3000.0, LoadDirection::FY, "D"))
            .unwrap();
        model
            .add_member_dist_load(
                rafter,
                DistributedLoad::new(500.0, 1500.0, 0.5, 4.0, LoadDirection::Fy, "W"),
            )
            .unwrap();
    }
    model
        .add_member_point_load("BC", PointLoad::new(800.0, 3.0, LoadDirection::My, "W"))
        .unwrap();
    model.add_node_load("C", NodeLoad::force(4000.0, -1000.0, 700.0, "L")).unwrap();

    let analysis = model
        .solve(&AnalysisOptions::linear().with_statics_check())
        .unwrap();
    let combo = analysis.combo("Combo 1").unwrap();
    let report = combo.statics.as_ref().unwrap();
    assert!(report.balanced, "{:?}", report);
}

#[test]
fn diagrams_are_consistent_derivatives() {
    let l = 8.0;
    let mut model = steel_model();
    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(l, 0.0, 0.0)).unwrap();
    model.add_member("M1", Member::new("N1", "N2", "Steel", "Beam")).unwrap();
    model.def_support("N1", Support::fixed()).unwrap();
    model.def_support("N2", Support::pinned()).unwrap();

    let (w1, w2, x1, x2) = (-2000.0, -6000.0, 1.0, 7.0);
    model
        .add_member_dist_load("M1", DistributedLoad::new(w1, w2, x1, x2, LoadDirection::Fy, "D"))
        .unwrap();
    model
        .add_member_dist_load("M1", DistributedLoad::uniform(1500.0, LoadDirection::Fz, "D"))
        .unwrap();
    model
        .add_member_point_load("M1", PointLoad::new(-5000.0, 3.0, LoadDirection::Fy, "D"))
        .unwrap();
    model.analyze_linear().unwrap();

    let beam = model.member_results("M1", "Combo 1").unwrap();
    let intensity_y = |x: f64| {
        if x > x1 && x < x2 {
            w1 + (w2 - w1) * (x - x1) / (x2 - x1)
        } else {
            0.0
        }
    };

    let h = 1e-4;
    for x in [0.5, 2.0, 4.5, 6.0, 7.5] {
        let dm = (beam.moment_z(x + h).unwrap() - beam.moment_z(x - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(dm, beam.shear_y(x).unwrap(), epsilon = 1e-3);

        let dv = (beam.shear_y(x + h).unwrap() - beam.shear_y(x - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(dv, intensity_y(x), epsilon = 1e-3);

        let dm = (beam.moment_y(x + h).unwrap() - beam.moment_y(x - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(dm, beam.shear_z(x).unwrap(), epsilon = 1e-3);

        let dv = (beam.shear_z(x + h).unwrap() - beam.shear_z(x - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(dv, 1500.0, epsilon = 1e-3);
    }

    // Both ends of the span satisfy their support conditions
    assert!(beam.deflection_y(l).unwrap().abs() < 1e-12);
    assert!(beam.moment_z(l).unwrap().abs() < 1e-6);
}

#[test]
fn reanalysis_is_idempotent() {
    let mut model = portal_frame();
    let first = model.analyze_linear().unwrap().clone();
    let second = model.analyze_linear().unwrap();

    for combo in first.combos() {
        let other = second.combo(&combo.name).unwrap();
        assert_eq!(combo.displacements, other.displacements);
        assert_eq!(combo.reactions, other.reactions);
    }
}

#[test]
fn parallel_and_sequential_solves_match() {
    let model = portal_frame();
    let parallel = model.solve(&AnalysisOptions::linear()).unwrap();
    let sequential = model.solve(&AnalysisOptions::linear().sequential()).unwrap();

    assert_eq!(parallel.combo_names(), sequential.combo_names());
    for combo in parallel.combos() {
        assert_eq!(combo.displacements, sequential.combo(&combo.name).unwrap().displacements);
    }
}

#[test]
fn combinations_are_independent() {
    let model = portal_frame();
    let analysis = model.solve(&AnalysisOptions::linear()).unwrap();

    // 1.4D and 1.2D+1.6L share the dead load but differ in the live load
    let d = analysis.node_displacement("N3", "1.4D").unwrap();
    let dl = analysis.node_displacement("N3", "1.2D+1.6L").unwrap();
    assert!(d.dz.abs() < 1e-15);
    assert!(dl.dz.abs() > 0.0);
}

#[test]
fn combo_tags_filter_analysis() {
    let model = portal_frame();
    let analysis = model
        .solve(&AnalysisOptions::linear().with_tags(vec!["lateral".to_string()]))
        .unwrap();
    assert_eq!(analysis.combo_names(), vec!["1.2D+1.0W+1.0L"]);

    let none = model.solve(&AnalysisOptions::linear().with_tags(vec!["seismic".to_string()]));
    assert!(matches!(none, Err(FrameError::InvalidInput(_))));
}

#[test]
fn torsional_mechanism_is_unstable() {
    let mut model = steel_model();
    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(5.0, 0.0, 0.0)).unwrap();
    model.add_member("M1", Member::new("N1", "N2", "Steel", "Beam")).unwrap();
    model.def_support("N1", Support::pinned()).unwrap();
    model.def_support("N2", Support::pinned()).unwrap();
    model.add_node_load("N2", NodeLoad::moment(0.0, 0.0, 10.0, "D")).unwrap();

    match model.analyze_linear() {
        Err(FrameError::Unstable { dof, .. }) => assert_eq!(dof, "RX"),
        other => panic!("expected an unstable model, got {:?}", other.map(|_| ())),
    }
    assert!(!model.is_analyzed());
}

#[test]
fn unconnected_node_is_unstable() {
    let mut model = steel_model();
    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(5.0, 0.0, 0.0)).unwrap();
    model.add_node("Loose", Node::new(9.0, 9.0, 0.0)).unwrap();
    model.add_member("M1", Member::new("N1", "N2", "Steel", "Beam")).unwrap();
    model.def_support("N1", Support::fixed()).unwrap();

    for options in [AnalysisOptions::linear(), AnalysisOptions::linear().dense()] {
        match model.solve(&options) {
            Err(FrameError::Unstable { node, .. }) => assert_eq!(node, "Loose"),
            other => panic!("expected an unstable model, got {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn tutorial_beam_reactions() {
    let mut model = FrameModel::new();
    model.add_material("Steel", Material::new(210e6, 81e6, 0.3, 78.5)).unwrap();
    model.add_section("Beam", Section::new(0.025, 1.2e-4, 1.6e-4, 2.7e-4)).unwrap();
    model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("N2", Node::new(6.0, 0.0, 0.0)).unwrap();
    model.add_member("M1", Member::new("N1", "N2", "Steel", "Beam")).unwrap();
    model
        .def_support("N1", Support::with_restraints(true, true, true, false, false, false))
        .unwrap();
    model
        .def_support("N2", Support::with_restraints(true, true, true, true, false, false))
        .unwrap();
    for case in [LoadCase::dead(), LoadCase::live(), LoadCase::snow()] {
        model.add_load_case(case).unwrap();
    }
    model
        .add_member_dist_load("M1", DistributedLoad::new(-30.0, -30.0, 0.0, 6.0, LoadDirection::Fy, "D"))
        .unwrap();
    model
        .add_member_point_load("M1", PointLoad::new(-10.0, 3.0, LoadDirection::Fy, "D"))
        .unwrap();
    model
        .add_member_point_load("M1", PointLoad::new(45.0, 1.5, LoadDirection::Fy, "L"))
        .unwrap();
    model
        .add_member_point_load("M1", PointLoad::new(-20.0, 4.5, LoadDirection::Fy, "L"))
        .unwrap();
    model.add_load_combo(LoadCombination::lrfd_dead_only()).unwrap();
    model.add_load_combo(LoadCombination::lrfd_dead_live()).unwrap();
    model
        .add_load_combo(
            LoadCombination::new("1.2D+1.6L+0.5S")
                .with_case("D", 0.5)
                .with_case("L", 1.6)
                .with_case("S", 0.5),
        )
        .unwrap();
    model.analyze(AnalysisOptions::linear().with_statics_check()).unwrap();

    let expected = [
        ("1.4D", 133.0, 133.0),
        ("1.2D+1.6L", 68.0, 120.0),
        ("1.2D+1.6L+0.5S", 1.5, 53.5),
    ];
    for (combo, r1, r2) in expected {
        assert_relative_eq!(model.node_reaction("N1", combo).unwrap().fy, r1, max_relative = 1e-9);
        assert_relative_eq!(model.node_reaction("N2", combo).unwrap().fy, r2, max_relative = 1e-9);
    }

    let beam = model.member_results("M1", "1.4D").unwrap();
    let max = beam.max(Diagram::MomentZ);
    assert_relative_eq!(max.value, 210.0, max_relative = 1e-9);
    assert_relative_eq!(max.x, 3.0, epsilon = 1e-6);

    let samples = beam.moment_z_array(400).unwrap();
    assert_eq!(samples.len(), 400);
    assert_relative_eq!(samples[399].0, 6.0);

    let shear = beam.shear_y_array(5).unwrap();
    assert_relative_eq!(shear[0].1, 133.0, max_relative = 1e-9);
    assert_relative_eq!(shear[4].1, -133.0, max_relative = 1e-9);

    for report in model.analysis().unwrap().statics_reports() {
        assert!(report.balanced);
    }
}
