use approx::assert_relative_eq;
use frame_solver::prelude::*;

fn braced_bay() -> FrameModel {
    let mut model = FrameModel::new();
    model.add_material("Steel", Material::steel()).unwrap();
    model.add_section("Column", Section::wide_flange(0.3, 0.2, 0.012, 0.008)).unwrap();
    model.add_section("Brace", Section::pipe(0.1, 0.006)).unwrap();

    model.add_node("A", Node::new(0.0, 0.0, 0.0)).unwrap();
    model.add_node("B", Node::new(5.0, 0.0, 0.0)).unwrap();
    model.add_node("C", Node::new(0.0, 3.5, 0.0)).unwrap();
    model.add_node("D", Node::new(5.0, 3.5, 0.0)).unwrap();

    model.add_member("AC", Member::new("A", "C", "Steel", "Column")).unwrap();
    model.add_member("BD", Member::new("B", "D", "Steel", "Column")).unwrap();
    model
        .add_member("CD", Member::new("C", "D", "Steel", "Column").with_rotation(0.5))
        .unwrap();
    model
        .add_member(
            "AD",
            Member::new("A", "D", "Steel", "Brace").with_releases(MemberReleases::pin_both()),
        )
        .unwrap();

    model.def_support("A", Support::fixed()).unwrap();
    model
        .def_support("B", Support::pinned().with_enforced(1, -0.002).unwrap())
        .unwrap();

    model.add_load_case(LoadCase::dead()).unwrap();
    model.add_load_case(LoadCase::with_description("W", "Wind from the west")).unwrap();
    model
        .add_member_dist_load("CD", DistributedLoad::new(-4000.0, -9000.0, 0.5, 4.0, LoadDirection::FY, "D"))
        .unwrap();
    model
        .add_member_point_load("CD", PointLoad::new(1500.0, 2.0, LoadDirection::Mz, "D"))
        .unwrap();
    model.add_node_load("C", NodeLoad::fx(12000.0, "W")).unwrap();
    model
        .add_load_combo(LoadCombination::new("D+W").with_case("D", 1.2).with_case("W", 1.0).with_tag("lateral"))
        .unwrap();
    model.add_load_combo(LoadCombination::single("D only", "D")).unwrap();
    model
}

#[test]
fn json_round_trip_preserves_results() {
    let mut original = braced_bay();
    original.analyze_linear().unwrap();

    let json = ModelFile::from_model(&original).to_json().unwrap();
    let mut restored = ModelFile::from_json(&json).unwrap().into_model().unwrap();
    restored.analyze_linear().unwrap();

    assert_eq!(restored.nodes().len(), 4);
    assert_eq!(restored.members().len(), 4);
    assert_eq!(restored.combo_names(), original.combo_names());
    assert_eq!(restored.member("AD").unwrap().releases, MemberReleases::pin_both());
    assert_eq!(restored.load_combo("D+W").unwrap().tags, vec!["lateral".to_string()]);

    for combo in original.combo_names() {
        for node in ["A", "B", "C", "D"] {
            let a = original.node_displacement(node, &combo).unwrap().as_array();
            let b = restored.node_displacement(node, &combo).unwrap().as_array();
            for i in 0..6 {
                assert_relative_eq!(a[i], b[i], epsilon = 1e-15, max_relative = 1e-9);
            }
        }
        let a = original.member_results("CD", &combo).unwrap().max(Diagram::MomentZ);
        let b = restored.member_results("CD", &combo).unwrap().max(Diagram::MomentZ);
        assert_relative_eq!(a.value, b.value, max_relative = 1e-9);
    }
}

#[test]
fn file_round_trip() {
    let file = ModelFile::from_model(&braced_bay());
    let path = std::env::temp_dir().join(format!("frame-solver-{}.json", std::process::id()));

    file.write(&path).unwrap();
    let read = ModelFile::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(read.nodes.keys().collect::<Vec<_>>(), file.nodes.keys().collect::<Vec<_>>());
    assert_eq!(read.load_cases, file.load_cases);
    assert_eq!(read.supports["B"].enforced[1], Some(-0.002));
}

#[test]
fn handwritten_json_with_defaults() {
    let json = r#"{
        "materials": { "Steel": { "e": 200e9, "g": 77e9, "nu": 0.3, "rho": 7850.0 } },
        "sections": { "S": { "a": 0.01, "iy": 1e-4, "iz": 2e-4, "j": 1e-5 } },
        "nodes": {
            "N1": { "x": 0.0, "y": 0.0, "z": 0.0 },
            "N2": { "x": 4.0, "y": 0.0, "z": 0.0 }
        },
        "members": {
            "M1": { "i_node": "N1", "j_node": "N2", "material": "Steel", "section": "S" }
        },
        "supports": { "N1": { "dx": true, "dy": true, "dz": true, "rx": true, "ry": true, "rz": true } },
        "load_cases": [ { "name": "D" } ],
        "node_loads": { "N2": [ { "fy": -1000.0, "case": "D" } ] }
    }"#;

    let mut model = ModelFile::from_json(json).unwrap().into_model().unwrap();
    let analysis = model.analyze_linear().unwrap();
    assert_eq!(analysis.combo_names(), vec!["Combo 1"]);

    let root = model.node_reaction("N1", "Combo 1").unwrap();
    assert_relative_eq!(root.fy, 1000.0, max_relative = 1e-9);
    assert_relative_eq!(root.mz, 4000.0, max_relative = 1e-9);
}

#[test]
fn invalid_file_is_rejected_by_model_validation() {
    let mut file = ModelFile::from_model(&braced_bay());
    file.members.get_mut("AD").unwrap().section = "Missing".to_string();
    assert!(matches!(file.into_model(), Err(FrameError::SectionNotFound(_))));
}

#[test]
fn enforced_value_on_free_dof_is_rejected() {
    let mut file = ModelFile::from_model(&braced_bay());
    let b = file.supports.get_mut("B").unwrap();
    b.dy = false;
    assert_eq!(b.enforced[1], Some(-0.002));

    match file.into_model() {
        Err(FrameError::InvalidInput(msg)) => assert!(msg.contains("DY"), "{}", msg),
        other => panic!("expected an invalid support, got {:?}", other.map(|_| ())),
    }
}
