//! Frame Solver Example - Simply supported beam with load combinations
//!
//! A 6 m beam carries a uniform dead load, a dead point load at midspan and
//! two live point loads. Units are kN and m.

use anyhow::Result;
use frame_solver::prelude::*;

const SAMPLES: usize = 400;
/// Print every n-th sample of the diagrams
const PRINT_EVERY: usize = 25;

fn build_model() -> Result<FrameModel> {
    let mut model = FrameModel::new();

    model.add_material("Steel", Material::new(210e6, 81e6, 0.3, 78.5))?;
    model.add_section("Beam", Section::new(0.025, 1.2e-4, 1.6e-4, 2.7e-4))?;

    model.add_node("N1", Node::new(0.0, 0.0, 0.0))?;
    model.add_node("N2", Node::new(6.0, 0.0, 0.0))?;
    model.add_member("M1", Member::new("N1", "N2", "Steel", "Beam"))?;

    // Pin at N1, roller with torsional restraint at N2
    model.def_support("N1", Support::with_restraints(true, true, true, false, false, false))?;
    model.def_support("N2", Support::with_restraints(true, true, true, true, false, false))?;

    model.add_load_case(LoadCase::dead())?;
    model.add_load_case(LoadCase::live())?;
    model.add_load_case(LoadCase::snow())?;

    model.add_member_dist_load(
        "M1",
        DistributedLoad::new(-30.0, -30.0, 0.0, 6.0, LoadDirection::Fy, "D"),
    )?;
    model.add_member_point_load("M1", PointLoad::new(-10.0, 3.0, LoadDirection::Fy, "D"))?;
    model.add_member_point_load("M1", PointLoad::new(45.0, 1.5, LoadDirection::Fy, "L"))?;
    model.add_member_point_load("M1", PointLoad::new(-20.0, 4.5, LoadDirection::Fy, "L"))?;

    model.add_load_combo(LoadCombination::lrfd_dead_only())?;
    model.add_load_combo(LoadCombination::lrfd_dead_live())?;
    model.add_load_combo(
        LoadCombination::new("1.2D+1.6L+0.5S")
            .with_case("D", 0.5)
            .with_case("L", 1.6)
            .with_case("S", 0.5),
    )?;

    Ok(model)
}

/// Sampled diagram of every combination with the max/min envelope
fn print_envelope(model: &FrameModel, diagram: Diagram, unit: &str) -> Result<()> {
    let combos = model.combo_names();
    let mut curves = Vec::with_capacity(combos.len());
    for combo in &combos {
        curves.push(model.member_results("M1", combo)?.sample(diagram, SAMPLES)?);
    }

    println!("{} diagram [{}] ({} points, every {}th shown)", diagram.label(), unit, SAMPLES, PRINT_EVERY);
    print!("  {:>6}", "x");
    for combo in &combos {
        print!("  {:>15}", combo);
    }
    println!("  {:>10}  {:>10}", "max", "min");

    for i in (0..SAMPLES).step_by(PRINT_EVERY).chain(std::iter::once(SAMPLES - 1)) {
        let x = curves[0][i].0;
        let values: Vec<f64> = curves.iter().map(|c| c[i].1).collect();
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);

        print!("  {:6.3}", x);
        for v in &values {
            print!("  {:15.3}", v);
        }
        println!("  {:10.3}  {:10.3}", max, min);
    }

    for combo in &combos {
        let (min, max) = model.member_results("M1", combo)?.extremes(diagram);
        println!(
            "  {:<16} max {:10.3} at x={:.3}, min {:10.3} at x={:.3}",
            combo, max.value, max.x, min.value, min.x
        );
    }
    println!();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Frame Solver Example: Simply Supported Beam ===\n");

    let mut model = build_model()?;
    model.analyze(AnalysisOptions::linear().with_statics_check())?;

    for combo_name in model.combo_names() {
        println!("=== Results for {} ===", combo_name);

        for node_name in ["N1", "N2"] {
            let rxn = model.node_reaction(node_name, &combo_name)?;
            println!("  Reaction {}: FY={:.3}kN", node_name, rxn.fy);
        }

        let beam = model.member_results("M1", &combo_name)?;
        println!("  Midspan deflection: {:.3}mm", beam.deflection_y(3.0)? * 1000.0);

        if let Some(report) = &model.analysis()?.combo(&combo_name)?.statics {
            let status = if report.balanced { "balanced" } else { "NOT balanced" };
            println!("  Statics check: {}", status);
        }
        println!();
    }

    print_envelope(&model, Diagram::MomentZ, "kN·m")?;
    print_envelope(&model, Diagram::ShearY, "kN")?;

    println!("=== Analysis Complete ===");
    Ok(())
}
