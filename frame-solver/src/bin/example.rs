//! Frame Solver Example - Portal Frame with a Hinged Girder

use frame_solver::prelude::*;

fn main() {
    env_logger::init();
    println!("=== Frame Solver Example: Portal Frame ===\n");

    let mut model = Model::new();

    // Concrete column and girder (kN, m)
    // EA = E·A = 3.0e7 · 0.16, EI = E·I = 3.0e7 · 2.13e-3
    let column = SectionStiffness::new(4.8e6, 6.4e4);
    let girder = SectionStiffness::new(7.2e6, 2.16e5).with_shear(2.4e6);

    //     N1 ------o N2
    //     |          |
    //     |          |
    //     N0        N3
    //   Fixed     Pinned
    //
    // The girder is hinged at N2.
    let height = 4.0;
    let span = 6.0;

    let n0 = model.add_node(Node::new(0.0, 0.0));
    let n1 = model.add_node(Node::new(0.0, height));
    let n2 = model.add_node(Node::new(span, height));
    let n3 = model.add_node(Node::new(span, 0.0));

    let left = model.add_beam(Beam::new(n0, n1, column)).unwrap();
    let beam = model
        .add_beam(Beam::new(n1, n2, girder).with_releases(BeamReleases::pin_end()))
        .unwrap();
    let right = model.add_beam(Beam::new(n3, n2, column)).unwrap();

    model.add_restraint(RestrictedDegree::fixed(n0)).unwrap();
    model.add_restraint(RestrictedDegree::pinned(n3)).unwrap();

    // Dead load: 20 kN/m on the girder, self-weight of the columns
    model.add_load_group(
        LoadGroup::named("Dead")
            .with_distributed(DistributedLoad::uniform(beam, LineLoad::transverse(-20.0)))
            .with_distributed(DistributedLoad::self_weight(left, 4.0))
            .with_distributed(DistributedLoad::self_weight(right, 4.0)),
    );
    // Wind: 15 kN at the top of the left column
    model.add_load_group(LoadGroup::named("Wind").with_nodal(NodalLoad::force(n1, 15.0, 0.0)));

    println!("Model created:");
    println!("  Nodes: {}", model.nodes.len());
    println!("  Beams: {}", model.beams.len());
    println!("  Load groups: {}", model.loads.len());

    let mut solution = match model.solve(&AnalysisOptions::new().with_max_length(0.5)) {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            return;
        }
    };
    println!(
        "\nAnalysis complete: {} nodes, {} elements\n",
        solution.node_count(),
        solution.element_count()
    );

    solution.define_combination("ULS", Combination::factored(&[("Dead", 1.35), ("Wind", 1.5)]));

    for name in ["Dead", "Wind"] {
        if let Ok(result) = solution.group(name) {
            print_result(result, solution.restraints());
        }
    }
    let restraints = solution.restraints().to_vec();
    match solution.combination("ULS") {
        Ok(result) => print_result(result, &restraints),
        Err(e) => eprintln!("Combination failed: {}", e),
    }

    println!("--- Girder (ULS) ---");
    let uls = Combination::factored(&[("Dead", 1.35), ("Wind", 1.5)]);
    for i in 0..=6 {
        let x = span * i as f64 / 6.0;
        if let Ok(p) = solution.combined_point("ULS", &uls, beam, x) {
            println!(
                "  x = {:4.1} m: N = {:8.2} kN, V = {:8.2} kN, M = {:8.2} kNm, dy = {:8.3} mm",
                x,
                p.force.n,
                p.force.v,
                p.force.m,
                p.displacement.dy * 1000.0
            );
        }
    }

    println!("\n=== Example Complete ===");
}

fn print_result(result: &GroupResult, restraints: &[RestrictedDegree]) {
    println!("--- {} ---", result.name);
    for (restraint, reaction) in restraints.iter().zip(&result.support_reactions) {
        println!(
            "  Support N{}: Fx = {:8.2} kN, Fy = {:8.2} kN, Mz = {:8.2} kNm",
            restraint.node, reaction.fx, reaction.fy, reaction.mz
        );
    }
    let summary = result.summary();
    println!(
        "  Max displacement: {:.3} mm (beam {})",
        summary.max_displacement * 1000.0,
        summary.max_displacement_beam
    );
    println!(
        "  Max moment: {:.2} kNm (beam {})\n",
        summary.max_moment, summary.max_moment_beam
    );
}
