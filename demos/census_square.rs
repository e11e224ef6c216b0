// Square slab driven for a handful of census steps.
//
// Stands in for the host timestep driver: builds the problem, injects a
// centred source, advances the master key each step and prints the reduced
// event counters and the aggregate tally.

use neutral_mc::{CrossSection, Material, Mesh, SourceRegion, StepContext, Transport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let nparticles = 4096;
    let dt = 1.0e-8;
    let nsteps = 5u64;

    let mesh = Mesh::uniform(64, 64, 0.1, 0.1, 8.9)?;
    let material = Material::new(100.0, 100.0, 1.0);
    let cs_scatter = CrossSection::constant(1.0e-5, 2.0e7, 30.0)?;
    let cs_absorb = CrossSection::constant(1.0e-5, 2.0e7, 10.0)?;

    let mut sim = Transport::new(mesh, material, cs_scatter, cs_absorb);
    let source = SourceRegion {
        left: 2.8,
        bottom: 2.8,
        width: 0.8,
        height: 0.8,
    };
    sim.inject_particles(&source, nparticles, 1.0e6, dt)?;

    for step in 1..=nsteps {
        let counters = sim.advance_particles_one_step(&StepContext {
            master_key: step,
            dt,
            ntotal_particles: nparticles,
            initial: true,
        })?;
        println!(
            "step {}: facets {} collisions {} processed {}",
            step, counters.nfacets, counters.ncollisions, counters.nprocessed
        );
    }

    println!("final energy deposition tally {:.15e}", sim.tally_total());
    Ok(())
}
