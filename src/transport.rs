// Timestep driver.
//
// Owns the immutable problem description (mesh, material, cross-section
// tables) plus the mutable population and tally, and runs one census step
// at a time: partition the store into disjoint worker slices, track every
// particle to census, then reduce the per-worker event counters. The only
// cross-worker traffic is the atomic tally add.

use log::{debug, info};
use rayon::prelude::*;

use crate::engine::{self, EventCounters, StepContext};
use crate::error::TransportResult;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::particle::{Particle, ParticleStore};
use crate::source::{self, SourceRegion};
use crate::tally::EnergyTally;
use crate::xsection::CrossSection;

/// Monte Carlo transport state for one mesh tile.
pub struct Transport {
    mesh: Mesh,
    material: Material,
    cs_scatter: CrossSection,
    cs_absorb: CrossSection,
    tally: EnergyTally,
    particles: ParticleStore,
    nworkers: usize,
}

impl Transport {
    /// Assemble a simulation over validated inputs. The tally covers the
    /// mesh's local tile.
    pub fn new(
        mesh: Mesh,
        material: Material,
        cs_scatter: CrossSection,
        cs_absorb: CrossSection,
    ) -> Self {
        let tally = EnergyTally::new(mesh.nx(), mesh.ny());
        Self {
            mesh,
            material,
            cs_scatter,
            cs_absorb,
            tally,
            particles: ParticleStore::new(),
            nworkers: rayon::current_num_threads(),
        }
    }

    /// Override the number of worker partitions. One worker runs the step
    /// sequentially, which also makes repeated runs bit-identical.
    pub fn with_workers(mut self, nworkers: usize) -> Self {
        self.nworkers = nworkers.max(1);
        self
    }

    /// Seed new particles from a rectangular source region.
    pub fn inject_particles(
        &mut self,
        region: &SourceRegion,
        nparticles: usize,
        initial_energy: f64,
        dt: f64,
    ) -> TransportResult<()> {
        source::inject_particles(
            &mut self.particles,
            &self.mesh,
            region,
            nparticles,
            initial_energy,
            dt,
        )
    }

    /// Append a pre-built particle (hosts that do their own sourcing).
    pub fn push_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Advance the whole population one census step and return the reduced
    /// event counters.
    pub fn advance_particles_one_step(
        &mut self,
        ctx: &StepContext,
    ) -> TransportResult<EventCounters> {
        debug_assert!(
            ctx.master_key != 0,
            "master key 0 is reserved for injection streams"
        );
        debug!(
            "census step: master key {}, dt {:.6e}, {} particles",
            ctx.master_key,
            ctx.dt,
            self.particles.len()
        );

        let nworkers = self.nworkers;
        let mesh = &self.mesh;
        let material = &self.material;
        let cs_scatter = &self.cs_scatter;
        let cs_absorb = &self.cs_absorb;
        let tally = &self.tally;

        let slices = self.particles.partition_mut(nworkers);
        let counters = slices
            .into_par_iter()
            .map(|mut slice| {
                let mut local = EventCounters::default();
                for ip in 0..slice.len() {
                    engine::track_particle(
                        &mut slice,
                        ip,
                        mesh,
                        material,
                        cs_scatter,
                        cs_absorb,
                        tally,
                        ctx,
                        &mut local,
                    )?;
                }
                Ok(local)
            })
            .try_reduce(EventCounters::default, |a, b| Ok(a + b))?;

        info!(
            "census step {} complete: {} facets, {} collisions, {} processed, {} alive",
            ctx.master_key,
            counters.nfacets,
            counters.ncollisions,
            counters.nprocessed,
            self.particles.alive_count()
        );
        Ok(counters)
    }

    /// Read-only view of the energy deposition tally. Call only between
    /// steps; workers write it during `advance_particles_one_step`.
    pub fn read_tally(&self) -> &EnergyTally {
        &self.tally
    }

    /// Total energy deposition over the local tile.
    pub fn tally_total(&self) -> f64 {
        self.tally.sum()
    }

    /// Compare the aggregate deposition against an expected value within a
    /// relative tolerance, logging the outcome.
    pub fn validate_tally(&self, expected: f64, rel_tolerance: f64) -> bool {
        let total = self.tally.sum();
        let passed = if expected == 0.0 {
            total.abs() <= rel_tolerance
        } else {
            ((total - expected) / expected).abs() <= rel_tolerance
        };
        if passed {
            info!("tally validation passed: {:.15e}", total);
        } else {
            info!(
                "tally validation FAILED: expected {:.12e}, result was {:.12e}",
                expected, total
            );
        }
        passed
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    /// Copy out one particle for inspection.
    pub fn particle(&self, index: usize) -> Particle {
        self.particles.get(index)
    }

    pub fn nparticles(&self) -> usize {
        self.particles.len()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}
