// 2D Monte Carlo neutral-particle transport on a rectangular Cartesian mesh.
//
// A population of independent particles advances through discrete census
// steps; within a step each particle streams between collision, facet
// crossing and census events, depositing energy into a shared cell tally.
// Random numbers are counter-based, so results do not depend on worker
// count or scheduling.

mod constants;
mod engine;
mod error;
mod material;
mod mesh;
mod particle;
mod physics;
mod rng;
mod source;
mod tally;
mod transport;
mod xsection;

pub use constants::{AVOGADROS, BARNS, EV_TO_J, OPEN_BOUND_CORRECTION, PARTICLE_MASS};
pub use engine::{distance_to_facet, track_particle, EventCounters, NextEvent, StepContext};
pub use error::{TransportError, TransportResult};
pub use material::Material;
pub use mesh::Mesh;
pub use particle::{Particle, ParticleSliceMut, ParticleStore};
pub use physics::{elastic_scatter, energy_deposition, speed_from_energy};
pub use rng::{threefry4x64, uniform4, CounterRng};
pub use source::{inject_particles, SourceRegion};
pub use tally::EnergyTally;
pub use transport::Transport;
pub use xsection::CrossSection;
