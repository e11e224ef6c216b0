// Per-particle event tracking.
//
// Within a timestep each particle repeatedly selects the nearest of three
// candidate events: collision, facet crossing, or census. The handlers
// mutate position, direction, energy, weight and the two residuals
// (mean-free-paths to collision, seconds to census), and accumulate energy
// deposition locally until a flush point (cell exit, death, census) pushes
// it into the shared tally.

use nalgebra::Vector2;

use crate::constants::OPEN_BOUND_CORRECTION;
use crate::error::TransportResult;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::particle::ParticleSliceMut;
use crate::physics::{elastic_scatter, energy_deposition, speed_from_energy};
use crate::rng;
use crate::tally::EnergyTally;
use crate::xsection::CrossSection;

/// Next event selected for a streaming particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextEvent {
    Collision,
    /// Facet crossing; `x_axis` is true when the facet bounds the x axis.
    Facet { x_axis: bool },
    Census,
}

/// Aggregate event counts for one step, reduced across workers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventCounters {
    pub nfacets: u64,
    pub ncollisions: u64,
    pub nprocessed: u64,
}

impl std::ops::Add for EventCounters {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            nfacets: self.nfacets + other.nfacets,
            ncollisions: self.ncollisions + other.ncollisions,
            nprocessed: self.nprocessed + other.nprocessed,
        }
    }
}

impl std::ops::AddAssign for EventCounters {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Per-step parameters threaded explicitly through every tracking call.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    /// Separates this step's random streams from every other step's.
    /// Key 0 is reserved for injection, so step keys start at 1.
    pub master_key: u64,
    /// Timestep length [s].
    pub dt: f64,
    /// Global particle count, used to normalise tally contributions.
    pub ntotal_particles: usize,
    /// Step start: reset the census budget and sample the initial
    /// collision distance.
    pub initial: bool,
}

/// Distance to the nearest facet along the flight direction, and whether
/// that facet bounds the x axis.
///
/// Cells are half-open, so a negative-going particle targets the open
/// (left/bottom) bound shifted out by `OPEN_BOUND_CORRECTION`; the crossing
/// then lands strictly inside the neighbouring cell.
#[allow(clippy::too_many_arguments)]
pub fn distance_to_facet(
    mesh: &Mesh,
    x: f64,
    y: f64,
    omega_x: f64,
    omega_y: f64,
    speed: f64,
    cellx: i32,
    celly: i32,
) -> (f64, bool) {
    let u_x_inv = 1.0 / (omega_x * speed);
    let u_y_inv = 1.0 / (omega_y * speed);

    let dt_x = if omega_x >= 0.0 {
        (mesh.edge_right(cellx) - x) * u_x_inv
    } else {
        (mesh.edge_left(cellx) - OPEN_BOUND_CORRECTION - x) * u_x_inv
    };
    let dt_y = if omega_y >= 0.0 {
        (mesh.edge_top(celly) - y) * u_y_inv
    } else {
        (mesh.edge_bottom(celly) - OPEN_BOUND_CORRECTION - y) * u_y_inv
    };

    let x_facet = dt_x < dt_y;
    let distance = speed * if x_facet { dt_x } else { dt_y };
    (distance, x_facet)
}

/// Update cell index and direction for a facet crossing.
///
/// At a global boundary the particle reflects: the corresponding direction
/// cosine flips and the cell index stays put. Interior crossings step the
/// index by one on the crossing axis.
fn cross_facet(slice: &mut ParticleSliceMut<'_>, ip: usize, mesh: &Mesh, x_axis: bool) {
    if x_axis {
        let edge = mesh.global_nx() as i32 - 1;
        if slice.omega_x[ip] > 0.0 {
            if slice.cellx[ip] >= edge {
                slice.omega_x[ip] = -slice.omega_x[ip];
            } else {
                slice.cellx[ip] += 1;
            }
        } else if slice.omega_x[ip] < 0.0 {
            if slice.cellx[ip] <= 0 {
                slice.omega_x[ip] = -slice.omega_x[ip];
            } else {
                slice.cellx[ip] -= 1;
            }
        }
    } else {
        let edge = mesh.global_ny() as i32 - 1;
        if slice.omega_y[ip] > 0.0 {
            if slice.celly[ip] >= edge {
                slice.omega_y[ip] = -slice.omega_y[ip];
            } else {
                slice.celly[ip] += 1;
            }
        } else if slice.omega_y[ip] < 0.0 {
            if slice.celly[ip] <= 0 {
                slice.omega_y[ip] = -slice.omega_y[ip];
            } else {
                slice.celly[ip] -= 1;
            }
        }
    }
}

/// Track one particle to census or death.
///
/// `ip` indexes into `slice`; the particle's random stream is keyed by
/// `slice.first_key + ip` together with the step's master key, and a
/// per-particle counter that advances once per event iteration. Collision
/// draws consume one four-word block: word 0 decides absorption, word 1
/// seeds the centre-of-mass angle, word 3 seeds the next collision
/// distance.
#[allow(clippy::too_many_arguments)]
pub fn track_particle(
    slice: &mut ParticleSliceMut<'_>,
    ip: usize,
    mesh: &Mesh,
    material: &Material,
    cs_scatter: &CrossSection,
    cs_absorb: &CrossSection,
    tally: &EnergyTally,
    ctx: &StepContext,
    counters: &mut EventCounters,
) -> TransportResult<()> {
    if !slice.alive[ip] {
        return Ok(());
    }
    counters.nprocessed += 1;

    let pid = slice.first_key + ip as u64;
    let inv_ntotal = 1.0 / ctx.ntotal_particles as f64;

    // Cache cell data and cross sections for the current energy
    let mut local_density = mesh.density_at(slice.cellx[ip], slice.celly[ip]);
    let (mut micro_scatter, _) = cs_scatter.lookup(slice.energy[ip])?;
    let (mut micro_absorb, _) = cs_absorb.lookup(slice.energy[ip])?;
    let mut number_density = material.number_density(local_density);
    let mut mac_scatter = material.macroscopic(number_density, micro_scatter);
    let mut mac_absorb = material.macroscopic(number_density, micro_absorb);
    let mut speed = speed_from_energy(slice.energy[ip]);

    let mut counter: u64 = 0;
    if ctx.initial {
        slice.dt_to_census[ip] = ctx.dt;
        let rn = rng::uniform4(pid, ctx.master_key, counter);
        slice.mfp_to_collision[ip] = -rn[0].ln() / mac_scatter;
    }
    counter += 1;

    let mut ed_local = 0.0;

    loop {
        let cell_mfp = 1.0 / (mac_scatter + mac_absorb);

        let (distance_to_facet, x_facet) = distance_to_facet(
            mesh,
            slice.x[ip],
            slice.y[ip],
            slice.omega_x[ip],
            slice.omega_y[ip],
            speed,
            slice.cellx[ip],
            slice.celly[ip],
        );
        let distance_to_collision = slice.mfp_to_collision[ip] * cell_mfp;
        let distance_to_census = speed * slice.dt_to_census[ip];

        debug_assert!(
            speed.is_finite() && !distance_to_facet.is_nan(),
            "arithmetic failure for particle {} at counter {}: speed {}, facet distance {}",
            pid,
            counter,
            speed,
            distance_to_facet
        );

        let event = if distance_to_collision < distance_to_facet
            && distance_to_collision < distance_to_census
        {
            NextEvent::Collision
        } else if distance_to_facet < distance_to_census {
            NextEvent::Facet { x_axis: x_facet }
        } else {
            NextEvent::Census
        };

        match event {
            NextEvent::Collision => {
                counters.ncollisions += 1;

                // Deposition for the segment uses the pre-collision energy
                ed_local += energy_deposition(
                    slice.energy[ip],
                    slice.weight[ip],
                    distance_to_collision,
                    number_density,
                    micro_absorb,
                    micro_scatter + micro_absorb,
                    material.mass_no,
                );

                slice.x[ip] += distance_to_collision * slice.omega_x[ip];
                slice.y[ip] += distance_to_collision * slice.omega_y[ip];

                let pabsorb = mac_absorb * cell_mfp;
                let rn = rng::uniform4(pid, ctx.master_key, counter);

                if rn[0] < pabsorb {
                    // Implicit capture: reduce the weight, keep the energy
                    slice.weight[ip] *= 1.0 - pabsorb;
                } else {
                    let mu_cm = 1.0 - 2.0 * rn[1];
                    let mut omega = Vector2::new(slice.omega_x[ip], slice.omega_y[ip]);
                    elastic_scatter(&mut slice.energy[ip], &mut omega, material.mass_no, mu_cm);
                    slice.omega_x[ip] = omega.x;
                    slice.omega_y[ip] = omega.y;
                }

                if slice.energy[ip] < material.min_energy_of_interest {
                    let (tx, ty) = mesh.local_cell(slice.cellx[ip], slice.celly[ip]);
                    tally.add(tx, ty, ed_local * inv_ntotal);
                    slice.alive[ip] = false;
                    return Ok(());
                }

                // Energy changed, refresh the cached cross sections
                let (ms, _) = cs_scatter.lookup(slice.energy[ip])?;
                let (ma, _) = cs_absorb.lookup(slice.energy[ip])?;
                micro_scatter = ms;
                micro_absorb = ma;
                number_density = material.number_density(local_density);
                mac_scatter = material.macroscopic(number_density, micro_scatter);
                mac_absorb = material.macroscopic(number_density, micro_absorb);

                // Word 3 of this collision's block seeds the next flight
                slice.mfp_to_collision[ip] = -rn[3].ln() / mac_scatter;
                slice.dt_to_census[ip] -= distance_to_collision / speed;
                speed = speed_from_energy(slice.energy[ip]);
            }
            NextEvent::Facet { x_axis } => {
                counters.nfacets += 1;

                slice.x[ip] += distance_to_facet * slice.omega_x[ip];
                slice.y[ip] += distance_to_facet * slice.omega_y[ip];
                slice.mfp_to_collision[ip] -= distance_to_facet * (mac_scatter + mac_absorb);
                slice.dt_to_census[ip] -= distance_to_facet / speed;

                // Flush deposition into the cell being left
                ed_local += energy_deposition(
                    slice.energy[ip],
                    slice.weight[ip],
                    distance_to_facet,
                    number_density,
                    micro_absorb,
                    micro_scatter + micro_absorb,
                    material.mass_no,
                );
                let (tx, ty) = mesh.local_cell(slice.cellx[ip], slice.celly[ip]);
                tally.add(tx, ty, ed_local * inv_ntotal);
                ed_local = 0.0;

                cross_facet(slice, ip, mesh, x_axis);

                local_density = mesh.density_at(slice.cellx[ip], slice.celly[ip]);
                number_density = material.number_density(local_density);
                mac_scatter = material.macroscopic(number_density, micro_scatter);
                mac_absorb = material.macroscopic(number_density, micro_absorb);
            }
            NextEvent::Census => {
                slice.x[ip] += distance_to_census * slice.omega_x[ip];
                slice.y[ip] += distance_to_census * slice.omega_y[ip];
                slice.mfp_to_collision[ip] -= distance_to_census * (mac_scatter + mac_absorb);

                ed_local += energy_deposition(
                    slice.energy[ip],
                    slice.weight[ip],
                    distance_to_census,
                    number_density,
                    micro_absorb,
                    micro_scatter + micro_absorb,
                    material.mass_no,
                );
                let (tx, ty) = mesh.local_cell(slice.cellx[ip], slice.celly[ip]);
                tally.add(tx, ty, ed_local * inv_ntotal);

                slice.dt_to_census[ip] = 0.0;
                break;
            }
        }

        counter += 1;

        debug_assert!(
            slice.dt_to_census[ip] >= -1e-12 && slice.mfp_to_collision[ip] >= -1e-12,
            "invariant violation for particle {} at counter {}: dt_to_census {}, mfp_to_collision {}",
            pid,
            counter,
            slice.dt_to_census[ip],
            slice.mfp_to_collision[ip]
        );
        debug_assert!(
            (slice.omega_x[ip] * slice.omega_x[ip] + slice.omega_y[ip] * slice.omega_y[ip] - 1.0)
                .abs()
                < 1e-12,
            "invariant violation for particle {} at counter {}: direction not unit",
            pid,
            counter
        );
    }

    Ok(())
}
