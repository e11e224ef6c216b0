// Collision physics for two-dimensional elastic transport.

use nalgebra::Vector2;

use crate::constants::{BARNS, EV_TO_J, PARTICLE_MASS};

/// Particle speed from kinetic energy in eV.
#[inline]
pub fn speed_from_energy(energy: f64) -> f64 {
    ((2.0 * energy * EV_TO_J) / PARTICLE_MASS).sqrt()
}

/// Perform an elastic scatter off a nucleus of mass number `mass_no`.
///
/// `mu_cm` is the cosine of the centre-of-mass scattering angle, sampled
/// uniformly on [-1, 1]. The exit energy follows from two-body kinematics
/// and the direction rotates in-plane by the lab-frame angle; all particles
/// stay in the two-dimensional plane.
pub fn elastic_scatter(energy: &mut f64, omega: &mut Vector2<f64>, mass_no: f64, mu_cm: f64) {
    let a = mass_no;
    let e_in = *energy;

    let e_out = e_in * (a * a + 2.0 * a * mu_cm + 1.0) / ((a + 1.0) * (a + 1.0));

    // Convert the angle into the laboratory frame of reference
    let cos_theta = 0.5 * ((a + 1.0) * (e_out / e_in).sqrt() - (a - 1.0) * (e_in / e_out).sqrt());
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    *omega = Vector2::new(
        omega.x * cos_theta - omega.y * sin_theta,
        omega.x * sin_theta + omega.y * cos_theta,
    );
    *energy = e_out;
}

/// Energy deposited over a path segment of length `path_length`.
///
/// The heating response subtracts the average exit energy of each reaction
/// channel from the incident energy; an absorbed particle's average exit
/// energy is treated as zero. Cross sections are microscopic, in barns.
pub fn energy_deposition(
    energy: f64,
    weight: f64,
    path_length: f64,
    number_density: f64,
    microscopic_cs_absorb: f64,
    microscopic_cs_total: f64,
    mass_no: f64,
) -> f64 {
    if microscopic_cs_total == 0.0 {
        // vacuum segment, nothing to deposit
        return 0.0;
    }

    let pabsorb = microscopic_cs_absorb / microscopic_cs_total;
    let average_exit_energy_absorb = 0.0;
    let absorption_heating = pabsorb * average_exit_energy_absorb;

    let a = mass_no;
    let average_exit_energy_scatter = energy * (a * a + a + 1.0) / ((a + 1.0) * (a + 1.0));
    let scattering_heating = (1.0 - pabsorb) * average_exit_energy_scatter;

    let heating_response = energy - scattering_heating - absorption_heating;
    weight * path_length * (microscopic_cs_total * BARNS) * heating_response * number_density
}
