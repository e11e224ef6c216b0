// Material description governing collision physics.

use serde::{Deserialize, Serialize};

use crate::constants::{AVOGADROS, BARNS};

/// Single-nuclide material parameters.
///
/// One mass number governs the scatter kinematics everywhere the material
/// appears; the mesh supplies the spatially varying mass density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Mass number A of the scattering nuclide.
    pub mass_no: f64,
    /// Molar mass [g/mol].
    pub molar_mass: f64,
    /// Energy below which a collided particle is retired [eV].
    pub min_energy_of_interest: f64,
}

impl Material {
    pub fn new(mass_no: f64, molar_mass: f64, min_energy_of_interest: f64) -> Self {
        Self {
            mass_no,
            molar_mass,
            min_energy_of_interest,
        }
    }

    /// Atoms per unit volume at the given mass density, `ρ·N_A/M`.
    #[inline]
    pub fn number_density(&self, density: f64) -> f64 {
        density * AVOGADROS / self.molar_mass
    }

    /// Macroscopic cross section `Σ = n·σ·BARNS` [1/length] for a
    /// microscopic cross section in barns.
    #[inline]
    pub fn macroscopic(&self, number_density: f64, microscopic: f64) -> f64 {
        number_density * microscopic * BARNS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_density() {
        let mat = Material::new(100.0, 100.0, 1.0);
        let n = mat.number_density(100.0);
        assert!((n - AVOGADROS).abs() / AVOGADROS < 1e-15);
    }

    #[test]
    fn test_macroscopic_scales_with_density_and_sigma() {
        let mat = Material::new(100.0, 1.0, 1.0);
        let n = mat.number_density(1.0 / (AVOGADROS * BARNS));
        let sigma = mat.macroscopic(n, 2.5);
        assert!(
            (sigma - 2.5).abs() < 1e-12,
            "unit number density should return sigma in barns: {}",
            sigma
        );
    }
}
