// Physical constants shared across the transport kernel.
//
// Values follow CODATA 2018. Material-dependent quantities (mass number,
// molar mass, energy cutoff) are not constants; they live on `Material`.

/// Electron-volt to joule conversion [J/eV].
pub const EV_TO_J: f64 = 1.602176634e-19;

/// Neutron rest mass [kg].
pub const PARTICLE_MASS: f64 = 1.67492749804e-27;

/// Avogadro constant [1/mol].
pub const AVOGADROS: f64 = 6.02214076e23;

/// Square centimetres per barn.
pub const BARNS: f64 = 1.0e-24;

/// Margin applied when a particle streams towards an open (left or bottom)
/// cell bound, so the crossing lands strictly past the half-open edge.
pub const OPEN_BOUND_CORRECTION: f64 = 1.0e-14;
