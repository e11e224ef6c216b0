use thiserror::Error;

/// Errors surfaced by the transport kernel.
///
/// `OutOfRange`, `InvalidMesh` and `InvalidTable` are fatal input errors and
/// abort the step through normal `Result` propagation. Non-finite arithmetic
/// and state-space violations on the hot path are checked by debug
/// assertions that name the offending particle key and stream counter; the
/// `Arithmetic` and `InvariantViolation` kinds exist for collaborators that
/// want to report those conditions as values.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Energy fell outside the keyed range of a cross-section table.
    #[error("energy {energy:.6e} eV outside cross-section table range [{lo:.6e}, {hi:.6e})")]
    OutOfRange { energy: f64, lo: f64, hi: f64 },

    /// Mesh construction rejected non-monotone edges, a zero-width cell or
    /// mismatched array lengths.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Cross-section table construction rejected unordered or non-finite
    /// entries.
    #[error("invalid cross-section table: {0}")]
    InvalidTable(String),

    /// A floating-point quantity on the hot path became non-finite.
    #[error("arithmetic failure: {0}")]
    Arithmetic(String),

    /// A tracked particle left the state space the physics permits.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type TransportResult<T> = Result<T, TransportError>;
