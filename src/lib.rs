use derive_more::Error;
use std::fmt;

// Have the FockState struct at the root.
include!("fock_state.rs");

/// Basis enumeration at fixed particle number per spin.
/// # Definition
/// The many-body basis is the direct product of every spin up occupation of
/// $n_\uparrow$ electrons with every spin down occupation of $n_\downarrow$
/// electrons over the $N=L_xL_y$ sites, so its dimension is
///
/// $$
/// \dim\mathcal{H}=\binom{N}{n_\uparrow}\binom{N}{n_\downarrow}
/// $$
///
/// Each state is assigned a dense rank; the ranks define the row and column
/// identity of the Hamiltonian matrix.
pub mod basis;

/// Rectangular lattice geometry and nearest-neighbour bonds.
pub mod lattice;

/// Hubbard's model Hamiltonian assembly.
/// # Definition
/// The Hubbard model Hamiltonian is defined
/// $$
/// H=U\sum_i n_{i\uparrow}n_{i\downarrow}
/// -t\sum_{<i,j>,\sigma}c^\dagger_{i\sigma}c_{j\sigma}+c^\dagger_{j\sigma}c_{i\sigma}
/// $$
/// The kinetic term couples basis states that differ by a single
/// nearest-neighbour hop, with the fermionic sign given by the parity of the
/// number of occupied sites between the two ends of the hop. The potential
/// term is diagonal and counts the doubly occupied sites.
pub mod hamiltonian;

/// Two-phase Lanczos eigensolver for the sparse Hamiltonian.
/// # Usage
/// The eigenvalue phase builds only the tridiagonal projection of the matrix
/// and keeps the $(\alpha_j,\beta_j)$ coefficients; the eigenvector phase
/// replays the same recurrence from the same seeded starting vector to
/// rebuild the Krylov basis on demand.
pub mod lanczos;

/// Model driver tying the basis, the lattice and the solver together.
pub mod model;

/// Errors surfaced by the construction and solving steps.
/// # Propagation
/// Enumeration and assembly errors indicate malformed input or an internal
/// inconsistency and abort the corresponding construction step. Solver
/// failures are recoverable: the partial eigenvalue sequence stays readable
/// on the solver and the caller decides whether to re-run with a larger
/// budget or another seed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Non-physical construction parameters.
    InvalidParameters { details: String },
    /// The state is outside the enumerated basis.
    NotFound,
    /// A hop produced a state that violates the occupation invariant.
    InvalidTransition,
    /// The iteration budget ran out before the tolerances were met.
    NonConvergence { iterations: usize },
    /// The Krylov recurrence produced a degenerate vector before the
    /// requested eigenvalues converged.
    InvariantSubspaceBreakdown { iterations: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidParameters { details } => {
                write!(f, "Invalid model parameters: {}", details)
            }
            Error::NotFound => {
                write!(f, "State is not part of the enumerated basis.")
            }
            Error::InvalidTransition => {
                write!(f, "Hopping generated a state outside the basis.")
            }
            Error::NonConvergence { iterations } => {
                write!(
                    f,
                    "Lanczos did not converge within {} iterations.",
                    iterations
                )
            }
            Error::InvariantSubspaceBreakdown { iterations } => {
                write!(
                    f,
                    "Krylov recurrence broke down after {} iterations.",
                    iterations
                )
            }
        }
    }
}
