use log::{debug, trace};
use num::PrimInt;
use sprs::{CsMat, TriMat};

use crate::basis::Basis;
use crate::lattice::Lattice;
use crate::{BitOps, Error, FockState, Spin};

/// Computes the potential term of the Hamiltonian.
/// # Arguments
/// * __`state`__ - The encoded fock state.
/// * __`cons_u`__ - The interaction strength $U$.
/// # Returns
/// * __`pot_term`__ - The potential term of the Hamiltonian. Gives the
/// diagonal term of the Hamiltonian.
/// # Definition
/// The potential term is defined
/// $$
/// H_U=U\sum_i n_{i\uparrow}n_{i\downarrow}
/// $$
pub fn potential<T>(state: &FockState<T>, cons_u: f64) -> f64
where
    T: BitOps + std::fmt::Display,
{
    let pot = (state.double_occupations() as f64) * cons_u;
    trace!("Potential <x|U|x> = {:.2} for state |x> = {}", pot, state);
    pot
}

/// Fermionic sign of the hop `i -> j` in channel `spin`.
/// # Definition
/// The sign is the parity of the number of occupied sites of the same
/// channel strictly between the two ends of the hop, in the fixed bit
/// ordering. The occupations between the endpoints are unchanged by the hop,
/// so the sign is the same seen from either end and the matrix stays
/// Hermitian.
pub fn hop_sign<T: BitOps>(state: &FockState<T>, i: usize, j: usize, spin: Spin) -> f64 {
    let (a, b) = if i < j { (j, i) } else { (i, j) };
    // Bits strictly between a and b, indexed from the left.
    let mask = !(<T>::ones() >> a) & (<T>::ones() >> (b + 1));
    let n_between = match spin {
        Spin::Up => (state.spin_up & mask).count_ones(),
        Spin::Down => (state.spin_down & mask).count_ones(),
    };
    if n_between % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Assembles the sparse Hamiltonian in the enumerated basis.
/// # Arguments
/// * __`basis`__ - The enumerated many-body basis.
/// * __`lattice`__ - The lattice connectivity. Its site count must match the
/// basis.
/// * __`cons_t`__ - The hopping amplitude $t$.
/// * __`cons_u`__ - The interaction strength $U$.
/// # Returns
/// The compressed-row matrix of dimension `basis.size()` squared. Row `i`
/// holds `-t` times the fermionic sign for every state reachable from state
/// `i` by one nearest-neighbour hop, and `U` times the double occupation
/// count on the diagonal when it is non-zero. The matrix is built from a
/// triplet buffer and compacted to CSR exactly once; it is read-only
/// afterwards.
/// # Errors
/// `InvalidParameters` when the lattice and the basis disagree on the site
/// count. `InvalidTransition` when a hop target is missing from the basis,
/// which indicates an internal inconsistency and never happens for valid
/// neighbour pairs.
pub fn build_hamiltonian<T>(
    basis: &Basis<T>,
    lattice: &Lattice,
    cons_t: f64,
    cons_u: f64,
) -> Result<CsMat<f64>, Error>
where
    T: BitOps + PrimInt + Ord + std::fmt::Debug + std::fmt::Display,
{
    if basis.n_sites() != lattice.n_sites() {
        return Err(Error::InvalidParameters {
            details: format!(
                "basis spans {} sites but lattice has {}",
                basis.n_sites(),
                lattice.n_sites()
            ),
        });
    }
    let dim = basis.size();
    let mut triplets = TriMat::new((dim, dim));
    for row in 0..dim {
        let state = basis.state(row);
        let pot = potential(&state, cons_u);
        if pot != 0.0 {
            triplets.add_triplet(row, row, pot);
        }
        // Each (row, col) pair is written by exactly one originating hop;
        // the reverse hop is discovered from the other row.
        for &(a, b) in lattice.bonds() {
            for spin in [Spin::Up, Spin::Down] {
                if state.occupied(a, spin) == state.occupied(b, spin) {
                    continue;
                }
                let mut target = state;
                match spin {
                    Spin::Up => {
                        target.spin_up.set(a);
                        target.spin_up.set(b);
                    }
                    Spin::Down => {
                        target.spin_down.set(a);
                        target.spin_down.set(b);
                    }
                }
                let col = basis.rank(&target).map_err(|_| Error::InvalidTransition)?;
                let sign = hop_sign(&state, a, b, spin);
                if cons_t == 0.0 {
                    // Do not store explicit zeros.
                    continue;
                }
                trace!(
                    "Hop ({}, {}, {}): |x> = {} -> |x'> = {}, element {:.2}",
                    a,
                    b,
                    spin,
                    state,
                    target,
                    -cons_t * sign
                );
                triplets.add_triplet(row, col, -cons_t * sign);
            }
        }
    }
    let matrix = triplets.to_csr();
    debug!(
        "Assembled Hamiltonian: dim = {}, {} non-zero elements",
        dim,
        matrix.nnz()
    );
    Ok(matrix)
}
