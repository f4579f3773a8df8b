use log::info;
use num::PrimInt;
use sprs::CsMat;

use crate::basis::Basis;
use crate::hamiltonian::build_hamiltonian;
use crate::lanczos::Lanczos;
use crate::lattice::{BoundaryCondition, Lattice};
use crate::{BitOps, Error};

/// The 2D Hubbard model at fixed particle number per spin.
/// # Usage
/// Construction enumerates the basis eagerly; the sparse Hamiltonian is
/// assembled once by [HubbardModel::build_hamiltonian] and cached read-only.
/// The word `T` must be wide enough for the lattice, e.g. [u16] for a
/// $4\times4$ lattice.
/// ```rust
/// use hubbard2d::lattice::BoundaryCondition;
/// use hubbard2d::model::HubbardModel;
/// let mut model =
///     HubbardModel::<u8>::new(2, 2, 1, 1, 1.0, 4.0, BoundaryCondition::default()).unwrap();
/// assert_eq!(model.basis().size(), 16);
/// model.build_hamiltonian().unwrap();
/// assert_eq!(model.nnz(), 68);
/// ```
pub struct HubbardModel<T> {
    lattice: Lattice,
    basis: Basis<T>,
    cons_t: f64,
    cons_u: f64,
    hamiltonian: Option<CsMat<f64>>,
}

impl<T> HubbardModel<T>
where
    T: BitOps + PrimInt + Ord + std::fmt::Debug + std::fmt::Display,
{
    /// Validates the parameters, builds the lattice and enumerates the
    /// basis.
    pub fn new(
        lx: usize,
        ly: usize,
        n_up: usize,
        n_down: usize,
        cons_t: f64,
        cons_u: f64,
        boundary: BoundaryCondition,
    ) -> Result<Self, Error> {
        let lattice = Lattice::new(lx, ly, boundary)?;
        let basis = Basis::new(lattice.n_sites(), n_up, n_down)?;
        info!(
            "2D {}x{} Hubbard model ({:?}), {} up / {} down electrons, basis dimension {}",
            lx,
            ly,
            boundary,
            n_up,
            n_down,
            basis.size()
        );
        Ok(HubbardModel {
            lattice,
            basis,
            cons_t,
            cons_u,
            hamiltonian: None,
        })
    }

    pub fn basis(&self) -> &Basis<T> {
        &self.basis
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn cons_t(&self) -> f64 {
        self.cons_t
    }

    pub fn cons_u(&self) -> f64 {
        self.cons_u
    }

    /// Assembles the sparse Hamiltonian once; later calls are no-ops.
    pub fn build_hamiltonian(&mut self) -> Result<(), Error> {
        if self.hamiltonian.is_none() {
            let matrix =
                build_hamiltonian(&self.basis, &self.lattice, self.cons_t, self.cons_u)?;
            self.hamiltonian = Some(matrix);
        }
        Ok(())
    }

    /// The cached matrix, when [HubbardModel::build_hamiltonian] has run.
    pub fn hamiltonian(&self) -> Option<&CsMat<f64>> {
        self.hamiltonian.as_ref()
    }

    /// Number of stored non-zero elements of the assembled matrix.
    pub fn nnz(&self) -> usize {
        self.hamiltonian.as_ref().map_or(0, |m| m.nnz())
    }

    /// A seeded solver run borrowing the assembled matrix.
    /// # Errors
    /// `InvalidParameters` when the Hamiltonian has not been assembled.
    pub fn solver(&self, seed: u64) -> Result<Lanczos, Error> {
        let matrix = self.hamiltonian.as_ref().ok_or(Error::InvalidParameters {
            details: "Hamiltonian has not been assembled".to_owned(),
        })?;
        Lanczos::new(matrix, seed)
    }
}
