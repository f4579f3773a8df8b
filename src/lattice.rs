use log::debug;

use crate::Error;

/// Boundary policy for the lattice connectivity.
/// # Convention
/// The model driver defaults to [BoundaryCondition::Periodic], which wraps
/// both lattice directions. Open boundaries drop the wrapping bonds. The
/// choice changes which site pairs are neighbours and therefore the non-zero
/// structure of the Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    Periodic,
    Open,
}

impl Default for BoundaryCondition {
    /// The documented default boundary policy of the model driver.
    fn default() -> Self {
        BoundaryCondition::Periodic
    }
}

/// Rectangular $L_x\times L_y$ lattice with nearest-neighbour bonds.
/// # Definition
/// Sites are indexed row-major: site $(x, y)$ is $x + L_x y$. Every site
/// contributes its right and down neighbour; with periodic boundaries the
/// neighbours wrap around. Bonds are kept as unordered pairs and
/// deduplicated, so a periodic direction of length $2$ contributes a single
/// bond and a direction of length $1$ contributes none.
#[derive(Debug, Clone)]
pub struct Lattice {
    lx: usize,
    ly: usize,
    boundary: BoundaryCondition,
    bonds: Vec<(usize, usize)>,
}

impl Lattice {
    pub fn new(lx: usize, ly: usize, boundary: BoundaryCondition) -> Result<Self, Error> {
        if lx == 0 || ly == 0 {
            return Err(Error::InvalidParameters {
                details: format!("degenerate lattice dimensions {}x{}", lx, ly),
            });
        }
        let mut bonds: Vec<(usize, usize)> = Vec::with_capacity(2 * lx * ly);
        for y in 0..ly {
            for x in 0..lx {
                let site = x + lx * y;
                let right = match boundary {
                    BoundaryCondition::Periodic => Some((x + 1) % lx + lx * y),
                    BoundaryCondition::Open if x + 1 < lx => Some(x + 1 + lx * y),
                    BoundaryCondition::Open => None,
                };
                let down = match boundary {
                    BoundaryCondition::Periodic => Some(x + lx * ((y + 1) % ly)),
                    BoundaryCondition::Open if y + 1 < ly => Some(x + lx * (y + 1)),
                    BoundaryCondition::Open => None,
                };
                for neighbour in [right, down].into_iter().flatten() {
                    if neighbour == site {
                        continue;
                    }
                    let pair = if site < neighbour {
                        (site, neighbour)
                    } else {
                        (neighbour, site)
                    };
                    bonds.push(pair);
                }
            }
        }
        bonds.sort_unstable();
        bonds.dedup();
        debug!(
            "Lattice {}x{} ({:?}): {} bonds",
            lx,
            ly,
            boundary,
            bonds.len()
        );
        Ok(Lattice {
            lx,
            ly,
            boundary,
            bonds,
        })
    }

    pub fn lx(&self) -> usize {
        self.lx
    }

    pub fn ly(&self) -> usize {
        self.ly
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    /// Number of lattice sites.
    pub fn n_sites(&self) -> usize {
        self.lx * self.ly
    }

    /// Deduplicated nearest-neighbour pairs `(a, b)` with `a < b`.
    pub fn bonds(&self) -> &[(usize, usize)] {
        &self.bonds
    }
}
