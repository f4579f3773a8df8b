use log::debug;
use num::PrimInt;

use crate::{Error, FockState};

/// Enumerates every combination of `n_elec` set bits over the first `n_sites`
/// positions of the word, left aligned, in strictly ascending word order.
/// Steps through the combinations with Gosper's hack.
fn enumerate_occupations<T: PrimInt>(n_sites: usize, n_elec: usize) -> Vec<T> {
    let n_bits: usize = std::mem::size_of::<T>() * u8::BITS as usize;
    let one = T::one();
    let mut out: Vec<T> = Vec::new();
    let mut v = if n_elec == 0 {
        T::zero()
    } else if n_elec == n_bits {
        T::max_value()
    } else {
        (one << n_elec) - one
    };
    // Shifting an empty word by a full word width would overflow.
    let last = if n_elec == 0 {
        T::zero()
    } else {
        v << (n_sites - n_elec)
    };
    loop {
        // Left align: site 0 is the most significant used bit.
        out.push(v << (n_bits - n_sites));
        if v == last {
            break;
        }
        let t = v | (v - one);
        v = (t + one) | (((!t & (t + one)) - one) >> (v.trailing_zeros() as usize + 1));
    }
    out
}

/// The enumerated many-body basis at fixed $(n_\uparrow, n_\downarrow)$.
/// # Definition
/// Holds the spin up and spin down occupation words separately, each sorted
/// in ascending word order. The composite basis is their direct product with
/// the up channel as the major index, so the rank of a state is
///
/// $$
/// \text{rank}(x)=p_\uparrow(x)\binom{N}{n_\downarrow}+p_\downarrow(x)
/// $$
///
/// where $p_\sigma$ is the position of the channel word in its sorted list.
/// Ranks are stable for the lifetime of the basis and identical across runs.
#[derive(Debug, Clone)]
pub struct Basis<T> {
    ups: Vec<T>,
    downs: Vec<T>,
    n_sites: usize,
    n_up: usize,
    n_down: usize,
}

impl<T: PrimInt + Ord + std::fmt::Debug> Basis<T> {
    /// Enumerates the basis for `n_up` spin up and `n_down` spin down
    /// electrons over `n_sites` sites.
    /// # Errors
    /// `InvalidParameters` when there are no sites, when a particle count
    /// exceeds the site count, or when the word `T` is too narrow for the
    /// lattice.
    pub fn new(n_sites: usize, n_up: usize, n_down: usize) -> Result<Self, Error> {
        let n_bits: usize = std::mem::size_of::<T>() * u8::BITS as usize;
        if n_sites == 0 {
            return Err(Error::InvalidParameters {
                details: "lattice has no sites".to_owned(),
            });
        }
        if n_sites > n_bits {
            return Err(Error::InvalidParameters {
                details: format!(
                    "{} sites do not fit the {} bits word",
                    n_sites, n_bits
                ),
            });
        }
        if n_up > n_sites || n_down > n_sites {
            return Err(Error::InvalidParameters {
                details: format!(
                    "cannot place {} up and {} down electrons on {} sites",
                    n_up, n_down, n_sites
                ),
            });
        }
        let ups = enumerate_occupations::<T>(n_sites, n_up);
        let downs = enumerate_occupations::<T>(n_sites, n_down);
        debug!(
            "Enumerated basis: {} up x {} down = {} states",
            ups.len(),
            downs.len(),
            ups.len() * downs.len()
        );
        Ok(Basis {
            ups,
            downs,
            n_sites,
            n_up,
            n_down,
        })
    }

    /// Total basis dimension $\binom{N}{n_\uparrow}\binom{N}{n_\downarrow}$.
    pub fn size(&self) -> usize {
        self.ups.len() * self.downs.len()
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn n_up(&self) -> usize {
        self.n_up
    }

    pub fn n_down(&self) -> usize {
        self.n_down
    }

    /// Dense rank of `state` in the enumeration order.
    /// # Errors
    /// `NotFound` when the state violates the particle-number invariant or
    /// carries bits outside the enumerated set.
    pub fn rank(&self, state: &FockState<T>) -> Result<usize, Error> {
        if state.n_sites != self.n_sites {
            return Err(Error::NotFound);
        }
        let up = self
            .ups
            .binary_search(&state.spin_up)
            .map_err(|_| Error::NotFound)?;
        let down = self
            .downs
            .binary_search(&state.spin_down)
            .map_err(|_| Error::NotFound)?;
        Ok(up * self.downs.len() + down)
    }

    /// The basis state at rank `index`. Valid for `0 <= index < size()`.
    pub fn state(&self, index: usize) -> FockState<T> {
        let n_down_states = self.downs.len();
        FockState {
            spin_up: self.ups[index / n_down_states],
            spin_down: self.downs[index % n_down_states],
            n_sites: self.n_sites,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_enumerate_counts() {
        // C(4, 2) = 6 combinations over the first 4 bits of a u8.
        let occ = enumerate_occupations::<u8>(4, 2);
        assert_eq!(occ.len(), 6);
        for w in occ.iter() {
            assert_eq!(w.count_ones(), 2);
            // No bits outside the 4 used positions.
            assert_eq!(w & 0x0f, 0);
        }
        // Ascending word order.
        for pair in occ.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_enumerate_edges() {
        assert_eq!(enumerate_occupations::<u8>(4, 0), vec![0u8]);
        assert_eq!(enumerate_occupations::<u8>(4, 4), vec![0xf0u8]);
        assert_eq!(enumerate_occupations::<u8>(8, 8), vec![0xffu8]);
    }

    #[test]
    fn test_rank_state_roundtrip() {
        let basis = Basis::<u8>::new(4, 1, 2).unwrap();
        assert_eq!(basis.size(), 4 * 6);
        for i in 0..basis.size() {
            let state = basis.state(i);
            assert_eq!(basis.rank(&state).unwrap(), i);
        }
    }

    #[test]
    fn test_rank_rejects_wrong_filling() {
        let basis = Basis::<u8>::new(4, 1, 1).unwrap();
        let bad = FockState {
            spin_up: 0b1100_0000u8,
            spin_down: 0b1000_0000u8,
            n_sites: 4,
        };
        assert_eq!(basis.rank(&bad), Err(Error::NotFound));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Basis::<u8>::new(0, 0, 0).is_err());
        assert!(Basis::<u8>::new(4, 5, 0).is_err());
        assert!(Basis::<u8>::new(16, 1, 1).is_err());
    }
}
