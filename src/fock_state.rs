extern crate num;

use num::PrimInt;

/// Uparrow character unicode
pub const UPARROW: char = match std::char::from_u32(0x00002191) {
    Some(v) => v,
    None => panic!("Invalid unicode character uparrow"),
};
/// Downarrow character unicode
pub const DOWNARROW: char = match std::char::from_u32(0x00002193) {
    Some(v) => v,
    None => panic!("Invalid unicode character downarrow"),
};

/// Abstraction layer for common bitwise operations.
/// # Purpose
/// The Bitops trait brings in scope an abstraction layer over the bitwise
/// operations needed on a spin occupation string. These operations make the
/// basis, Hamiltonian and sign routines compatible with any primitive integer
/// word, so a $2\times2$ lattice can run on [u8] while a $4\times4$ lattice
/// runs on [u16] or wider.
pub trait BitOps:
    std::ops::BitAnd<Output = Self> +
    Sized +
    std::ops::BitXor<Output = Self> +
    Copy +
    std::ops::Not<Output = Self> +
    std::cmp::PartialEq +
    std::ops::Shr<usize, Output = Self>
{
    /// Provides the number of set bits in the bitstring. This gives the number
    /// of electrons in the spin channel.
    fn count_ones(self) -> u32;
    /// Flip the $i$-th bit of the string, indexed from the left. This method
    /// is consistent with [BitOps::check].
    fn set(&mut self, n: usize);
    /// Returns the truth value at index $i$, from the left. This method is
    /// consistent with [BitOps::set].
    fn check(&self, i: usize) -> bool;
    /// Returns an owned instance of an all set bitstring.
    fn ones() -> Self;
}

/// BitWise operations for all primitive ints. All methods are inlined and use
/// built-in methods. [BitOps::set] and [BitOps::check] are implemented by
/// shifting a bitmask.
impl<I> BitOps for I
    where I: PrimInt
{
    #[inline(always)]
    fn count_ones(self) -> u32 {
        self.count_ones()
    }
    #[inline(always)]
    fn set(&mut self, n: usize) {
        let n_bits: usize = std::mem::size_of::<I>() * u8::BITS as usize;
        if n >= n_bits {return;}
        *self = *self ^ (I::one() << (n_bits - 1 - n));
    }
    #[inline(always)]
    fn check(&self, i: usize) -> bool {
        let n_bits: usize = std::mem::size_of::<I>() * u8::BITS as usize;
        if i >= n_bits {return false;}
        !(*self & (I::one() << (n_bits - 1 - i)) == I::zero())
    }
    #[inline(always)]
    fn ones() -> Self {
        <I>::max_value()
    }
}

/// Spin channel of a hopping electron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Up,
    Down,
}

impl std::fmt::Display for Spin {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Spin::Up => write!(f, "{}", UPARROW),
            Spin::Down => write!(f, "{}", DOWNARROW),
        }
    }
}

/// The Fock state structure. Encodes the spins positions.
/// # Definition
/// This structure has two different fields, the spin up and spin down
/// component. Each of these fields correspond to a physical bitstring that
/// represent the occupation of this state. The convention is to place the
/// sites in the order $i\in\[0,N-1\]$ for both fields, indexed from the left:
/// site $0$ is the most significant used bit of the word.
/// # Usage
/// ```rust
/// use hubbard2d::{BitOps, FockState};
/// let mut state = FockState {spin_up: 0u8, spin_down: 0u8, n_sites: 4};
/// state.spin_up.set(0);
/// state.spin_down.set(0);
/// assert_eq!(state.double_occupations(), 1);
/// ```
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash)]
pub struct FockState<T>
{
    pub spin_up: T,
    pub spin_down: T,
    pub n_sites: usize,
}

impl<T: BitOps> FockState<T> {
    /// Number of sites where both the up and the down bits are set.
    pub fn double_occupations(&self) -> u32 {
        (self.spin_up & self.spin_down).count_ones()
    }

    /// Occupation of site `i` in channel `spin`.
    pub fn occupied(&self, i: usize, spin: Spin) -> bool {
        match spin {
            Spin::Up => self.spin_up.check(i),
            Spin::Down => self.spin_down.check(i),
        }
    }
}

/// Renders the occupation site by site, e.g. `|↑↓|·|↑|↓|`.
impl<T: BitOps> std::fmt::Display for FockState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "|")?;
        for i in 0..self.n_sites {
            let up = self.spin_up.check(i);
            let down = self.spin_down.check(i);
            match (up, down) {
                (true, true) => write!(f, "{}{}|", UPARROW, DOWNARROW)?,
                (true, false) => write!(f, "{}|", UPARROW)?,
                (false, true) => write!(f, "{}|", DOWNARROW)?,
                (false, false) => write!(f, "·|")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_set_check_consistency() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let n = rng.gen_range(0..16);
            let mut word: u16 = 0;
            word.set(n);
            assert!(word.check(n));
            assert_eq!(word.count_ones(), 1);
            // set is a flip
            word.set(n);
            assert_eq!(word, 0);
        }
    }

    #[test]
    fn test_set_indexes_from_the_left() {
        let mut word: u8 = 0;
        word.set(0);
        assert_eq!(word, 0x80);
        word.set(7);
        assert_eq!(word, 0x81);
    }

    #[test]
    fn test_double_occupations() {
        let state = FockState {spin_up: 0b1010_0000u8, spin_down: 0b1100_0000u8, n_sites: 4};
        assert_eq!(state.double_occupations(), 1);
        assert!(state.occupied(0, Spin::Up));
        assert!(state.occupied(1, Spin::Down));
        assert!(!state.occupied(1, Spin::Up));
    }

    #[test]
    fn test_display_state() {
        let state = FockState {spin_up: 0b1000_0000u8, spin_down: 0b1100_0000u8, n_sites: 4};
        assert_eq!(format!("{}", state), "|↑↓|↓|·|·|");
    }
}
