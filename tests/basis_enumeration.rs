use std::collections::HashSet;

use hubbard2d::basis::Basis;
use hubbard2d::Error;

fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let mut out = 1usize;
    for i in 0..k {
        out = out * (n - i) / (i + 1);
    }
    out
}

#[test]
fn basis_size_matches_binomial_product() {
    for n_sites in 1..=8usize {
        for n_up in 0..=n_sites {
            for n_down in 0..=n_sites {
                let basis = Basis::<u8>::new(n_sites, n_up, n_down).unwrap();
                assert_eq!(
                    basis.size(),
                    binomial(n_sites, n_up) * binomial(n_sites, n_down),
                    "size mismatch for {} sites, {} up, {} down",
                    n_sites,
                    n_up,
                    n_down
                );
            }
        }
    }
}

#[test]
fn enumerated_states_are_unique_and_satisfy_the_invariant() {
    let basis = Basis::<u16>::new(6, 2, 3).unwrap();
    let mut seen = HashSet::new();
    for i in 0..basis.size() {
        let state = basis.state(i);
        assert_eq!(state.spin_up.count_ones(), 2);
        assert_eq!(state.spin_down.count_ones(), 3);
        // No occupation outside the 6 used positions.
        assert_eq!(state.spin_up & 0x03ff, 0);
        assert_eq!(state.spin_down & 0x03ff, 0);
        assert!(seen.insert((state.spin_up, state.spin_down)));
    }
    assert_eq!(seen.len(), basis.size());
}

#[test]
fn rank_state_roundtrip() {
    let basis = Basis::<u16>::new(9, 3, 2).unwrap();
    assert_eq!(basis.size(), binomial(9, 3) * binomial(9, 2));
    for i in 0..basis.size() {
        assert_eq!(basis.rank(&basis.state(i)).unwrap(), i);
    }
}

#[test]
fn rank_is_ascending_in_the_word_order() {
    let basis = Basis::<u8>::new(4, 1, 1).unwrap();
    for i in 1..basis.size() {
        let prev = basis.state(i - 1);
        let cur = basis.state(i);
        assert!((prev.spin_up, prev.spin_down) < (cur.spin_up, cur.spin_down));
    }
}

#[test]
fn rank_rejects_foreign_states() {
    let basis = Basis::<u8>::new(4, 1, 1).unwrap();
    // Wrong particle number in the up channel.
    let mut bad = basis.state(0);
    bad.spin_up = 0b1100_0000;
    assert_eq!(basis.rank(&bad), Err(Error::NotFound));
    // Stray bit outside the used positions.
    let mut stray = basis.state(0);
    stray.spin_up = 0b0000_1000;
    assert_eq!(basis.rank(&stray), Err(Error::NotFound));
    // Wrong site count.
    let mut foreign = basis.state(0);
    foreign.n_sites = 6;
    assert_eq!(basis.rank(&foreign), Err(Error::NotFound));
}

#[test]
fn unphysical_particle_counts_are_rejected() {
    assert!(matches!(
        Basis::<u8>::new(4, 5, 0),
        Err(Error::InvalidParameters { .. })
    ));
    assert!(matches!(
        Basis::<u8>::new(4, 0, 5),
        Err(Error::InvalidParameters { .. })
    ));
    assert!(matches!(
        Basis::<u8>::new(0, 0, 0),
        Err(Error::InvalidParameters { .. })
    ));
    // 12 sites do not fit a u8 word.
    assert!(matches!(
        Basis::<u8>::new(12, 1, 1),
        Err(Error::InvalidParameters { .. })
    ));
}
