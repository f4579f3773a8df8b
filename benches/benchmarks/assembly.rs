use criterion::{black_box, criterion_group, Criterion};
use hubbard2d::basis::Basis;
use hubbard2d::hamiltonian::build_hamiltonian;
use hubbard2d::lattice::{BoundaryCondition, Lattice};

pub fn assemble_3x2(c: &mut Criterion) {
    let lattice = Lattice::new(3, 2, BoundaryCondition::Periodic).unwrap();
    let basis = Basis::<u8>::new(6, 2, 2).unwrap();
    c.bench_function("Assemble Hamiltonian 3x2, 2+2 electrons", |b| {
        b.iter(|| {
            build_hamiltonian(black_box(&basis), black_box(&lattice), 1.0, 4.0).unwrap()
        })
    });
}

pub fn assemble_4x3(c: &mut Criterion) {
    let lattice = Lattice::new(4, 3, BoundaryCondition::Periodic).unwrap();
    let basis = Basis::<u16>::new(12, 3, 3).unwrap();
    c.bench_function("Assemble Hamiltonian 4x3, 3+3 electrons", |b| {
        b.iter(|| {
            build_hamiltonian(black_box(&basis), black_box(&lattice), 1.0, 4.0).unwrap()
        })
    });
}

criterion_group!(benches, assemble_3x2, assemble_4x3);
