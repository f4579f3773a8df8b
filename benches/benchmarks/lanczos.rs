use criterion::{black_box, criterion_group, Criterion};
use hubbard2d::lanczos::{Lanczos, LanczosIteration};
use hubbard2d::lattice::BoundaryCondition;
use hubbard2d::model::HubbardModel;

pub fn ground_state_3x2(c: &mut Criterion) {
    let mut model =
        HubbardModel::<u8>::new(3, 2, 2, 2, 1.0, 4.0, BoundaryCondition::Periodic).unwrap();
    model.build_hamiltonian().unwrap();
    c.bench_function("Lanczos ground state 3x2, 2+2 electrons", |b| {
        b.iter(|| {
            let mut solver: Lanczos = model.solver(black_box(42)).unwrap();
            let mut iter = LanczosIteration::new(10 * model.basis().size(), 1, 1e-10, 1e-10);
            solver.calculate_eigenvalues(&mut iter).unwrap();
            solver.eigenvalues()[0]
        })
    });
}

criterion_group!(benches, ground_state_3x2);
