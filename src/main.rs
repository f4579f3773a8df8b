use hubbard2d::lanczos::{Info, Lanczos, LanczosIteration};
use hubbard2d::lattice::BoundaryCondition;
use hubbard2d::model::HubbardModel;
use hubbard2d::{BitOps, FockState};

fn main() {
    env_logger::init();

    let lx = 4;
    let ly = 4;
    let ne = 2;
    let cons_u = 4.0;
    let mut model =
        HubbardModel::<u16>::new(lx, ly, ne, ne, 1.0, cons_u, BoundaryCondition::default())
            .unwrap();
    println!(
        "2D {}x{} Hubbard model with {} up/down electrons and U/t={}",
        lx, ly, ne, cons_u
    );
    println!("Made Basis: {}", model.basis().size());

    model.build_hamiltonian().unwrap();
    println!("Built Matrix");
    println!("# of non-zero elements: {}", model.nnz());

    // Reference configurations: ne doubly occupied sites against ne up and
    // ne down electrons on separated sites.
    let n_sites = lx * ly;
    let mut psi1 = FockState {
        spin_up: 0u16,
        spin_down: 0u16,
        n_sites,
    };
    let mut psi2 = psi1;
    for i in 0..ne {
        psi1.spin_up.set(i);
        psi1.spin_down.set(i);
        psi2.spin_up.set(i);
        psi2.spin_down.set(i + ne);
    }

    let max_iter = 10 * model.basis().size();
    let n_lowest_eigenval = 1;
    let mut iter = LanczosIteration::nlowest(max_iter, n_lowest_eigenval);
    let mut lanczos: Lanczos = model.solver(0).unwrap();
    println!("lanczos");
    if let Err(e) = lanczos.calculate_eigenvalues(&mut iter) {
        println!("{}", e);
    }
    println!("number of iterations: {}", iter.iterations());
    println!("#        eigenvalue            error         multiplicity");
    let eigen = lanczos.eigenvalues();
    let err = lanczos.errors();
    let multiplicity = lanczos.multiplicities();
    for i in 0..eigen.len().min(10) {
        println!("{}\t{}\t{}\t{}", i, eigen[i], err[i], multiplicity[i]);
    }

    println!("\nEigen vectors computations for the lowest eigenvalue:\n");
    let mut info = Info::new();
    let eigenvectors = match lanczos.eigenvectors(0, 1, &mut info, max_iter) {
        Ok(v) => v,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    for x in eigenvectors[0].iter().take(10) {
        println!("{}", x);
    }
    println!(" Information about the eigenvector computations:\n");
    for i in 0..info.size() {
        println!(
            " m1({}): {}, m2({}): {}, ma({}): {} eigenvalue({}): {} residual({}): {} error_info({}): {:?}\n",
            i + 1,
            info.m1(i),
            i + 1,
            info.m2(i),
            i + 1,
            info.ma(i),
            i + 1,
            info.eigenvalue(i),
            i + 1,
            info.residual(i),
            i + 1,
            info.error_info(i)
        );
    }

    let rank1 = model.basis().rank(&psi1).unwrap();
    let rank2 = model.basis().rank(&psi2).unwrap();
    println!("{} :{}", psi1, eigenvectors[0][rank1]);
    println!("{} :{}", psi2, eigenvectors[0][rank2]);
}
