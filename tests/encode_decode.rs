use float_eq::assert_float_eq;
use qubosat::{
    decoding::decode,
    encodings::{encode, EncodeError, EncodeStats, Precision},
    instances::{QuadraticModel, WeightedClauseSet},
    sampler::{Options, Sampler},
    solvers::exhaustive::{self, ground_state},
    types::{Assignment, TernaryVal, Vartype},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_model(rng: &mut ChaCha8Rng, n_vars: usize, vartype: Vartype) -> QuadraticModel {
    let mut model = QuadraticModel::new(n_vars, vartype);
    for i in 0..n_vars {
        model.add_linear(i, rng.random_range(-2.0..2.0)).unwrap();
        for j in i + 1..n_vars {
            if rng.random_bool(0.5) {
                model
                    .add_quadratic(i, j, rng.random_range(-2.0..2.0))
                    .unwrap();
            }
        }
    }
    model.set_offset(rng.random_range(-1.0..1.0)).unwrap();
    model
}

fn n_terms(model: &QuadraticModel) -> usize {
    model.n_vars() + model.n_quadratic()
}

#[test]
fn round_trip_optimality() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x9ab0);
    for vartype in [Vartype::Binary, Vartype::Spin] {
        for n_vars in 1..=8 {
            let model = random_model(&mut rng, n_vars, vartype);
            let mut sampler = Sampler::new(
                exhaustive::Solver::default(),
                Options {
                    precision: Precision::Fixed(1e-3),
                },
            );
            let sample = sampler.sample(&model).unwrap();
            let truth = ground_state(&model).unwrap();
            assert_eq!(sample.vartype, vartype);
            assert_eq!(sample.values.len(), n_vars);
            assert_float_eq!(
                sample.energy,
                model.energy(&sample.values).unwrap(),
                abs <= 1e-9
            );
            let tolerance = 1e-3 * n_terms(&model) as f64;
            assert!(
                sample.energy - truth.energy <= tolerance,
                "sampled {} but ground state is {}",
                sample.energy,
                truth.energy
            );
        }
    }
}

#[test]
fn auto_precision_optimality() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for n_vars in [3, 6, 9] {
        let model = random_model(&mut rng, n_vars, Vartype::Spin);
        let mut sampler = Sampler::new(
            exhaustive::Solver::default(),
            Options {
                precision: Precision::Auto,
            },
        );
        let sample = sampler.sample(&model).unwrap();
        let truth = ground_state(&model).unwrap();
        let precision = Precision::Auto.resolve(&model).unwrap();
        assert!(sample.energy - truth.energy <= precision * n_terms(&model) as f64);
    }
}

#[test]
fn domain_symmetry() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for n_vars in 2..=7 {
        let binary = random_model(&mut rng, n_vars, Vartype::Binary);
        let spin = binary.to_vartype(Vartype::Spin);
        assert_eq!(spin.vartype(), Vartype::Spin);
        let mut sampler = Sampler::new(
            exhaustive::Solver::default(),
            Options {
                precision: Precision::Fixed(1e-6),
            },
        );
        let bin_sample = sampler.sample(&binary).unwrap();
        let spin_sample = sampler.sample(&spin).unwrap();
        let tolerance = 1e-6 * 2. * n_terms(&binary) as f64;
        assert_float_eq!(bin_sample.energy, spin_sample.energy, abs <= tolerance);

        // converted samples keep their energy in the converted model
        let converted = spin_sample.change_vartype(Vartype::Binary);
        assert_float_eq!(
            binary.energy(&converted.values).unwrap(),
            converted.energy,
            abs <= 1e-9
        );
    }
}

#[test]
fn single_variable_file() {
    let mut model = QuadraticModel::new(1, Vartype::Binary);
    model.add_linear(0, -10.).unwrap();
    let encoding = encode(&model, Precision::Fixed(1e-6)).unwrap();
    let mut wcnf = vec![];
    encoding.clauses().write_dimacs(&mut wcnf).unwrap();
    assert_eq!(
        String::from_utf8(wcnf).unwrap(),
        "p wcnf 1 1\n10000000 1 0\n"
    );

    // the optimal answer is the positive literal
    let assign = Assignment::from_vline("v 1").unwrap();
    assert_eq!(encoding.clauses().cost(&assign), 0);
    let sample = decode(&assign, &model);
    assert_eq!(sample.values, vec![1]);
    assert_eq!(sample.energy, -10.);

    let assign = Assignment::from_vline("v -1").unwrap();
    assert_eq!(encoding.clauses().cost(&assign), 10_000_000);
    assert_eq!(decode(&assign, &model).values, vec![0]);
}

#[test]
fn written_instance_parses_back() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let model = random_model(&mut rng, 6, Vartype::Binary);
    let encoding = encode(&model, Precision::Fixed(1e-4)).unwrap();
    let mut wcnf = vec![];
    encoding.clauses().write_dimacs(&mut wcnf).unwrap();
    let text = String::from_utf8(wcnf).unwrap();

    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        format!("p wcnf {} {}", encoding.n_vars(), encoding.n_clauses())
    );
    assert_eq!(text.lines().count(), encoding.n_clauses() + 1);
    assert!(text
        .lines()
        .skip(1)
        .all(|line| line.ends_with(" 0") && !line.starts_with('0')));

    let parsed = WeightedClauseSet::from_dimacs(text.as_bytes()).unwrap();
    assert_eq!(&parsed, encoding.clauses());
}

#[test]
fn exact_with_integer_coefficients() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for vartype in [Vartype::Binary, Vartype::Spin] {
        let mut model = QuadraticModel::new(5, vartype);
        for i in 0..5 {
            model
                .add_linear(i, f64::from(rng.random_range(-9i32..=9)))
                .unwrap();
            for j in i + 1..5 {
                model
                    .add_quadratic(i, j, f64::from(rng.random_range(-9i32..=9)))
                    .unwrap();
            }
        }
        let encoding = encode(&model, Precision::Fixed(1.)).unwrap();
        for bits in 0..1u32 << 5 {
            let vals: Vec<bool> = (0..5).map(|i| bits & (1 << i) != 0).collect();
            let assign = Assignment::from(
                vals.iter()
                    .map(|&b| TernaryVal::from(b))
                    .collect::<Vec<_>>(),
            );
            let sample = decode(&assign, &model);
            let cost = encoding.clauses().cost(&assign);
            assert_eq!(
                encoding.quantized_energy(cost),
                (sample.energy - model.offset()) as i128
            );
            assert_float_eq!(encoding.approx_energy(cost), sample.energy, abs <= 1e-9);
        }
    }
}

#[test]
fn opposing_linear_terms_cancel() {
    let model = QuadraticModel::from_qubo([((0, 0), 5.), ((0, 0), -5.)]).unwrap();
    let encoding = encode(&model, Precision::Fixed(1.)).unwrap();
    assert_eq!(encoding.n_clauses(), 0);
    let mut wcnf = vec![];
    encoding.clauses().write_dimacs(&mut wcnf).unwrap();
    assert_eq!(wcnf, b"p wcnf 1 0\n");
}

#[test]
fn negative_binary_coupling_has_three_clauses() {
    let model = QuadraticModel::from_qubo([((0, 1), -2.5)]).unwrap();
    let encoding = encode(&model, Precision::Fixed(0.5)).unwrap();
    assert_eq!(encoding.n_clauses(), 3);
    assert!(encoding.clauses().iter().all(|cl| cl.weight() == 5));
}

#[test]
fn sampling_rejects_total_weight_overflow() {
    let model =
        QuadraticModel::from_qubo([((0, 0), 8e18), ((1, 1), 8e18), ((2, 2), 8e18)]).unwrap();
    let mut sampler = Sampler::new(
        exhaustive::Solver::default(),
        Options {
            precision: Precision::Fixed(1.),
        },
    );
    let err = sampler.sample(&model).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EncodeError>(),
        Some(EncodeError::WeightOverflow(_))
    ));
}
