use proptest::prelude::*;
use qec_core::code::build_code;
use qec_core::decoder::{DecodeStatus, DecoderKind, decode};
use qec_core::{CodeFamily, EngineConfig, NoiseModel, sample_error, syndrome_of};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn lattice_codes() -> impl Strategy<Value = (CodeFamily, usize)> {
    prop_oneof![
        Just((CodeFamily::Surface, 3)),
        Just((CodeFamily::Surface, 5)),
        Just((CodeFamily::Toric, 3)),
        Just((CodeFamily::Toric, 4)),
        Just((CodeFamily::Color, 3)),
        Just((CodeFamily::Color, 5)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Converged corrections reproduce the measured syndrome exactly.
    #[test]
    fn converged_corrections_close_the_syndrome(
        (family, d) in lattice_codes(),
        p in 0.0f64..0.2,
        seed in any::<u64>(),
    ) {
        let code = build_code(family, d).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let error = sample_error(&code, p, NoiseModel::Depolarizing, &mut rng).unwrap();
        let syndrome = syndrome_of(&code, &error).unwrap();
        for kind in [DecoderKind::Mwpm, DecoderKind::UnionFind] {
            let outcome = decode(kind, &code, &syndrome, &EngineConfig::default()).unwrap();
            // Sampled errors always have a preimage.
            prop_assert_eq!(outcome.status, DecodeStatus::Converged);
            prop_assert_eq!(syndrome_of(&code, &outcome.correction).unwrap(), syndrome.clone());
        }
    }

    /// The residual of any converged correction has trivial syndrome, so the
    /// verdict depends only on logical operators.
    #[test]
    fn residuals_have_trivial_syndrome(
        d in prop_oneof![Just(3usize), Just(5)],
        seed in any::<u64>(),
    ) {
        let code = build_code(CodeFamily::Surface, d).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let error = sample_error(&code, 0.1, NoiseModel::IndependentXz, &mut rng).unwrap();
        let syndrome = syndrome_of(&code, &error).unwrap();
        let outcome = decode(DecoderKind::Mwpm, &code, &syndrome, &EngineConfig::default()).unwrap();
        let residual = error.composed(&outcome.correction);
        prop_assert!(syndrome_of(&code, &residual).unwrap().is_trivial());
    }

    /// Same seed, same error.
    #[test]
    fn sampling_is_reproducible(seed in any::<u64>(), p in 0.0f64..=1.0) {
        let code = build_code(CodeFamily::Toric, 3).unwrap();
        let a = sample_error(&code, p, NoiseModel::Depolarizing, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = sample_error(&code, p, NoiseModel::Depolarizing, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }
}
