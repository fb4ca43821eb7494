use qec_core::bit_utils;
use qec_core::code::{Sector, StabilizerCode, build_code};
use qec_core::decoder::{DecodeStatus, DecoderKind, decode};
use qec_core::pauli_frame::{PauliFrame, Syndrome};
use qec_core::{BbFamily, CodeFamily, EngineConfig, QecError, syndrome_of};

fn single_qubit_error(code: &StabilizerCode, sector: Sector, q: usize) -> PauliFrame {
    match sector {
        Sector::X => PauliFrame::from_indices(code.n(), &[q], &[]),
        Sector::Z => PauliFrame::from_indices(code.n(), &[], &[q]),
    }
}

#[test]
fn surface_d3_centre_x_error() {
    let code = build_code(CodeFamily::Surface, 3).unwrap();
    let error = PauliFrame::from_indices(9, &[4], &[]);
    let syndrome = syndrome_of(&code, &error).unwrap();

    let expected: Vec<usize> = code
        .z_stabilizers()
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row[4])
        .map(|(c, _)| code.syndrome_range(Sector::X).start + c)
        .collect();
    assert_eq!(expected.len(), 2);
    assert_eq!(syndrome.defects(), expected);

    let mut outcome = decode(DecoderKind::Mwpm, &code, &syndrome, &EngineConfig::default()).unwrap();
    assert_eq!(outcome.status, DecodeStatus::Converged);
    assert_eq!(outcome.correction.support().x, vec![4]);
    assert!(outcome.correction.z().not_any());
    assert!(outcome.evaluate(&code, &error).unwrap());
    assert_eq!(outcome.success, Some(true));
}

#[test]
fn single_errors_are_corrected_by_every_graph_decoder() {
    let config = EngineConfig::default();
    for (family, d) in [
        (CodeFamily::Surface, 3),
        (CodeFamily::Toric, 3),
        (CodeFamily::Color, 3),
        (CodeFamily::Color, 5),
    ] {
        let code = build_code(family, d).unwrap();
        for sector in Sector::BOTH {
            for q in 0..code.n() {
                let error = single_qubit_error(&code, sector, q);
                let syndrome = syndrome_of(&code, &error).unwrap();
                for kind in [DecoderKind::Mwpm, DecoderKind::UnionFind, DecoderKind::Lookup] {
                    let mut outcome = decode(kind, &code, &syndrome, &config)
                        .unwrap_or_else(|e| panic!("{family}:{d} {kind} q{q}: {e}"));
                    assert_eq!(outcome.status, DecodeStatus::Converged, "{family}:{d} {kind} q{q}");
                    assert!(
                        outcome.evaluate(&code, &error).unwrap(),
                        "{family}:{d} {kind} failed on {sector} error at qubit {q}"
                    );
                }
            }
        }
    }
}

#[test]
fn zero_syndrome_gives_zero_correction() {
    let config = EngineConfig::default();
    let codes = [
        build_code(CodeFamily::Surface, 3).unwrap(),
        build_code(CodeFamily::Toric, 4).unwrap(),
        build_code(CodeFamily::Color, 5).unwrap(),
        build_code(CodeFamily::Bb(BbFamily::Bb72), 0).unwrap(),
    ];
    for code in &codes {
        let syndrome = Syndrome::zeros(code.num_checks());
        for kind in DecoderKind::ALL {
            if !kind.supports(code) {
                continue;
            }
            let outcome = decode(kind, code, &syndrome, &config).unwrap();
            assert_eq!(outcome.status, DecodeStatus::Converged);
            assert!(outcome.correction.is_identity(), "{kind} on {}", code.family());
        }
    }
}

#[test]
fn odd_parity_on_the_torus_is_unsatisfiable() {
    let code = build_code(CodeFamily::Toric, 3).unwrap();
    let syndrome = Syndrome::from_defects(code.num_checks(), &[0]);
    for kind in [DecoderKind::Mwpm, DecoderKind::UnionFind] {
        let mut outcome = decode(kind, &code, &syndrome, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.status, DecodeStatus::Unsatisfiable, "{kind}");
        // No error reproduces this syndrome, so no correction can succeed.
        let identity = PauliFrame::new(code.n());
        assert!(!outcome.evaluate(&code, &identity).unwrap());
        assert!(matches!(
            outcome.into_converged(),
            Err(QecError::DecodeNonConvergence { .. })
        ));
    }
}

#[test]
fn lookup_misses_are_reported_per_sector() {
    let code = build_code(CodeFamily::Toric, 3).unwrap();
    // Odd parity has no preimage, so the table holds no entry for it.
    let syndrome = Syndrome::from_defects(code.num_checks(), &[0]);
    assert!(matches!(
        decode(DecoderKind::Lookup, &code, &syndrome, &EngineConfig::default()),
        Err(QecError::UnsupportedSyndrome { sector: Sector::X })
    ));
}

#[test]
fn unsupported_combinations_are_rejected() {
    let config = EngineConfig::default();
    let bb = build_code(CodeFamily::Bb(BbFamily::Bb72), 0).unwrap();
    let syndrome = Syndrome::zeros(bb.num_checks());
    for kind in [DecoderKind::Mwpm, DecoderKind::UnionFind, DecoderKind::Lookup] {
        assert!(matches!(
            decode(kind, &bb, &syndrome, &config),
            Err(QecError::DecoderUnsupported { .. })
        ));
    }

    let large = build_code(CodeFamily::Surface, 7).unwrap();
    let syndrome = Syndrome::zeros(large.num_checks());
    assert!(matches!(
        decode(DecoderKind::Lookup, &large, &syndrome, &config),
        Err(QecError::DecoderUnsupported { .. })
    ));
}

#[test]
fn malformed_syndromes_are_rejected_by_every_decoder() {
    let code = build_code(CodeFamily::Surface, 3).unwrap();
    let syndrome = Syndrome::zeros(code.num_checks() + 1);
    for kind in DecoderKind::ALL {
        assert!(matches!(
            decode(kind, &code, &syndrome, &EngineConfig::default()),
            Err(QecError::MalformedSyndromeLength { expected: 8, got: 9 })
        ));
    }
}

#[test]
fn belief_propagation_runs_on_lattice_codes() {
    let code = build_code(CodeFamily::Surface, 5).unwrap();
    let error = PauliFrame::from_indices(25, &[12], &[7]);
    let syndrome = syndrome_of(&code, &error).unwrap();
    let mut outcome =
        decode(DecoderKind::BpMinSum, &code, &syndrome, &EngineConfig::default()).unwrap();
    if outcome.status == DecodeStatus::Converged {
        let produced = syndrome_of(&code, &outcome.correction).unwrap();
        assert_eq!(produced, syndrome);
    }
    outcome.evaluate(&code, &error).unwrap();
    assert!(outcome.success.is_some());
}

#[test]
fn code_construction_is_deterministic() {
    let mut families = vec![
        (CodeFamily::Surface, 5),
        (CodeFamily::Toric, 4),
        (CodeFamily::Color, 7),
    ];
    families.extend(BbFamily::ALL.map(|bb| (CodeFamily::Bb(bb), 0)));
    for (family, size) in families {
        let a = build_code(family, size).unwrap();
        let b = build_code(family, size).unwrap();
        assert_eq!(a.k(), b.k());
        for sector in Sector::BOTH {
            let (sa, sb) = (a.sector(sector), b.sector(sector));
            assert_eq!(sa.checks(), sb.checks());
            assert_eq!(sa.logicals(), sb.logicals());
            assert_eq!(sa.lookup(), sb.lookup());
        }
    }
}

#[test]
fn logicals_are_detected_as_failures() {
    let code = build_code(CodeFamily::Surface, 3).unwrap();
    // A full logical in the X sector has trivial syndrome but fails.
    let logical = code.sector(Sector::X).logicals()[0].clone();
    let residual = PauliFrame::from_registers(logical, bit_utils::zeros(9)).unwrap();
    assert!(syndrome_of(&code, &residual).unwrap().is_trivial());
    assert!(!code.is_trivial_residual(&residual));
}
