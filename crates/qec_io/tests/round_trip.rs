use qec_core::code::build_code;
use qec_core::{CodeFamily, NoiseModel, sample_error, syndrome_of};
use qec_io::loader::{load_shots, write_b8_file, write_text_shots};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("qec_io_{}_{name}", std::process::id()))
}

fn sampled_syndromes(shots: usize) -> Vec<qec_core::bit_utils::Bits> {
    let code = build_code(CodeFamily::Surface, 5).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    (0..shots)
        .map(|_| {
            let error = sample_error(&code, 0.05, NoiseModel::Depolarizing, &mut rng).unwrap();
            syndrome_of(&code, &error).unwrap().into_bits()
        })
        .collect()
}

#[test]
fn b8_files_round_trip() {
    let shots = sampled_syndromes(25);
    let path = scratch("syndromes.b8");
    write_b8_file(&path, &shots).unwrap();
    // 24 checks pack into exactly three bytes per shot.
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 25 * 3);
    let loaded = load_shots(&path, 24).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, shots);
}

#[test]
fn text_files_round_trip() {
    let shots = sampled_syndromes(10);
    let path = scratch("syndromes.txt");
    write_text_shots(&path, &shots).unwrap();
    let loaded = load_shots(&path, 24).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, shots);
}

#[test]
fn wrong_shot_width_is_reported() {
    let shots = sampled_syndromes(4);
    let path = scratch("narrow.txt");
    write_text_shots(&path, &shots).unwrap();
    let err = load_shots(&path, 8);
    std::fs::remove_file(&path).unwrap();
    assert!(err.is_err());
}

#[test]
fn missing_files_carry_their_path() {
    let err = load_shots(scratch("absent.b8"), 8).unwrap_err();
    assert!(format!("{err:#}").contains("absent.b8"));
}
