//! Lattice code constructors.
//!
//! Each constructor lays out qubits and stabilizer supports for one
//! topological family. Validation of commutation and logical count happens
//! once, in the shared assembly step.

use crate::QecError;
use crate::QecResult;
use crate::code::Layout;
use qec_common::family::CodeFamily;
use qec_common::limits::MAX_LATTICE_DISTANCE;

fn check_distance(family: CodeFamily, d: usize, min: usize) -> QecResult<()> {
    if d < min {
        return Err(QecError::InvalidCodeSpec {
            family,
            reason: format!("distance must be at least {min}, got {d}"),
        });
    }
    if d > MAX_LATTICE_DISTANCE {
        return Err(QecError::InvalidCodeSpec {
            family,
            reason: format!("distance {d} exceeds the supported maximum {MAX_LATTICE_DISTANCE}"),
        });
    }
    Ok(())
}

/// Rotated planar surface code of distance `d`.
///
/// Data qubit `(r, c)` has index `r * d + c`. Stabilizers sit on the
/// `(d + 1) x (d + 1)` grid of plaquette corners; the plaquette at `(r, c)`
/// touches the data qubits `(r-1, c-1)`, `(r-1, c)`, `(r, c-1)` and `(r, c)`
/// that exist. A plaquette is X-type when `r + c` is even. Top and bottom
/// edges keep only X-type weight-2 plaquettes, left and right edges only
/// Z-type ones, and the four corners are empty.
pub(crate) fn rotated_surface(d: usize) -> QecResult<Layout> {
    check_distance(CodeFamily::Surface, d, 2)?;
    let mut x_checks = Vec::new();
    let mut z_checks = Vec::new();
    for r in 0..=d {
        for c in 0..=d {
            let is_x = (r + c) % 2 == 0;
            let on_row_edge = r == 0 || r == d;
            let on_col_edge = c == 0 || c == d;
            if on_row_edge && on_col_edge {
                continue;
            }
            if (on_row_edge && !is_x) || (on_col_edge && is_x) {
                continue;
            }
            let mut support = Vec::with_capacity(4);
            for (dr, dc) in [(1, 1), (1, 0), (0, 1), (0, 0)] {
                if r >= dr && c >= dc && r - dr < d && c - dc < d {
                    support.push((r - dr) * d + (c - dc));
                }
            }
            if is_x {
                x_checks.push(support);
            } else {
                z_checks.push(support);
            }
        }
    }
    Ok(Layout {
        n: d * d,
        distance: d,
        x_checks,
        z_checks,
        check_colors: None,
        expected_k: Some(1),
    })
}

/// Kitaev toric code on a periodic `d x d` lattice.
///
/// Horizontal edge `(i, j)` is qubit `i * d + j`, vertical edge `(i, j)` is
/// qubit `d^2 + i * d + j`. The star at vertex `(i, j)` is an X check and the
/// plaquette with top-left corner `(i, j)` is a Z check.
pub(crate) fn toric(d: usize) -> QecResult<Layout> {
    check_distance(CodeFamily::Toric, d, 3)?;
    let h = |i: usize, j: usize| (i % d) * d + (j % d);
    let v = |i: usize, j: usize| d * d + (i % d) * d + (j % d);
    let mut x_checks = Vec::with_capacity(d * d);
    let mut z_checks = Vec::with_capacity(d * d);
    for i in 0..d {
        for j in 0..d {
            x_checks.push(vec![h(i, j), h(i, j + d - 1), v(i, j), v(i + d - 1, j)]);
            z_checks.push(vec![h(i, j), h(i + 1, j), v(i, j), v(i, j + 1)]);
        }
    }
    Ok(Layout {
        n: 2 * d * d,
        distance: d,
        x_checks,
        z_checks,
        check_colors: None,
        expected_k: Some(2),
    })
}

/// Triangular 6.6.6 color code of odd distance `d`.
///
/// Sites of a triangular patch `0 <= c <= r < 3(d-1)/2 + 1` are either
/// plaquette centres (`(r + c) % 3 == 1`) or qubits. Each plaquette acts on
/// its neighbouring qubits in the six lattice directions, identically for
/// X and Z. Plaquettes are three-colored by `r % 3`.
pub(crate) fn color_666(d: usize) -> QecResult<Layout> {
    check_distance(CodeFamily::Color, d, 3)?;
    if d % 2 == 0 {
        return Err(QecError::InvalidCodeSpec {
            family: CodeFamily::Color,
            reason: format!("distance must be odd, got {d}"),
        });
    }
    let bound = 3 * (d - 1) / 2 + 1;
    let is_plaquette = |r: usize, c: usize| (r + c) % 3 == 1;

    let mut qubit_index = vec![vec![usize::MAX; bound]; bound];
    let mut n = 0;
    for r in 0..bound {
        for c in 0..=r {
            if !is_plaquette(r, c) {
                qubit_index[r][c] = n;
                n += 1;
            }
        }
    }

    const NEIGHBOURS: [(isize, isize); 6] = [(0, 1), (0, -1), (1, 0), (-1, 0), (1, 1), (-1, -1)];
    let mut checks = Vec::new();
    let mut colors = Vec::new();
    for r in 0..bound {
        for c in 0..=r {
            if !is_plaquette(r, c) {
                continue;
            }
            let mut support = Vec::with_capacity(6);
            for (dr, dc) in NEIGHBOURS {
                let (nr, nc) = (r as isize + dr, c as isize + dc);
                if nr < 0 || nc < 0 || nc > nr || nr >= bound as isize {
                    continue;
                }
                support.push(qubit_index[nr as usize][nc as usize]);
            }
            checks.push(support);
            colors.push((r % 3) as u8);
        }
    }
    Ok(Layout {
        n,
        distance: d,
        x_checks: checks.clone(),
        z_checks: checks,
        check_colors: Some(colors),
        expected_k: Some(1),
    })
}
