//! Bivariate-bicycle check matrices.
//!
//! Qubits are indexed as the left block (`0..lm`) followed by the right
//! block (`lm..2lm`); within a block, group element `x^i y^j` is index
//! `i * m + j`. The monomial `x^a y^b` acts as the permutation
//! `(i, j) -> (i + a mod l, j + b mod m)`.

use crate::code::Layout;
use qec_common::bb::{BbParams, CHECK_WEIGHT, Monomial, QUBIT_DEGREE};

/// Row `r` of the sum of monomial permutations: the columns hit by `r`.
fn poly_row(params: &BbParams, poly: &[Monomial; 3], r: usize) -> [usize; 3] {
    let (i, j) = (r / params.m, r % params.m);
    poly.map(|mono| ((i + mono.x_pow) % params.l) * params.m + (j + mono.y_pow) % params.m)
}

/// Row `r` of the transposed polynomial: the rows whose image is `r`.
fn poly_row_transposed(params: &BbParams, poly: &[Monomial; 3], r: usize) -> [usize; 3] {
    let (l, m) = (params.l, params.m);
    let (i, j) = (r / m, r % m);
    poly.map(|mono| ((i + l - mono.x_pow % l) % l) * m + (j + m - mono.y_pow % m) % m)
}

/// Lays out `Hx = [A | B]` and `Hz = [B^T | A^T]` and checks the published
/// block length, row weight and column weight.
pub(crate) fn layout(params: &BbParams) -> Result<Layout, String> {
    let lm = params.group_order();
    if 2 * lm != params.n {
        return Err(format!(
            "{}: 2*l*m = {} does not match n = {}",
            params.name,
            2 * lm,
            params.n
        ));
    }

    let mut x_checks = Vec::with_capacity(lm);
    let mut z_checks = Vec::with_capacity(lm);
    for r in 0..lm {
        let mut hx: Vec<usize> = poly_row(params, &params.a, r).to_vec();
        hx.extend(poly_row(params, &params.b, r).iter().map(|c| lm + c));
        let mut hz: Vec<usize> = poly_row_transposed(params, &params.b, r).to_vec();
        hz.extend(poly_row_transposed(params, &params.a, r).iter().map(|c| lm + c));
        x_checks.push(hx);
        z_checks.push(hz);
    }

    for (kind, checks) in [("X", &x_checks), ("Z", &z_checks)] {
        let mut column_weight = vec![0usize; params.n];
        for (r, support) in checks.iter().enumerate() {
            let mut distinct = support.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() != CHECK_WEIGHT {
                return Err(format!(
                    "{}: {kind} check {r} has weight {}, expected {CHECK_WEIGHT}",
                    params.name,
                    distinct.len()
                ));
            }
            for q in distinct {
                column_weight[q] += 1;
            }
        }
        if let Some(q) = column_weight.iter().position(|&w| w != QUBIT_DEGREE) {
            return Err(format!(
                "{}: qubit {q} sits in {} {kind} checks, expected {QUBIT_DEGREE}",
                params.name, column_weight[q]
            ));
        }
    }

    Ok(Layout {
        n: params.n,
        distance: params.d,
        x_checks,
        z_checks,
        check_colors: None,
        expected_k: Some(params.k),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_common::family::BbFamily;

    #[test]
    fn transposed_rows_invert_forward_rows() {
        let params = BbFamily::Bb72.params();
        for r in 0..params.group_order() {
            for (slot, &c) in poly_row(params, &params.a, r).iter().enumerate() {
                assert_eq!(poly_row_transposed(params, &params.a, c)[slot], r);
            }
        }
    }

    #[test]
    fn all_tables_lay_out() {
        for family in BbFamily::ALL {
            let layout = layout(family.params()).unwrap();
            assert_eq!(layout.x_checks.len(), family.params().n / 2);
            assert_eq!(layout.z_checks.len(), family.params().n / 2);
        }
    }

    #[test]
    fn colliding_monomials_are_rejected() {
        let mut params = BbFamily::Bb72.params().clone();
        params.a[2] = params.a[1];
        assert!(layout(&params).unwrap_err().contains("weight"));
    }
}
