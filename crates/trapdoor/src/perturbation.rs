// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Perturbation sampling for trapdoor preimages.
//!
//! The perturbation p = (p1, p2) has covariance s²I − c²·[T; I][T; I]^T where
//! T = [e; r] is the trapdoor. p2 is spherical with parameter √(s² − c²); p1 is then
//! drawn from the conditional 2×2 block distribution with the ring-level
//! `sample_2z`/`sample_fz` recursion.

use crate::errors::{Result, TrapdoorError};
use crate::field::{interleave, mul_by_x, split_even_odd, RingField};
use crate::gaussian::{sample_z, DiscreteGaussian};
use fhe_math::rq::{Poly, Representation};
use rand::Rng;
use num_traits::ToPrimitive;
use sfdk_polynomial::CrtContext;
use tracing::trace;

/// Samples x ∈ Z^n with covariance f (given in evaluation form) around `center`.
pub fn sample_fz<R: Rng + ?Sized>(f: &RingField, center: &[f64], rng: &mut R) -> Result<Vec<i64>> {
    if center.len() == 1 {
        let variance = f.evaluations()[0].re;
        if variance.is_nan() || variance <= 0.0 {
            return Err(TrapdoorError::NonPositiveVariance(variance));
        }
        return Ok(vec![sample_z(center[0], variance.sqrt(), rng)?]);
    }

    let (f0, f1) = split_even_odd(&f.to_coefficients());
    let f0 = RingField::from_coefficients(&f0);
    let shifted = RingField::from_coefficients(&mul_by_x(&f1));
    let (c0, c1) = split_even_odd(center);

    let (q0, q1) = sample_2z(&f0, &shifted, &f0, &c0, &c1, rng)?;
    Ok(interleave(&q0, &q1))
}

/// Samples (q0, q1) with covariance [[a, b], [b^T, d]] around (c0, c1).
pub fn sample_2z<R: Rng + ?Sized>(
    a: &RingField,
    b: &RingField,
    d: &RingField,
    c0: &[f64],
    c1: &[f64],
    rng: &mut R,
) -> Result<(Vec<i64>, Vec<i64>)> {
    let q1 = sample_fz(d, c1, rng)?;

    let shift: Vec<f64> = q1.iter().zip(c1.iter()).map(|(q, c)| *q as f64 - c).collect();
    let b_over_d = b * &d.inverse();
    let correction = (&b_over_d * &RingField::from_coefficients(&shift)).to_coefficients();
    let c0: Vec<f64> = c0.iter().zip(correction.iter()).map(|(c, x)| c + x).collect();

    let schur = a - &(&b_over_d * &b.adjoint());
    let q0 = sample_fz(&schur, &c0, rng)?;
    Ok((q0, q1))
}

/// Samples the full perturbation vector, width ℓ + 2, as signed coefficient vectors.
pub fn sample_perturbation<R: Rng + ?Sized>(
    r: &[&[i64]],
    e: &[&[i64]],
    crt: &CrtContext,
    spectral_bound: f64,
    c: f64,
    rng: &mut R,
) -> Result<Vec<Vec<i64>>> {
    let n = crt.degree();
    let s2 = spectral_bound * spectral_bound;
    let c2 = c * c;
    let large = DiscreteGaussian::new((s2 - c2).sqrt())?;

    let p2: Vec<Vec<i64>> = (0..r.len()).map(|_| large.sample_vec(n, rng)).collect();

    // Centers -c²/(s²-c²)·T·p2, computed exactly in the ring.
    let center_scale = -c2 / (s2 - c2);
    let tp2_e = small_inner_product(e, &p2, crt)?;
    let tp2_r = small_inner_product(r, &p2, crt)?;
    let c0: Vec<f64> = tp2_e.iter().map(|x| x * center_scale).collect();
    let c1: Vec<f64> = tp2_r.iter().map(|x| x * center_scale).collect();

    let covariance_scale = s2 * c2 / (s2 - c2);
    let mut a = RingField::constant(0.0, n);
    let mut b = RingField::constant(0.0, n);
    let mut d = RingField::constant(0.0, n);
    for (ei, ri) in e.iter().zip(r.iter()) {
        let e_hat = RingField::from_i64(ei);
        let r_hat = RingField::from_i64(ri);
        a = &a + &e_hat.gram();
        b = &b + &(&e_hat * &r_hat.adjoint());
        d = &d + &r_hat.gram();
    }
    let a = a.scale(-covariance_scale).add_scalar(s2);
    let b = b.scale(-covariance_scale);
    let d = d.scale(-covariance_scale).add_scalar(s2);
    trace!(
        min_a = a.min_real(),
        min_d = d.min_real(),
        "perturbation covariance"
    );

    let (q0, q1) = sample_2z(&a, &b, &d, &c0, &c1, rng)?;

    let mut p = Vec::with_capacity(p2.len() + 2);
    p.push(q0);
    p.push(q1);
    p.extend(p2);
    Ok(p)
}

/// Σ x_i·y_i over the integers, lifted through every limb and centered.
fn small_inner_product(x: &[&[i64]], y: &[Vec<i64>], crt: &CrtContext) -> Result<Vec<f64>> {
    let mut acc = Poly::zero(crt.ctx(), Representation::Ntt);
    for (xi, yi) in x.iter().zip(y.iter()) {
        let xi = crt.poly_from_i64(xi, Representation::Ntt)?;
        let yi = crt.poly_from_i64(yi, Representation::Ntt)?;
        acc += &(&xi * &yi);
    }
    Ok(crt
        .reconstruct_centered(&acc)?
        .iter()
        .map(|v| v.to_f64().unwrap_or(f64::NAN))
        .collect())
}
