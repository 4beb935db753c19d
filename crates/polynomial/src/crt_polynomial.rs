// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! CRT (Chinese Remainder Theorem) reconstruction of RNS ring elements.

use crate::errors::CrtPolynomialError;
use crate::utils::{center, inverse_mod_prime, max_bits, reduce_to_u64};
use fhe_math::rq::{traits::TryConvertFrom, Context, Poly, Representation};
use ndarray::Array2;
use num_bigint::{BigInt, BigUint};
use rayon::prelude::*;
use std::sync::Arc;

/// Precomputed data to move a ring element between its RNS limbs and exact
/// integer coefficients modulo `Q = ∏q_i`.
#[derive(Debug, Clone)]
pub struct CrtContext {
    ctx: Arc<Context>,
    moduli: Vec<u64>,
    modulus: BigUint,
    half_modulus: BigUint,
    /// For each limb: `((Q/q_i)^-1 mod q_i, Q/q_i)`.
    garner: Vec<(u64, BigUint)>,
}

impl CrtContext {
    /// Builds the CRT helper for a ring context.
    pub fn new(ctx: &Arc<Context>) -> Self {
        let moduli = ctx.moduli().to_vec();
        let modulus: BigUint = moduli.iter().map(|q| BigUint::from(*q)).product();
        let half_modulus = &modulus >> 1u32;
        let garner = moduli
            .iter()
            .map(|qi| {
                let q_hat = &modulus / BigUint::from(*qi);
                let q_hat_mod = reduce_to_u64(&BigInt::from(q_hat.clone()), *qi);
                (inverse_mod_prime(q_hat_mod, *qi), q_hat)
            })
            .collect();

        Self {
            ctx: ctx.clone(),
            moduli,
            modulus,
            half_modulus,
            garner,
        }
    }

    pub fn ctx(&self) -> &Arc<Context> {
        &self.ctx
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// The full modulus `Q`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Ring degree, read from the number of coefficients of a zero element.
    pub fn degree(&self) -> usize {
        Poly::zero(&self.ctx, Representation::PowerBasis)
            .coefficients()
            .ncols()
    }

    /// Maps `x ∈ [0, Q)` to its centered representative in `(-Q/2, Q/2]`.
    pub fn center(&self, x: &BigUint) -> BigInt {
        center(x, &self.modulus, &self.half_modulus)
    }

    /// Reconstructs the coefficients of `p` as integers in `[0, Q)`.
    ///
    /// `p` may be in any representation; a power-basis copy is used for the lift.
    pub fn reconstruct(&self, p: &Poly) -> Result<Vec<BigUint>, CrtPolynomialError> {
        if p.ctx().moduli() != self.moduli.as_slice() {
            return Err(CrtPolynomialError::ContextMismatch);
        }

        let mut p = p.clone();
        if *p.representation() != Representation::PowerBasis {
            p.change_representation(Representation::PowerBasis);
        }

        let coefficients = p.coefficients();

        let columns: Vec<Vec<u64>> = coefficients
            .columns()
            .into_iter()
            .map(|column| column.to_vec())
            .collect();

        Ok(columns
            .par_iter()
            .map(|residues| self.lift(residues))
            .collect())
    }

    /// Reconstructs the coefficients of `p` as centered integers in `(-Q/2, Q/2]`.
    pub fn reconstruct_centered(&self, p: &Poly) -> Result<Vec<BigInt>, CrtPolynomialError> {
        Ok(self
            .reconstruct(p)?
            .iter()
            .map(|x| self.center(x))
            .collect())
    }

    /// Builds a ring element from signed big-integer coefficients (reduced modulo each q_i).
    pub fn poly_from_bigints(
        &self,
        coefficients: &[BigInt],
        representation: Representation,
    ) -> Result<Poly, CrtPolynomialError> {
        let degree = self.degree();
        if coefficients.len() != degree {
            return Err(CrtPolynomialError::DegreeMismatch {
                expected: degree,
                actual: coefficients.len(),
            });
        }

        let array = Array2::from_shape_fn((self.moduli.len(), degree), |(i, j)| {
            reduce_to_u64(&coefficients[j], self.moduli[i])
        });
        let mut poly =
            Poly::try_convert_from(array, &self.ctx, false, Representation::PowerBasis)?;
        if representation != Representation::PowerBasis {
            poly.change_representation(representation);
        }
        Ok(poly)
    }

    /// Builds a ring element from unsigned big-integer coefficients.
    pub fn poly_from_biguints(
        &self,
        coefficients: &[BigUint],
        representation: Representation,
    ) -> Result<Poly, CrtPolynomialError> {
        let signed: Vec<BigInt> = coefficients.iter().cloned().map(BigInt::from).collect();
        self.poly_from_bigints(&signed, representation)
    }

    /// Builds a ring element from small signed coefficients.
    pub fn poly_from_i64(
        &self,
        coefficients: &[i64],
        representation: Representation,
    ) -> Result<Poly, CrtPolynomialError> {
        let mut poly =
            Poly::try_convert_from(coefficients, &self.ctx, false, Representation::PowerBasis)?;
        if representation != Representation::PowerBasis {
            poly.change_representation(representation);
        }
        Ok(poly)
    }

    /// The constant ring element `value mod Q`.
    pub fn constant(
        &self,
        value: &BigUint,
        representation: Representation,
    ) -> Result<Poly, CrtPolynomialError> {
        let degree = self.degree();
        let array = Array2::from_shape_fn((self.moduli.len(), degree), |(i, j)| {
            if j == 0 {
                reduce_to_u64(&BigInt::from(value.clone()), self.moduli[i])
            } else {
                0
            }
        });
        let mut poly =
            Poly::try_convert_from(array, &self.ctx, false, Representation::PowerBasis)?;
        if representation != Representation::PowerBasis {
            poly.change_representation(representation);
        }
        Ok(poly)
    }

    fn lift(&self, residues: &[u64]) -> BigUint {
        let sum: BigUint = residues
            .iter()
            .zip(self.moduli.iter())
            .zip(self.garner.iter())
            .map(|((ci, qi), (inv, q_hat))| {
                let scaled = (*ci as u128 * *inv as u128 % *qi as u128) as u64;
                q_hat * scaled
            })
            .sum();
        sum % &self.modulus
    }
}

/// A ring element in exact, centered big-integer form.
#[derive(Clone, Debug, PartialEq)]
pub struct CrtPolynomial {
    pub coefficients: Vec<BigInt>,
}

impl CrtPolynomial {
    pub fn new(coefficients: Vec<BigInt>) -> Self {
        Self { coefficients }
    }

    /// Lifts an fhe-math `Poly` to centered integer coefficients.
    ///
    /// If `p` is in NTT form, a PowerBasis copy is used.
    pub fn from_fhe_polynomial(p: &Poly, crt: &CrtContext) -> Result<Self, CrtPolynomialError> {
        Ok(Self {
            coefficients: crt.reconstruct_centered(p)?,
        })
    }

    /// Reduces the coefficients back into the RNS limbs of `crt`.
    pub fn to_fhe_polynomial(
        &self,
        crt: &CrtContext,
        representation: Representation,
    ) -> Result<Poly, CrtPolynomialError> {
        crt.poly_from_bigints(&self.coefficients, representation)
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.coefficients
    }

    /// Largest absolute coefficient.
    pub fn max_abs(&self) -> BigUint {
        self.coefficients
            .iter()
            .map(|c| c.magnitude().clone())
            .max()
            .unwrap_or_default()
    }

    /// Bit length of the largest absolute coefficient.
    pub fn max_bits(&self) -> u64 {
        max_bits(&self.coefficients)
    }

    /// Shifts every magnitude right by `bits`, keeping the sign.
    pub fn shift_magnitudes_right(&self, bits: u32) -> Self {
        Self {
            coefficients: self
                .coefficients
                .iter()
                .map(|c| BigInt::from_biguint(c.sign(), c.magnitude() >> bits))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhe::bfv::BfvParameters;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use sfdk_fhe_params::SfdkPreset;

    fn params() -> Arc<BfvParameters> {
        SfdkPreset::InsecureSfdk1024.build_arc().unwrap()
    }

    #[test]
    fn reconstruct_matches_small_coefficients() {
        let par = params();
        let crt = CrtContext::new(par.ctx_at_level(0).unwrap());
        let mut coeffs = vec![0i64; crt.degree()];
        coeffs[0] = -5;
        coeffs[1] = 7;
        coeffs[crt.degree() - 1] = -1;

        let poly = crt.poly_from_i64(&coeffs, Representation::Ntt).unwrap();
        let centered = crt.reconstruct_centered(&poly).unwrap();

        assert_eq!(centered[0], BigInt::from(-5));
        assert_eq!(centered[1], BigInt::from(7));
        assert_eq!(centered[crt.degree() - 1], BigInt::from(-1));
        assert!(centered[2..crt.degree() - 1]
            .iter()
            .all(|c| *c == BigInt::from(0)));
    }

    #[test]
    fn random_poly_round_trips_through_bigints() {
        let par = params();
        let ctx = par.ctx_at_level(0).unwrap();
        let crt = CrtContext::new(ctx);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let poly = Poly::random(ctx, Representation::Ntt, &mut rng);

        let lifted = CrtPolynomial::from_fhe_polynomial(&poly, &crt).unwrap();
        let back = lifted.to_fhe_polynomial(&crt, Representation::Ntt).unwrap();

        assert_eq!(back, poly);
        assert!(lifted.max_abs() <= crt.modulus() >> 1u32);
    }

    #[test]
    fn constant_is_a_scalar_multiplier() {
        let par = params();
        let ctx = par.ctx_at_level(0).unwrap();
        let crt = CrtContext::new(ctx);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let poly = Poly::random(ctx, Representation::Ntt, &mut rng);

        let two = crt.constant(&BigUint::from(2u32), Representation::Ntt).unwrap();
        assert_eq!(&poly * &two, &poly + &poly);
    }

    #[test]
    fn rejects_wrong_coefficient_count() {
        let par = params();
        let crt = CrtContext::new(par.ctx_at_level(0).unwrap());
        let result = crt.poly_from_bigints(&[BigInt::from(1)], Representation::PowerBasis);
        assert!(matches!(
            result,
            Err(CrtPolynomialError::DegreeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_foreign_context() {
        let crt = CrtContext::new(params().ctx_at_level(0).unwrap());
        let other = SfdkPreset::InsecurePsm2048.build_arc().unwrap();
        let poly = Poly::zero(other.ctx_at_level(0).unwrap(), Representation::Ntt);
        assert!(matches!(
            crt.reconstruct(&poly),
            Err(CrtPolynomialError::ContextMismatch)
        ));
    }

    #[test]
    fn shift_keeps_sign() {
        let p = CrtPolynomial::new(vec![BigInt::from(-17), BigInt::from(16), BigInt::from(3)]);
        let shifted = p.shift_magnitudes_right(2);
        assert_eq!(
            shifted.coefficients,
            vec![BigInt::from(-4), BigInt::from(4), BigInt::from(0)]
        );
        assert_eq!(p.max_bits(), 5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn big_coefficients_survive_the_rns_round_trip(values in proptest::collection::vec(any::<i64>(), 4)) {
            let par = params();
            let crt = CrtContext::new(par.ctx_at_level(0).unwrap());
            let mut coeffs = vec![BigInt::from(0); crt.degree()];
            for (i, v) in values.iter().enumerate() {
                // Products of two i64 stay well below Q/2 for the three-limb ring.
                coeffs[i] = BigInt::from(*v) * BigInt::from(*v);
                coeffs[i + 4] = -BigInt::from(*v);
            }
            let poly = crt.poly_from_bigints(&coeffs, Representation::Ntt).unwrap();
            prop_assert_eq!(crt.reconstruct_centered(&poly).unwrap(), coeffs);
        }
    }
}
