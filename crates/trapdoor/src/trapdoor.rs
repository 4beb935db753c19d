// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::{Result, TrapdoorError};
use crate::gadget::Gadget;
use crate::gaussian::DiscreteGaussian;
use crate::perturbation::sample_perturbation;
use fhe_math::rq::{Context, Poly, Representation};
use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use sfdk_polynomial::CrtContext;
use std::sync::Arc;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// Secret half of a ring trapdoor: ℓ pairs of short elements (r_i, e_i) such that
/// A·[e; r; I] = g^T.
///
/// Held only by the key owner. Not `Clone`; coefficients are wiped on drop.
pub struct TrapdoorSecret {
    r: Vec<Zeroizing<Vec<i64>>>,
    e: Vec<Zeroizing<Vec<i64>>>,
}

impl TrapdoorSecret {
    pub fn new(r: Vec<Vec<i64>>, e: Vec<Vec<i64>>) -> Result<Self> {
        if r.len() != e.len() {
            return Err(TrapdoorError::WidthMismatch {
                expected: r.len(),
                actual: e.len(),
            });
        }
        Ok(Self {
            r: r.into_iter().map(Zeroizing::new).collect(),
            e: e.into_iter().map(Zeroizing::new).collect(),
        })
    }

    /// Number of gadget digits ℓ covered by the trapdoor.
    pub fn digits(&self) -> usize {
        self.r.len()
    }

    /// Coefficients of r_0, ..., r_{ℓ-1}.
    pub fn r(&self) -> Vec<&[i64]> {
        self.r.iter().map(|v| v.as_slice()).collect()
    }

    /// Coefficients of e_0, ..., e_{ℓ-1}.
    pub fn e(&self) -> Vec<&[i64]> {
        self.e.iter().map(|v| v.as_slice()).collect()
    }

    fn polys(&self, crt: &CrtContext) -> Result<(Vec<Poly>, Vec<Poly>)> {
        let r = self
            .r
            .iter()
            .map(|v| crt.poly_from_i64(v, Representation::Ntt))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let e = self
            .e
            .iter()
            .map(|v| crt.poly_from_i64(v, Representation::Ntt))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok((r, e))
    }
}

impl std::fmt::Debug for TrapdoorSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrapdoorSecret")
            .field("digits", &self.digits())
            .finish_non_exhaustive()
    }
}

/// A freshly generated trapdoor.
#[derive(Debug)]
pub struct Trapdoor {
    /// A = [1, a, g_0 - (a·r_0 + e_0), ..., g_{ℓ-1} - (a·r_{ℓ-1} + e_{ℓ-1})] in NTT form.
    pub public: Vec<Poly>,
    pub secret: TrapdoorSecret,
}

/// Generates ring trapdoors and samples short preimages under them.
#[derive(Debug, Clone)]
pub struct TrapdoorSampler {
    crt: Arc<CrtContext>,
    gadget: Gadget,
    sigma: f64,
    degree: usize,
}

impl TrapdoorSampler {
    pub fn new(crt: Arc<CrtContext>, base: u64, sigma: f64) -> Result<Self> {
        DiscreteGaussian::new(sigma)?;
        let gadget = Gadget::new(crt.modulus(), base)?;
        let degree = crt.degree();
        Ok(Self {
            crt,
            gadget,
            sigma,
            degree,
        })
    }

    pub fn base(&self) -> u64 {
        self.gadget.base()
    }

    /// Gadget digits ℓ.
    pub fn digits(&self) -> usize {
        self.gadget.digits()
    }

    /// Width k = ℓ + 2 of the public row.
    pub fn width(&self) -> usize {
        self.gadget.digits() + 2
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn gadget(&self) -> &Gadget {
        &self.gadget
    }

    pub fn crt(&self) -> &Arc<CrtContext> {
        &self.crt
    }

    /// Parameter of the gadget-coset sampler, (b + 1)·σ.
    pub fn gadget_parameter(&self) -> f64 {
        (self.base() as f64 + 1.0) * self.sigma
    }

    /// Spectral bound s on the perturbation.
    pub fn spectral_bound(&self) -> f64 {
        let n = self.degree as f64;
        let k = self.digits() as f64;
        1.8 * (self.base() as f64 + 1.0)
            * self.sigma
            * self.sigma
            * ((n * k).sqrt() + (2.0 * n).sqrt() + 4.7)
    }

    pub fn trapdoor_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Trapdoor> {
        let ctx = self.crt.ctx();
        let gaussian = DiscreteGaussian::new(self.sigma)?;
        let a = Poly::random(ctx, Representation::Ntt, rng);

        let mut public = Vec::with_capacity(self.width());
        public.push(self.crt.constant(&BigUint::one(), Representation::Ntt)?);
        public.push(a.clone());

        let mut r = Vec::with_capacity(self.digits());
        let mut e = Vec::with_capacity(self.digits());
        for power in self.gadget.powers() {
            let ri = gaussian.sample_vec(self.degree, rng);
            let ei = gaussian.sample_vec(self.degree, rng);
            let g = self.crt.constant(&power, Representation::Ntt)?;
            let r_poly = self.crt.poly_from_i64(&ri, Representation::Ntt)?;
            let e_poly = self.crt.poly_from_i64(&ei, Representation::Ntt)?;
            public.push(&g - &(&(&a * &r_poly) + &e_poly));
            r.push(ri);
            e.push(ei);
        }

        info!(
            width = public.len(),
            base = self.base(),
            "generated ring trapdoor"
        );
        Ok(Trapdoor {
            public,
            secret: TrapdoorSecret::new(r, e)?,
        })
    }

    /// Samples a short z with A·z = u exactly (GaussSamp).
    pub fn gauss_samp<R: RngCore + CryptoRng>(
        &self,
        public: &[Poly],
        secret: &TrapdoorSecret,
        syndrome: &Poly,
        rng: &mut R,
    ) -> Result<Vec<Poly>> {
        let width = self.width();
        if public.len() != width {
            return Err(TrapdoorError::WidthMismatch {
                expected: width,
                actual: public.len(),
            });
        }
        if secret.digits() != self.digits() {
            return Err(TrapdoorError::WidthMismatch {
                expected: self.digits(),
                actual: secret.digits(),
            });
        }

        let c = self.gadget_parameter();
        let s = self.spectral_bound();
        let p = sample_perturbation(&secret.r(), &secret.e(), &self.crt, s, c, rng)?;
        let p = p
            .iter()
            .map(|v| self.crt.poly_from_i64(v, Representation::Ntt))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut u = syndrome.clone();
        if *u.representation() != Representation::Ntt {
            u.change_representation(Representation::Ntt);
        }
        let perturbed = &u - &dot(public, &p, self.crt.ctx());
        let targets = self.crt.reconstruct(&perturbed)?;

        let seeds: Vec<[u8; 32]> = (0..targets.len())
            .map(|_| {
                let mut seed = [0u8; 32];
                rng.fill_bytes(&mut seed);
                seed
            })
            .collect();
        let columns = targets
            .par_iter()
            .zip(seeds.into_par_iter())
            .map(|(v, seed)| {
                let mut rng = ChaCha20Rng::from_seed(seed);
                self.gadget.sample_preimage(v, self.sigma, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        let z_hat = (0..self.digits())
            .map(|i| {
                let coefficients: Vec<i64> = columns.iter().map(|col| col[i]).collect();
                self.crt.poly_from_i64(&coefficients, Representation::Ntt)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let (r, e) = secret.polys(&self.crt)?;
        let mut z = Vec::with_capacity(width);
        z.push(&p[0] + &dot(&e, &z_hat, self.crt.ctx()));
        z.push(&p[1] + &dot(&r, &z_hat, self.crt.ctx()));
        for (pi, zi) in p[2..].iter().zip(z_hat.iter()) {
            z.push(pi + zi);
        }

        debug!(
            width,
            digits = self.digits(),
            spectral_bound = s,
            "sampled trapdoor preimage"
        );
        Ok(z)
    }
}

fn dot(x: &[Poly], y: &[Poly], ctx: &Arc<Context>) -> Poly {
    x.iter()
        .zip(y.iter())
        .fold(Poly::zero(ctx, Representation::Ntt), |acc, (a, b)| {
            &acc + &(a * b)
        })
}
