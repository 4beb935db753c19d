// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use fhe_math::rq::{Poly, Representation};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sfdk_fhe_params::SfdkPreset;
use sfdk_polynomial::{CrtContext, CrtPolynomial};
use sfdk_trapdoor::TrapdoorSampler;
use std::sync::Arc;

fn setup() -> Result<TrapdoorSampler> {
    let par = SfdkPreset::InsecureSfdk1024.build_arc()?;
    let crt = Arc::new(CrtContext::new(par.ctx_at_level(0)?));
    Ok(TrapdoorSampler::new(crt, 4_194_304, 10f64.sqrt())?)
}

fn dot(x: &[Poly], y: &[Poly]) -> Poly {
    let mut acc = Poly::zero(x[0].ctx(), Representation::Ntt);
    for (a, b) in x.iter().zip(y.iter()) {
        acc += &(a * b);
    }
    acc
}

#[test]
fn trapdoor_relation_holds() -> Result<()> {
    let sampler = setup()?;
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let trapdoor = sampler.trapdoor_gen(&mut rng)?;
    let crt = sampler.crt();

    assert_eq!(trapdoor.public.len(), sampler.width());

    // A · (e_i, r_i, 0, .., 1, .., 0) = b^i
    let r = trapdoor.secret.r();
    let e = trapdoor.secret.e();
    for (i, power) in sampler.gadget().powers().iter().enumerate() {
        let mut column = vec![Poly::zero(crt.ctx(), Representation::Ntt); sampler.width()];
        column[0] = crt.poly_from_i64(e[i], Representation::Ntt)?;
        column[1] = crt.poly_from_i64(r[i], Representation::Ntt)?;
        column[i + 2] = crt.constant(&num_bigint::BigUint::from(1u32), Representation::Ntt)?;
        let g = crt.constant(power, Representation::Ntt)?;
        assert_eq!(dot(&trapdoor.public, &column), g);
    }
    Ok(())
}

#[test]
fn gauss_samp_hits_the_syndrome_with_a_short_vector() -> Result<()> {
    let sampler = setup()?;
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let trapdoor = sampler.trapdoor_gen(&mut rng)?;
    let crt = sampler.crt();

    let u = Poly::random(crt.ctx(), Representation::Ntt, &mut rng);
    let z = sampler.gauss_samp(&trapdoor.public, &trapdoor.secret, &u, &mut rng)?;

    assert_eq!(z.len(), sampler.width());
    assert_eq!(dot(&trapdoor.public, &z), u);

    // Every entry is bounded well below Q, around the spectral bound.
    let bound_bits = (12.0 * sampler.spectral_bound()).log2().ceil() as u64;
    for zi in &z {
        let lifted = CrtPolynomial::from_fhe_polynomial(zi, crt)?;
        assert!(
            lifted.max_bits() <= bound_bits,
            "{} bits > {bound_bits}",
            lifted.max_bits()
        );
    }
    Ok(())
}

#[test]
fn preimages_for_the_same_syndrome_differ() -> Result<()> {
    let sampler = setup()?;
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let trapdoor = sampler.trapdoor_gen(&mut rng)?;
    let u = Poly::random(sampler.crt().ctx(), Representation::Ntt, &mut rng);

    let z1 = sampler.gauss_samp(&trapdoor.public, &trapdoor.secret, &u, &mut rng)?;
    let z2 = sampler.gauss_samp(&trapdoor.public, &trapdoor.secret, &u, &mut rng)?;
    assert_ne!(z1, z2);
    Ok(())
}
