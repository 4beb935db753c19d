// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use sfdk::{SfdkError, SfdkPreset};
use sfdk_test_helpers::{
    context_with_keys, encrypt_packed, init_test_tracing, open_packed, psm_context,
};

#[test]
fn member_of_an_explicit_set() -> Result<()> {
    let _guard = init_test_tracing();
    let set: Vec<i64> = (1..=9).collect();
    let (cc, keys) = psm_context(7, set.len())?;

    let query = encrypt_packed(&cc, &keys, &[8])?;
    let verdict = cc.private_set_membership(&query, &set)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 0);

    let query = encrypt_packed(&cc, &keys, &[42])?;
    let verdict = cc.private_set_membership(&query, &set)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 1);
    Ok(())
}

#[test]
fn power_of_two_sized_set() -> Result<()> {
    let set = vec![100, -3, 7, 65000, 12, 13, 14, 15];
    let (cc, keys) = psm_context(8, set.len())?;

    let query = encrypt_packed(&cc, &keys, &[-3])?;
    let verdict = cc.private_set_membership(&query, &set)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 0);

    let query = encrypt_packed(&cc, &keys, &[16])?;
    let verdict = cc.private_set_membership(&query, &set)?;
    assert_ne!(open_packed(&cc, &keys, &verdict)?[0], 0);
    Ok(())
}

#[test]
fn only_slot_zero_carries_the_verdict() -> Result<()> {
    let set = vec![4, 5, 6];
    let (cc, keys) = psm_context(9, set.len())?;
    let query = encrypt_packed(&cc, &keys, &[5])?;
    let verdict = cc.private_set_membership(&query, &set)?;
    let slots = cc.decrypt(keys.secret_key()?, &verdict)?;
    let decoded = cc.decode_packed(&slots)?;
    assert_eq!(decoded[0], 0);
    assert!(decoded[1..].iter().all(|v| *v == 0));
    Ok(())
}

#[test]
fn range_spanning_two_chunks() -> Result<()> {
    let _guard = init_test_tracing();
    // Rows hold 1024 slots on this ring, so the range needs a second, partial chunk.
    let (start, size) = (12, 1500);
    let (cc, keys) = psm_context(10, size)?;

    for (value, member) in [(1400, true), (20, true), (5, false), (1512, false)] {
        let query = encrypt_packed(&cc, &keys, &[value])?;
        let verdict = cc.private_set_membership_range(&query, start, size)?;
        let slot = open_packed(&cc, &keys, &verdict)?[0];
        assert_eq!(slot == 0, member, "query {value} gave {slot}");
    }
    Ok(())
}

#[test]
fn range_filling_whole_rows_has_no_empty_chunk() -> Result<()> {
    // 2048 values on 1024-slot rows: exactly two full chunks.
    let (start, size) = (12, 2048);
    let (cc, keys) = psm_context(16, size)?;

    for (value, expected) in [(2059, 0), (1035, 0), (2060, 1), (11, 1), (0, 1)] {
        let query = encrypt_packed(&cc, &keys, &[value])?;
        let verdict = cc.private_set_membership_range(&query, start, size)?;
        assert_eq!(open_packed(&cc, &keys, &verdict)?[0], expected, "query {value}");
    }
    Ok(())
}

#[test]
fn zero_padding_hides_a_zero_query_in_a_partial_chunk() -> Result<()> {
    // [-100, 1400): the second chunk holds 476 values and 548 zero-padded slots.
    let (start, size) = (-100, 1500);
    let (cc, keys) = psm_context(17, size)?;

    for (value, expected) in [(-100, 0), (1399, 0), (1400, 1)] {
        let query = encrypt_packed(&cc, &keys, &[value])?;
        let verdict = cc.private_set_membership_range(&query, start, size)?;
        assert_eq!(open_packed(&cc, &keys, &verdict)?[0], expected, "query {value}");
    }

    // 0 lies in the range, but the padding adds 548 more zero slots.
    let query = encrypt_packed(&cc, &keys, &[0])?;
    let verdict = cc.private_set_membership_range(&query, start, size)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 1024 - 549 - 1023);
    Ok(())
}

#[test]
fn range_within_one_row() -> Result<()> {
    let (cc, keys) = psm_context(11, 100)?;
    let query = encrypt_packed(&cc, &keys, &[111])?;
    let verdict = cc.private_set_membership_range(&query, 12, 100)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 0);

    let query = encrypt_packed(&cc, &keys, &[112])?;
    let verdict = cc.private_set_membership_range(&query, 12, 100)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 1);
    Ok(())
}

#[test]
#[ignore = "evaluates depth-17 circuits on a 2^15 ring"]
fn range_of_two_thousand_on_the_secure_ring() -> Result<()> {
    let (cc, keys) = context_with_keys(SfdkPreset::SecurePsm32768, 12)?;
    cc.prepare_psm(keys.secret_key()?, 2000)?;

    let query = encrypt_packed(&cc, &keys, &[1000])?;
    let verdict = cc.private_set_membership_range(&query, 12, 2000)?;
    assert_eq!(open_packed(&cc, &keys, &verdict)?[0], 0);

    let query = encrypt_packed(&cc, &keys, &[2012])?;
    let verdict = cc.private_set_membership_range(&query, 12, 2000)?;
    assert_ne!(open_packed(&cc, &keys, &verdict)?[0], 0);
    Ok(())
}

#[test]
fn fermat_mask_maps_residues_to_bits() -> Result<()> {
    let (cc, keys) = context_with_keys(SfdkPreset::InsecurePsm2048, 13)?;
    let sk = keys.secret_key()?;
    cc.eval_mult_key_gen(sk)?;

    let values = vec![0, 5, 65536, 0, 1, -300];
    let pt = cc.make_packed_plaintext(&values)?;
    let ct = cc.encrypt_with_secret(sk, &pt)?;
    let masked = cc.fermat_mask(&ct)?;
    let decoded = cc.decode_packed(&cc.decrypt(sk, &masked)?)?;
    assert_eq!(&decoded[..6], &[0, 1, 1, 0, 1, 1]);
    Ok(())
}

#[test]
fn membership_requires_preparation_and_a_set() -> Result<()> {
    let (cc, keys) = context_with_keys(SfdkPreset::InsecurePsm2048, 14)?;
    let query = encrypt_packed(&cc, &keys, &[1])?;

    assert!(matches!(
        cc.private_set_membership(&query, &[]),
        Err(SfdkError::EmptySet)
    ));
    assert!(matches!(
        cc.private_set_membership_range(&query, 0, 0),
        Err(SfdkError::EmptySet)
    ));
    assert!(matches!(
        cc.private_set_membership(&query, &[1, 2, 3]),
        Err(SfdkError::MissingRotationKey(-1))
    ));
    assert!(matches!(
        cc.private_set_membership_range(&query, i64::MAX - 5, 10),
        Err(SfdkError::InvalidParameters(_))
    ));
    assert!(matches!(
        cc.private_set_membership_range(&query, 0, usize::MAX),
        Err(SfdkError::InvalidParameters(_))
    ));

    cc.eval_at_index_key_gen(keys.secret_key()?, &[-1, -2])?;
    assert!(matches!(
        cc.private_set_membership(&query, &[1, 2, 3]),
        Err(SfdkError::MissingRelinearizationKey)
    ));
    Ok(())
}

#[test]
fn rotations_move_slots() -> Result<()> {
    let (cc, keys) = psm_context(15, 4)?;
    let sk = keys.secret_key()?;
    let ct = cc.encrypt_with_secret(sk, &cc.make_packed_plaintext(&[1, 2, 3, 4])?)?;

    let left = cc.decode_packed(&cc.decrypt(sk, &cc.eval_at_index(&ct, 1)?)?)?;
    assert_eq!(&left[..3], &[2, 3, 4]);

    let right = cc.decode_packed(&cc.decrypt(sk, &cc.eval_at_index(&ct, -2)?)?)?;
    assert_eq!(&right[..6], &[0, 0, 1, 2, 3, 4]);

    assert!(matches!(
        cc.eval_at_index(&ct, 3),
        Err(SfdkError::MissingRotationKey(3))
    ));
    Ok(())
}
