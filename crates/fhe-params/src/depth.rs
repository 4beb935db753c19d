// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

/// Multiplicative depth the membership circuit consumes for plaintext modulus `p`.
///
/// Each bit of `p` costs one squaring, each set bit one extra multiplication; the top bit
/// and the final packed-mask multiplication are folded into the two levels subtracted.
pub fn psm_depth(p: u64) -> usize {
    let mut depth: usize = 0;
    let mut mask: u64 = 1;
    while mask != 0 && mask <= p {
        depth += 1;
        if mask & p != 0 {
            depth += 1;
        }
        mask <<= 1;
    }
    depth.saturating_sub(2)
}
