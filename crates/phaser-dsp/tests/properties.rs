//! Property-based checks of the fixed-point invariants the rest of the
//! datapath leans on.

use phaser_dsp::duc::mcm;
use phaser_dsp::rounding::{round_half_down, saturate_signed, sign_extend};
use phaser_dsp::{Complex, ComplexMultiplier};
use proptest::prelude::*;

proptest! {
    #[test]
    fn round_half_down_never_exceeds_half_lsb_above_true_value(x in -(1i64 << 40)..(1i64 << 40), shift in 1u32..20) {
        let rounded = round_half_down(x, shift);
        let reconstructed = (rounded as f64) * (1u64 << shift) as f64;
        let error = reconstructed - x as f64;
        let lsb = (1u64 << shift) as f64;
        prop_assert!(error > -lsb && error <= 0.0, "error={error} lsb={lsb}");
    }

    #[test]
    fn round_half_down_shift_zero_is_always_identity(x in any::<i64>()) {
        prop_assert_eq!(round_half_down(x, 0), x);
    }

    #[test]
    fn sign_extend_then_mask_round_trips(x in any::<i64>(), width in 1u32..64) {
        let narrow = x & ((1i64 << width) - 1);
        let extended = sign_extend(narrow, width);
        let remasked = extended & ((1i64 << width) - 1);
        prop_assert_eq!(remasked, narrow);
    }

    #[test]
    fn saturate_signed_is_idempotent(x in any::<i64>(), width in 2u32..63) {
        let once = saturate_signed(x, width);
        let twice = saturate_signed(once, width);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn saturate_signed_stays_within_declared_range(x in any::<i64>(), width in 2u32..63) {
        let clamped = saturate_signed(x, width);
        let max = (1i64 << (width - 1)) - 1;
        let min = -(1i64 << (width - 1));
        prop_assert!(clamped >= min && clamped <= max);
    }

    #[test]
    fn mcm_ladder_matches_multiplication_for_every_supported_constant(
        i in -(1i64 << 30)..(1i64 << 30),
        n in 0u32..=8,
    ) {
        prop_assert_eq!(mcm(i, n), i * n as i64);
    }

    #[test]
    fn complex_multiplier_matches_direct_product_at_zero_bias(
        ai in -1000i64..1000, aq in -1000i64..1000,
        bi in -1000i64..1000, bq in -1000i64..1000,
    ) {
        let cm = ComplexMultiplier::new(0);
        let a = Complex::new(ai, aq);
        let b = Complex::new(bi, bq);
        let got = cm.eval(a, b);
        let want_i = ai * bi - aq * bq;
        let want_q = ai * bq + aq * bi;
        prop_assert_eq!(got, Complex::new(want_i, want_q));
    }
}
