//! Property-based tests for audio domain math.
//! Verifies invariants hold for ALL inputs, not just fixed examples.

use platform::{HeadphoneVolume, SampleRateHz};

proptest::proptest! {
    /// HeadphoneVolume::new never panics and always lands in 0..=79.
    #[test]
    fn headphone_volume_new_always_in_range(step in 0u8..=255u8) {
        let v = HeadphoneVolume::new(step);
        assert!(v.get() <= HeadphoneVolume::MAX);
    }

    /// try_new agrees with new wherever it succeeds.
    #[test]
    fn headphone_volume_try_new_matches_new(step in 0u8..=255u8) {
        match HeadphoneVolume::try_new(step) {
            Ok(v) => assert_eq!(v, HeadphoneVolume::new(step)),
            Err(_) => assert!(step > HeadphoneVolume::MAX),
        }
    }

    /// Stepping up then down never leaves the range and never moves the
    /// wrong way.
    #[test]
    fn headphone_volume_steps_are_monotone(start in 0u8..=79u8, step in 0u8..=255u8) {
        let v = HeadphoneVolume::new(start);
        let up = v.step_up(step);
        let down = v.step_down(step);
        assert!(up >= v && up.get() <= HeadphoneVolume::MAX);
        assert!(down <= v);
    }

    /// SampleRateHz::new never panics for any u32 input.
    #[test]
    fn sample_rate_hz_new_never_panics(hz in 0u32..=u32::MAX) {
        let _ = SampleRateHz::new(hz);
    }

    /// SampleRateHz valid range [8000, 96000] always succeeds.
    #[test]
    fn sample_rate_hz_valid_range_always_ok(hz in 8000u32..=96_000u32) {
        assert!(SampleRateHz::new(hz).is_ok(),
            "SampleRateHz::new({}) should be Ok within [8000, 96000]", hz);
    }

    /// SampleRateHz out of range always fails.
    #[test]
    fn sample_rate_hz_out_of_range_always_err(hz in 96_001u32..=u32::MAX) {
        assert!(SampleRateHz::new(hz).is_err(),
            "SampleRateHz::new({}) should be Err above 96000", hz);
    }
}
