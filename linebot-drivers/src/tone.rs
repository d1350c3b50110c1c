//! Piezo tone generation
//!
//! A square wave on a PWM slice: the counter wraps at `top`, the output
//! is high for the first half of each period. The integer clock divider
//! is chosen as small as possible so the period keeps full resolution.

/// Largest integer clock divider of the PWM slice
pub const MAX_DIVIDER: u32 = 255;

/// PWM slice settings for one tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TonePwm {
    /// Integer clock divider (1-255)
    pub divider: u8,
    /// Counter wrap value
    pub top: u16,
    /// Compare value for 50% duty
    pub compare: u16,
}

/// Compute slice settings for `frequency_hz` from a `sys_clk_hz` input clock
///
/// Returns `None` for 0 Hz and for frequencies too low to reach with the
/// largest divider.
pub fn tone_pwm(sys_clk_hz: u32, frequency_hz: u16) -> Option<TonePwm> {
    if frequency_hz == 0 {
        return None;
    }

    let freq = frequency_hz as u64;
    let clk = sys_clk_hz as u64;
    let period_limit = u16::MAX as u64 + 1;

    // Smallest divider whose period fits the 16-bit counter
    let divider = clk.div_ceil(freq * period_limit).max(1);
    if divider > MAX_DIVIDER as u64 {
        return None;
    }

    let period = clk / (divider * freq);
    if period < 2 {
        return None;
    }

    let top = (period - 1) as u16;
    Some(TonePwm {
        divider: divider as u8,
        top,
        compare: top / 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS_CLK: u32 = 125_000_000;

    #[test]
    fn test_mode_tones() {
        let pwm = tone_pwm(SYS_CLK, 100).unwrap();
        assert_eq!(
            pwm,
            TonePwm {
                divider: 20,
                top: 62_499,
                compare: 31_249
            }
        );

        let pwm = tone_pwm(SYS_CLK, 130).unwrap();
        assert_eq!(pwm.divider, 15);
        assert_eq!(pwm.top, 64_101);
    }

    #[test]
    fn test_high_frequency_uses_unit_divider() {
        let pwm = tone_pwm(SYS_CLK, 4000).unwrap();
        assert_eq!(pwm.divider, 1);
        assert_eq!(pwm.top, 31_249);
    }

    #[test]
    fn test_generated_frequency_is_close() {
        for freq in [100u16, 110, 120, 130, 440, 2000, 10_000] {
            let pwm = tone_pwm(SYS_CLK, freq).unwrap();
            let actual = SYS_CLK / (pwm.divider as u32 * (pwm.top as u32 + 1));
            let err = (actual as i64 - freq as i64).abs();
            assert!(err <= 1, "{} Hz produced {} Hz", freq, actual);
        }
    }

    #[test]
    fn test_unreachable_frequencies() {
        assert_eq!(tone_pwm(SYS_CLK, 0), None);
        // 125 MHz / (255 * 65536) is about 7.5 Hz
        assert_eq!(tone_pwm(SYS_CLK, 7), None);
        assert!(tone_pwm(SYS_CLK, 8).is_some());
    }
}
