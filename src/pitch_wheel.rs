//! Pitch-wheel codec
//!
//! Converts cents offsets into 14-bit pitch-wheel units. The scale assumes
//! the receiving instrument uses the standard ±2 semitone bend range and
//! normalizes over 198 cents rather than 200 to account for the unsigned,
//! zero-based wheel range.

/// Wheel value that means "no bend".
pub const PITCH_WHEEL_CENTER: u16 = 8192;

/// Largest legal wheel value (14 bits).
pub const PITCH_WHEEL_MAX: u16 = 16383;

/// Cents spanned by one half of the wheel for the purposes of the conversion.
pub const CENTS_NORMALIZATION: f64 = 198.0;

const UNITS_PER_CENT: f64 = PITCH_WHEEL_MAX as f64 / CENTS_NORMALIZATION;

/// Wheel delta for a cents offset in [-100, 100], rounded to the nearest unit.
///
/// Inputs outside the range are clamped first; NaN maps to 0.
pub fn cents_to_wheel_delta(cents: f32) -> i32 {
    if cents.is_nan() {
        return 0;
    }
    let cents = f64::from(cents.clamp(-100.0, 100.0));
    (cents * UNITS_PER_CENT).round() as i32
}

/// Add `delta` to a wheel value, saturating at 0 and [`PITCH_WHEEL_MAX`].
pub fn apply_delta(base: u16, delta: i32) -> u16 {
    let value = i32::from(base).saturating_add(delta);
    value.clamp(0, i32::from(PITCH_WHEEL_MAX)) as u16
}

/// Wheel value that retunes an unbent note by `cents`.
pub fn corrected_center(cents: f32) -> u16 {
    apply_delta(PITCH_WHEEL_CENTER, cents_to_wheel_delta(cents))
}

/// Split a wheel value into its (LSB, MSB) 7-bit data bytes.
pub fn split_14bit(value: u16) -> (u8, u8) {
    let value = value.min(PITCH_WHEEL_MAX);
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}

/// Combine (LSB, MSB) data bytes into a wheel value.
pub fn combine_14bit(lsb: u8, msb: u8) -> u16 {
    (u16::from(msb & 0x7F) << 7) | u16::from(lsb & 0x7F)
}
