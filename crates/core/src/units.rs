//! Conversion from native OOXML lengths to inches.
//!
//! Values are carried at full precision and only rounded when they are
//! stored into a record, so derived computations never compound rounding.

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Convert an EMU length to inches without rounding.
///
/// Zero and negative lengths pass through unchanged.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert inches to the nearest EMU length.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert points to the nearest EMU length.
pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64).round() as i64
}

/// Convert a run size in hundredths of a point (`a:rPr/@sz`) to EMU.
pub fn centipoints_to_emu(centipoints: i64) -> i64 {
    centipoints * EMU_PER_POINT / 100
}

/// Round to 2 decimal places, the precision used in every stored record.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert an EMU length to inches rounded for storage.
pub fn emu_to_stored_inches(emu: i64) -> f64 {
    round2(emu_to_inches(emu))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_to_inches() {
        assert_eq!(emu_to_inches(914_400), 1.0);
        assert_eq!(emu_to_inches(9_144_000), 10.0);
        assert_eq!(emu_to_inches(457_200), 0.5);
    }

    #[test]
    fn test_zero_and_negative_pass_through() {
        assert_eq!(emu_to_inches(0), 0.0);
        assert_eq!(emu_to_inches(-914_400), -1.0);
        assert_eq!(emu_to_stored_inches(-457_200), -0.5);
    }

    #[test]
    fn test_rounding_only_at_storage() {
        // 1/3 inch stays exact until stored
        let third = emu_to_inches(304_800);
        assert!((third - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(emu_to_stored_inches(304_800), 0.33);
    }

    #[test]
    fn test_inverse_conversions() {
        assert_eq!(inches_to_emu(1.5), 1_371_600);
        assert_eq!(points_to_emu(2.0), 25_400);
        assert_eq!(centipoints_to_emu(4400), 558_800);
    }
}
