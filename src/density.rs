//! density.rs
//! Buckets raw tile counts into the 0–5 density levels the heatmap renders,
//! and maps levels onto fill colors for the GeoJSON export.

/// Highest density level.
pub const MAX_LEVEL: u8 = 5;

/// Classify a raw device count into a density level. Total over all counts,
/// no failure mode.
pub fn level_for(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=4 => 1,
        5..=9 => 2,
        10..=19 => 3,
        20..=49 => 4,
        _ => 5,
    }
}

/// Fill color per density level, light to dark.
pub fn color_for(level: u8) -> &'static str {
    const RAMP: [&str; 6] = [
        "#e9f7ef", "#a9e3b6", "#ffe08a", "#ff9f58", "#f5544f", "#d73a49",
    ];
    RAMP[level.min(MAX_LEVEL) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_edges() {
        assert_eq!(level_for(0), 0);
        assert_eq!(level_for(1), 1);
        assert_eq!(level_for(4), 1);
        assert_eq!(level_for(5), 2);
        assert_eq!(level_for(9), 2);
        assert_eq!(level_for(10), 3);
        assert_eq!(level_for(19), 3);
        assert_eq!(level_for(20), 4);
        assert_eq!(level_for(49), 4);
        assert_eq!(level_for(50), 5);
        assert_eq!(level_for(u32::MAX), 5);
    }

    #[test]
    fn levels_never_decrease_with_count() {
        let mut prev = 0;
        for c in 0..200 {
            let l = level_for(c);
            assert!(l >= prev);
            prev = l;
        }
    }

    #[test]
    fn every_level_has_a_color() {
        for l in 0..=MAX_LEVEL {
            assert!(color_for(l).starts_with('#'));
        }
        assert_eq!(color_for(200), color_for(MAX_LEVEL));
    }
}
