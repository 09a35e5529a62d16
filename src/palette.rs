//! Static color bands for every painted material.
//!
//! Colors are HSL templates: hue in degrees, saturation and lightness in
//! percent.  A template is never mutated in place; the brush copies it,
//! applies per-call jitter, and converts to RGB at the moment pixels are
//! written.  Derived variants (e.g. the darkened stem overlay) are new
//! values produced by [`Hsl::darker`].

/// One HSL color band entry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hsl {
    /// Hue in degrees.  Values outside [0, 360) wrap during conversion.
    pub h: f32,
    /// Saturation in percent [0, 100].
    pub s: f32,
    /// Lightness in percent [0, 100].
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Copy of this color with lightness reduced by `delta` percent.
    pub fn darker(self, delta: f32) -> Self {
        Self {
            l: (self.l - delta).max(0.0),
            ..self
        }
    }

    /// Convert to sRGB channels in [0, 1].
    ///
    /// Standard HSL cylinder conversion; saturation and lightness are
    /// clamped first so jittered values slightly outside [0, 100] stay
    /// valid.
    pub fn to_rgb(self) -> [f32; 3] {
        let h = self.h.rem_euclid(360.0);
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        [r + m, g + m, b + m]
    }
}

/// Fore/hind wing color pair for one butterfly species.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WingColors {
    pub fore: Hsl,
    pub hind: Hsl,
}

/// Soft washes layered over the soil band at seeding time.
pub const GROUND: [Hsl; 3] = [
    Hsl::new(85.0, 30.0, 85.0),
    Hsl::new(75.0, 25.0, 80.0),
    Hsl::new(95.0, 20.0, 75.0),
];

/// Stalk greens.  The last entry is the darker vine stem; upright species
/// pick uniformly from the first four.
pub const STEMS: [Hsl; 5] = [
    Hsl::new(95.0, 35.0, 40.0),
    Hsl::new(80.0, 40.0, 45.0),
    Hsl::new(110.0, 30.0, 35.0),
    Hsl::new(45.0, 35.0, 50.0),
    Hsl::new(120.0, 20.0, 30.0),
];

/// Wildflower petal bands.  A flower's accent color is the next entry after
/// its main pick, so adjacent hues pair naturally.
pub const FLOWERS: [Hsl; 6] = [
    Hsl::new(12.0, 85.0, 62.0),
    Hsl::new(215.0, 70.0, 65.0),
    Hsl::new(42.0, 95.0, 65.0),
    Hsl::new(275.0, 45.0, 68.0),
    Hsl::new(335.0, 75.0, 70.0),
    Hsl::new(25.0, 90.0, 60.0),
];

pub const SUNFLOWER_PETALS: Hsl = Hsl::new(45.0, 95.0, 60.0);
pub const SUNFLOWER_PETALS_DEEP: Hsl = Hsl::new(35.0, 90.0, 50.0);
pub const SUNFLOWER_CENTER: Hsl = Hsl::new(25.0, 40.0, 20.0);

/// Vine foliage: rich green, lighter green, variegated cream.
pub const VINE_LEAVES: [Hsl; 3] = [
    Hsl::new(100.0, 45.0, 35.0),
    Hsl::new(85.0, 40.0, 45.0),
    Hsl::new(60.0, 30.0, 75.0),
];

/// Wing pairs: monarch orange, blue morpho, purple emperor, swallowtail
/// yellow, pink petal.
pub const BUTTERFLIES: [WingColors; 5] = [
    WingColors {
        fore: Hsl::new(25.0, 95.0, 55.0),
        hind: Hsl::new(0.0, 0.0, 10.0),
    },
    WingColors {
        fore: Hsl::new(190.0, 90.0, 50.0),
        hind: Hsl::new(210.0, 80.0, 20.0),
    },
    WingColors {
        fore: Hsl::new(280.0, 80.0, 60.0),
        hind: Hsl::new(300.0, 70.0, 30.0),
    },
    WingColors {
        fore: Hsl::new(50.0, 95.0, 60.0),
        hind: Hsl::new(40.0, 80.0, 20.0),
    },
    WingColors {
        fore: Hsl::new(330.0, 90.0, 65.0),
        hind: Hsl::new(350.0, 70.0, 30.0),
    },
];

/// Dotted flower hearts (non-sunflower species).
pub const FLOWER_CENTERS: Hsl = Hsl::new(45.0, 80.0, 45.0);

/// Default leaf green for upright species.
pub const LEAVES: Hsl = Hsl::new(100.0, 35.0, 42.0);

/// Butterfly head/thorax/abdomen.
pub const BUTTERFLY_BODY: Hsl = Hsl::new(0.0, 0.0, 15.0);

// --- tests ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn primary_hues_convert() {
        let [r, g, b] = Hsl::new(0.0, 100.0, 50.0).to_rgb();
        assert!(close(r, 1.0) && close(g, 0.0) && close(b, 0.0));

        let [r, g, b] = Hsl::new(120.0, 100.0, 50.0).to_rgb();
        assert!(close(r, 0.0) && close(g, 1.0) && close(b, 0.0));

        let [r, g, b] = Hsl::new(240.0, 100.0, 50.0).to_rgb();
        assert!(close(r, 0.0) && close(g, 0.0) && close(b, 1.0));
    }

    #[test]
    fn neutral_grey_has_equal_channels() {
        let [r, g, b] = Hsl::new(210.0, 0.0, 40.0).to_rgb();
        assert!(close(r, g) && close(g, b));
        assert!(close(r, 0.4));
    }

    #[test]
    fn hue_wraps_and_channels_clamp() {
        let wrapped = Hsl::new(480.0, 100.0, 50.0).to_rgb();
        let green = Hsl::new(120.0, 100.0, 50.0).to_rgb();
        assert_eq!(wrapped, green);

        // Jittered saturation past 100 must not escape [0, 1].
        let [r, g, b] = Hsl::new(42.0, 104.0, 103.0).to_rgb();
        for v in [r, g, b] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn darker_floors_at_zero() {
        let c = Hsl::new(95.0, 35.0, 8.0).darker(15.0);
        assert_eq!(c.l, 0.0);
        assert_eq!(c.h, 95.0);
    }

    #[test]
    fn band_tables_are_complete() {
        assert_eq!(GROUND.len(), 3);
        assert_eq!(STEMS.len(), 5);
        assert_eq!(FLOWERS.len(), 6);
        assert_eq!(VINE_LEAVES.len(), 3);
        assert_eq!(BUTTERFLIES.len(), 5);
    }
}
