//! Piecewise-linear color scales for statistic display. Interpolation runs
//! in OKLab so hue ramps stay perceptually smooth; breakpoints themselves
//! are returned exactly, and values outside the domain clamp to the
//! endpoint colors.

use crate::options::{ColorStyle, ValueMetric};

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Mix toward `other` by `t` in OKLab. `t = 0` returns `self`.
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        let a = rgb_to_oklab(self);
        let b = rgb_to_oklab(other);
        oklab_to_rgb([
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ])
    }

    /// CSS `rgb(r, g, b)` form.
    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Relative luminance in [0, 1] (Rec. 601 weights, as the original UI
    /// used for its contrast rule).
    pub fn luminance(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

/// An ascending, unique-threshold color line: `(threshold, color)` pairs.
pub type ColorLine = [(f64, Rgb)];

/// Map `value` onto the color line. Below the first threshold clamps to
/// the first color, above the last to the last; at a breakpoint the
/// breakpoint's own color is returned exactly.
pub fn interpolate(line: &ColorLine, value: f64) -> Rgb {
    let (first, last) = match (line.first(), line.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return Rgb::BLACK,
    };
    if value <= first.0 {
        return first.1;
    }
    for pair in line.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if value <= t1 {
            let factor = ((value - t0) / (t1 - t0)) as f32;
            return c0.mix(c1, factor);
        }
    }
    last.1
}

/// Border color: the value color mixed with white at a fixed 1:1 ratio.
pub fn border_color(line: &ColorLine, value: f64) -> Rgb {
    interpolate(line, value).mix(Rgb::WHITE, 0.5)
}

/// Black or white, whichever contrasts with the given background.
pub fn contrast_text_color(background: Rgb) -> Rgb {
    if background.luminance() > 0.5 {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

/// The built-in colormap for a (value metric, style) selection. Retention
/// lines span [0, 1]; stability lines span days.
pub fn colormap(value: ValueMetric, style: ColorStyle) -> &'static ColorLine {
    match (value, style) {
        (ValueMetric::Retention, ColorStyle::Goldie) => &RETENTION_GOLDIE,
        (ValueMetric::Retention, ColorStyle::BlueSea) => &RETENTION_BLUESEA,
        (_, ColorStyle::Goldie) => &STABILITY_GOLDIE,
        (_, ColorStyle::BlueSea) => &STABILITY_BLUESEA,
    }
}

const RETENTION_GOLDIE: [(f64, Rgb); 5] = [
    (0.0, Rgb::new(240, 240, 240)),
    (0.8, Rgb::new(246, 198, 197)),
    (0.9, Rgb::new(211, 209, 110)),
    (0.95, Rgb::new(65, 200, 110)),
    (1.0, Rgb::new(47, 155, 249)),
];

const RETENTION_BLUESEA: [(f64, Rgb); 3] = [
    (0.0, Rgb::new(240, 240, 240)),
    (0.9, Rgb::new(198, 235, 254)),
    (1.0, Rgb::new(0, 170, 255)),
];

const STABILITY_GOLDIE: [(f64, Rgb); 5] = [
    (0.0, Rgb::new(240, 240, 240)),
    (1.0, Rgb::new(246, 198, 197)),
    (3.0, Rgb::new(211, 209, 110)),
    (7.0, Rgb::new(65, 200, 110)),
    (15.0, Rgb::new(47, 155, 249)),
];

const STABILITY_BLUESEA: [(f64, Rgb); 3] = [
    (0.0, Rgb::new(240, 240, 240)),
    (2.0, Rgb::new(198, 235, 254)),
    (15.0, Rgb::new(0, 170, 255)),
];

// sRGB (8-bit) → OKLab, per Björn Ottosson's reference conversion.
fn rgb_to_oklab(c: Rgb) -> [f32; 3] {
    let r = srgb_to_linear(c.r as f32 / 255.0);
    let g = srgb_to_linear(c.g as f32 / 255.0);
    let b = srgb_to_linear(c.b as f32 / 255.0);

    let l = (0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b).cbrt();
    let m = (0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b).cbrt();
    let s = (0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b).cbrt();

    [
        0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
        1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
        0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
    ]
}

fn oklab_to_rgb(lab: [f32; 3]) -> Rgb {
    let l_ = lab[0] + 0.3963377774 * lab[1] + 0.2158037573 * lab[2];
    let m_ = lab[0] - 0.1055613458 * lab[1] - 0.0638541728 * lab[2];
    let s_ = lab[0] - 0.0894841775 * lab[1] - 1.2914855480 * lab[2];

    let l = l_ * l_ * l_;
    let m = m_ * m_ * m_;
    let s = s_ * s_ * s_;

    let r = 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s;
    let g = -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s;
    let b = -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s;

    Rgb::new(
        (linear_to_srgb(r).clamp(0.0, 1.0) * 255.0).round() as u8,
        (linear_to_srgb(g).clamp(0.0, 1.0) * 255.0).round() as u8,
        (linear_to_srgb(b).clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn srgb_to_linear(u: f32) -> f32 {
    if u <= 0.04045 {
        u / 12.92
    } else {
        ((u + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(u: f32) -> f32 {
    if u <= 0.0031308 {
        u * 12.92
    } else {
        1.055 * u.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_return_their_exact_color() {
        let line = colormap(ValueMetric::Retention, ColorStyle::Goldie);
        for &(threshold, color) in line {
            assert_eq!(interpolate(line, threshold), color, "at {threshold}");
        }
    }

    #[test]
    fn out_of_domain_values_clamp_to_endpoints() {
        let line = colormap(ValueMetric::Retention, ColorStyle::Goldie);
        assert_eq!(interpolate(line, -5.0), line[0].1);
        assert_eq!(interpolate(line, 2.0), line[line.len() - 1].1);
    }

    #[test]
    fn midpoint_lies_between_breakpoint_colors() {
        let line: [(f64, Rgb); 2] = [(0.0, Rgb::BLACK), (1.0, Rgb::WHITE)];
        let mid = interpolate(&line, 0.5);
        // Gray-ish: channels equal, strictly between the endpoints.
        assert_eq!(mid.r, mid.g);
        assert_eq!(mid.g, mid.b);
        assert!(mid.r > 0 && mid.r < 255);
    }

    #[test]
    fn interpolation_is_deterministic() {
        let line = colormap(ValueMetric::StabilityDays, ColorStyle::BlueSea);
        for i in 0..=100 {
            let v = i as f64 * 0.15;
            assert_eq!(interpolate(line, v), interpolate(line, v));
        }
    }

    #[test]
    fn border_color_is_lighter_than_value_color() {
        let line = colormap(ValueMetric::Retention, ColorStyle::BlueSea);
        let base = interpolate(line, 0.95);
        let border = border_color(line, 0.95);
        assert!(border.luminance() > base.luminance());
    }

    #[test]
    fn contrast_text_flips_at_half_luminance() {
        assert_eq!(contrast_text_color(Rgb::WHITE), Rgb::BLACK);
        assert_eq!(contrast_text_color(Rgb::BLACK), Rgb::WHITE);
        assert_eq!(contrast_text_color(Rgb::new(255, 255, 0)), Rgb::BLACK);
        assert_eq!(contrast_text_color(Rgb::new(0, 0, 180)), Rgb::WHITE);
    }

    #[test]
    fn oklab_roundtrip_is_near_exact() {
        for c in [Rgb::new(240, 240, 240), Rgb::new(47, 155, 249), Rgb::new(0, 170, 255)] {
            let back = oklab_to_rgb(rgb_to_oklab(c));
            assert!((back.r as i16 - c.r as i16).abs() <= 1);
            assert!((back.g as i16 - c.g as i16).abs() <= 1);
            assert!((back.b as i16 - c.b as i16).abs() <= 1);
        }
    }
}
