//! Wind speed to colour mapping for particle trails.
//!
//! Speeds map linearly onto a hue ramp (blue for calm air, red at `max_speed`
//! and above), then to RGB through HSL.

use serde::{Deserialize, Serialize};

/// Linear RGB colour in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Speed → hue ramp configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRamp {
    /// Speed (m/s) that maps to `fast_hue`; faster winds clamp
    pub max_speed: f32,
    /// Hue at zero speed, in turns (0.66 = blue)
    pub slow_hue: f32,
    /// Hue at `max_speed`, in turns (0.0 = red)
    pub fast_hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            max_speed: 40.0,
            slow_hue: 0.66,
            fast_hue: 0.0,
            saturation: 1.0,
            lightness: 0.55,
        }
    }
}

impl ColorRamp {
    /// Position of `speed` along the ramp, clamped to `[0, 1]`
    #[inline]
    #[must_use]
    pub fn normalized(&self, speed: f32) -> f32 {
        (speed / self.max_speed).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn hue_for_speed(&self, speed: f32) -> f32 {
        let t = self.normalized(speed);
        self.slow_hue + (self.fast_hue - self.slow_hue) * t
    }

    #[must_use]
    pub fn color_for_speed(&self, speed: f32) -> Rgb {
        hsl_to_rgb(self.hue_for_speed(speed), self.saturation, self.lightness)
    }
}

/// Convert HSL (hue in turns, saturation and lightness in `[0, 1]`) to RGB
#[must_use]
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let hue = hue.rem_euclid(1.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);

    if saturation == 0.0 {
        return Rgb::new(lightness, lightness, lightness);
    }

    let q = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;

    Rgb::new(
        hue_to_channel(p, q, hue + 1.0 / 3.0),
        hue_to_channel(p, q, hue),
        hue_to_channel(p, q, hue - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
