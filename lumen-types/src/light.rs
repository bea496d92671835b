//! Light color model.
//!
//! A `Light` is one addressable lamp: a name, the screen region it samples,
//! the color outputs a device drives for it, and the target color most
//! recently requested by a client. Every session holds its own clone of the
//! configured lights, so all per-client state lives here.

use serde::{Deserialize, Serialize};

use crate::ColorIndex;

/// Default transition speed for a light, in percent.
pub const DEFAULT_SPEED: f32 = 100.0;

/// Scan region along one screen axis, in percent of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRange {
    pub min: f32,
    pub max: f32,
}

impl ScanRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn as_array(&self) -> [f32; 2] {
        [self.min, self.max]
    }
}

impl Default for ScanRange {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0 }
    }
}

/// One color output of a light (e.g. the red LED of an RGB lamp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    /// Primary direction this output represents, each component 0..=1.
    pub rgb: [f32; 3],
    #[serde(default = "unit")]
    pub gamma: f32,
    #[serde(default = "unit")]
    pub adjust: f32,
    #[serde(default)]
    pub blacklevel: f32,
}

fn unit() -> f32 {
    1.0
}

impl Color {
    pub fn new(name: &str, rgb: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            rgb,
            gamma: 1.0,
            adjust: 1.0,
            blacklevel: 0.0,
        }
    }

    pub fn red() -> Self {
        Self::new("red", [1.0, 0.0, 0.0])
    }

    pub fn green() -> Self {
        Self::new("green", [0.0, 1.0, 0.0])
    }

    pub fn blue() -> Self {
        Self::new("blue", [0.0, 0.0, 1.0])
    }

    /// Project an rgb triple onto this color's primary direction.
    fn project(&self, rgb: [f32; 3]) -> f32 {
        let mut value: Option<f32> = None;
        for (component, primary) in rgb.iter().zip(self.rgb.iter()) {
            if *primary > 0.0 {
                let v = component / primary;
                value = Some(value.map_or(v, |cur| cur.min(v)));
            }
        }
        value.unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

/// A light and the color a client wants it to show.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    name: String,
    vscan: ScanRange,
    hscan: ScanRange,
    colors: Vec<Color>,
    rgb: [f32; 3],
    /// Time `rgb` was set, -1 if never.
    time: i64,
    prev_rgb: [f32; 3],
    /// Time `prev_rgb` was set, -1 if there is no previous target.
    prev_time: i64,
    speed: f32,
    interpolation: bool,
    use_light: bool,
}

impl Light {
    /// Create a light with red, green and blue outputs.
    pub fn new(name: &str, vscan: ScanRange, hscan: ScanRange) -> Self {
        Self::with_colors(name, vscan, hscan, vec![Color::red(), Color::green(), Color::blue()])
    }

    pub fn with_colors(name: &str, vscan: ScanRange, hscan: ScanRange, colors: Vec<Color>) -> Self {
        Self {
            name: name.to_string(),
            vscan,
            hscan,
            colors,
            rgb: [0.0; 3],
            time: -1,
            prev_rgb: [0.0; 3],
            prev_time: -1,
            speed: DEFAULT_SPEED,
            interpolation: false,
            use_light: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vscan(&self) -> [f32; 2] {
        self.vscan.as_array()
    }

    pub fn hscan(&self) -> [f32; 2] {
        self.hscan.as_array()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Set a new target color. Components are clamped to 0..=1.
    pub fn set_rgb(&mut self, rgb: [f32; 3], time: i64) {
        self.prev_rgb = self.rgb;
        self.prev_time = self.time;
        self.rgb = rgb.map(|c| c.clamp(0.0, 1.0));
        self.time = time;
    }

    pub fn rgb(&self) -> [f32; 3] {
        self.rgb
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_interpolation(&mut self, interpolation: bool) {
        self.interpolation = interpolation;
    }

    pub fn interpolation(&self) -> bool {
        self.interpolation
    }

    pub fn set_use(&mut self, use_light: bool) {
        self.use_light = use_light;
    }

    pub fn is_used(&self) -> bool {
        self.use_light
    }

    /// Output value of one color at `time`.
    ///
    /// With interpolation on, the previous target blends into the current
    /// one over the interval that separated the two `set_rgb` calls.
    pub fn color_value(&self, color: ColorIndex, time: i64) -> f32 {
        let Some(color) = self.colors.get(color) else {
            return 0.0;
        };
        color.project(self.rgb_at(time))
    }

    fn rgb_at(&self, time: i64) -> [f32; 3] {
        if !self.interpolation || self.prev_time < 0 {
            return self.rgb;
        }
        let span = self.time - self.prev_time;
        if span <= 0 {
            return self.rgb;
        }
        let progress = ((time - self.time) as f32 / span as f32).clamp(0.0, 1.0);
        let mut rgb = [0.0; 3];
        for (i, out) in rgb.iter_mut().enumerate() {
            *out = self.prev_rgb[i] + (self.rgb[i] - self.prev_rgb[i]) * progress;
        }
        rgb
    }

    pub fn gamma(&self, color: ColorIndex) -> f32 {
        self.colors.get(color).map_or(1.0, |c| c.gamma)
    }

    pub fn adjust(&self, color: ColorIndex) -> f32 {
        self.colors.get(color).map_or(1.0, |c| c.adjust)
    }

    pub fn blacklevel(&self, color: ColorIndex) -> f32 {
        self.colors.get(color).map_or(0.0, |c| c.blacklevel)
    }
}
