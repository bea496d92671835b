use crate::{ColorIndex, LightIndex};

/// One scalar output slot destined for a device.
///
/// Channels belong to the rendering side; arbitration only rewrites the
/// output fields. A channel with no light or no color is unmapped and is
/// never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub light: Option<LightIndex>,
    pub color: Option<ColorIndex>,
    /// Value written when no client drives this channel.
    pub fallback: f32,

    pub used: bool,
    pub value: f32,
    pub speed: f32,
    pub gamma: f32,
    pub adjust: f32,
    pub blacklevel: f32,
}

impl Channel {
    pub fn new(light: LightIndex, color: ColorIndex) -> Self {
        Self {
            light: Some(light),
            color: Some(color),
            ..Self::unmapped()
        }
    }

    pub fn unmapped() -> Self {
        Self {
            light: None,
            color: None,
            fallback: 0.0,
            used: false,
            value: 0.0,
            speed: 0.0,
            gamma: 1.0,
            adjust: 1.0,
            blacklevel: 0.0,
        }
    }

    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }

    /// The `(light, color)` pair, if both are mapped.
    pub fn mapping(&self) -> Option<(LightIndex, ColorIndex)> {
        Some((self.light?, self.color?))
    }

    pub fn set_value_to_fallback(&mut self) {
        self.value = self.fallback;
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::unmapped()
    }
}
