#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}
impl Pixel {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Reads one pixel from interleaved samples; RGB pixels are opaque.
    pub(crate) fn from_samples(samples: &[u8]) -> Option<Self> {
        match *samples {
            [red, green, blue] => Some(Self::new(red, green, blue, u8::MAX)),
            [red, green, blue, alpha] => Some(Self::new(red, green, blue, alpha)),
            _ => None,
        }
    }
}
