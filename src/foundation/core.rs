pub use kurbo::Affine;

/// A sample point in flame space.
///
/// `color` is the palette coordinate in `[0, 1]` carried alongside the spatial
/// coordinates; variations normally leave it untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct XyzPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub color: f64,
}

impl XyzPoint {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        color: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, color: 0.0 }
    }

    pub fn sum_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Radius of the xy projection.
    pub fn radius(&self) -> f64 {
        self.sum_sq().sqrt()
    }

    /// Polar angle of the xy projection, `atan2(y, x)`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Pixel dimensions of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Independent stream for worker `index` derived from a base seed.
    pub fn for_worker(seed: u64, index: u64) -> Self {
        Self::new(seed ^ index.wrapping_add(1).wrapping_mul(0xD6E8_FEB8_6659_FD93))
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
