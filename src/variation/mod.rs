//! Variation transforms: the nonlinear per-point functions applied inside each xform.
//!
//! Every transform implements [`Variation`]. A flame names its variations by
//! [`Variation::name`] and [`VariationRegistry`] turns those names into fresh instances.
//!
//! Point flow through one call of [`Variation::transform`]:
//!
//! - `affine` is the affine-transformed input point. Pre-variations (negative
//!   [`Variation::priority`]) rewrite it in place.
//! - `var` is the stage accumulator. Regular variations add their contribution to it.
//!
//! Both points belong to the calling sampler for the duration of one iteration step.

use std::fmt;

use crate::foundation::core::{Affine, Rng64, XyzPoint};
use crate::foundation::error::{FlameError, FlameResult};

pub mod circle_crop;
pub mod hexaplay3d;
pub mod params;
pub mod registry;
pub mod simple;

pub use circle_crop::PreCircleCrop;
pub use hexaplay3d::Hexaplay3D;
pub use params::{ParamKind, ParamMap, ParamValue, find_param};
pub use registry::VariationRegistry;
pub use simple::{Julia, Linear, Sinusoidal, Spherical, Swirl};

/// Per-worker execution context handed to every variation call.
#[derive(Clone, Debug)]
pub struct TransformContext {
    rng: Rng64,
}

impl TransformContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng64::new(seed),
        }
    }

    pub fn from_rng(rng: Rng64) -> Self {
        Self { rng }
    }

    /// Uniform value in `[0, 1)` from this context's stream.
    pub fn random(&mut self) -> f64 {
        self.rng.next_f64_01()
    }

    pub fn rng_mut(&mut self) -> &mut Rng64 {
        &mut self.rng
    }
}

/// Read-only view of the xform that owns a variation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageInfo {
    pub coefs: Affine,
    pub post: Option<Affine>,
    pub weight: f64,
    pub color: f64,
}

impl Default for StageInfo {
    fn default() -> Self {
        Self {
            coefs: Affine::IDENTITY,
            post: None,
            weight: 1.0,
            color: 0.0,
        }
    }
}

/// Contract shared by every variation transform.
///
/// Parameters are set while a flame is being built; after [`Variation::init`] the
/// parameter values are only read. Each render worker owns its own boxed clone, so
/// any state a variation caches in `init` or updates in `transform` is per worker.
pub trait Variation: Send + fmt::Debug {
    /// Stable identifier used for lookup and serialization.
    fn name(&self) -> &'static str;

    /// Parameter schema in enumeration order.
    fn parameter_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Current values, aligned with [`Variation::parameter_names`].
    fn parameter_values(&self) -> Vec<ParamValue> {
        Vec::new()
    }

    /// Set one parameter by case-insensitive name.
    ///
    /// Names outside the schema fail with [`FlameError::InvalidParameter`].
    fn set_parameter(&mut self, name: &str, _value: f64) -> FlameResult<()> {
        Err(FlameError::invalid_parameter(self.name(), name))
    }

    /// Called once per worker before a batch of iterations.
    fn init(&mut self, _ctx: &mut TransformContext, _stage: &StageInfo) {}

    /// Per-point hot path. Must not allocate.
    fn transform(
        &mut self,
        ctx: &mut TransformContext,
        stage: &StageInfo,
        affine: &mut XyzPoint,
        var: &mut XyzPoint,
        amount: f64,
    );

    /// Execution order within a stage; negative runs before the regular variations.
    fn priority(&self) -> i32 {
        0
    }

    fn clone_box(&self) -> Box<dyn Variation>;
}

impl Clone for Box<dyn Variation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
