use std::collections::BTreeMap;

use crate::foundation::error::{FlameError, FlameResult};
use crate::variation::{
    Hexaplay3D, Julia, Linear, PreCircleCrop, Sinusoidal, Spherical, Swirl, Variation,
};

/// Constructor for a fresh, default-parameterised variation.
pub type VariationFactory = fn() -> Box<dyn Variation>;

/// Name-keyed table of variation constructors, built once before flames are loaded.
#[derive(Clone, Debug, Default)]
pub struct VariationRegistry {
    factories: BTreeMap<&'static str, VariationFactory>,
}

impl VariationRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every built-in variation.
    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register(|| Box::new(Linear));
        reg.register(|| Box::new(Sinusoidal));
        reg.register(|| Box::new(Spherical));
        reg.register(|| Box::new(Swirl));
        reg.register(|| Box::new(Julia));
        reg.register(|| Box::new(PreCircleCrop::new()));
        reg.register(|| Box::new(Hexaplay3D::new()));
        reg
    }

    /// Register under the name the variation reports for itself.
    /// A later registration with the same name replaces the earlier one.
    pub fn register(&mut self, factory: VariationFactory) {
        let name = factory().name();
        self.factories.insert(name, factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn create(&self, name: &str) -> FlameResult<Box<dyn Variation>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| FlameError::validation(format!("unknown variation '{name}'")))?;
        Ok(factory())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variation/registry.rs"]
mod tests;
