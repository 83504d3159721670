/// Convenience result type used across flametile.
pub type FlameResult<T> = Result<T, FlameError>;

/// Top-level error taxonomy used by the variation, render, and batch APIs.
#[derive(thiserror::Error, Debug)]
pub enum FlameError {
    /// A parameter name outside a variation's fixed schema was set.
    #[error("invalid parameter '{name}' for variation '{variation}'")]
    InvalidParameter {
        /// Stable name of the variation that rejected the parameter.
        variation: String,
        /// The rejected parameter name, as given by the caller.
        name: String,
    },

    /// A render unit failed while executing.
    #[error("execution error: {0}")]
    Execution(String),

    /// A tile image needed for reassembly was missing or unreadable.
    #[error("reassembly error for '{job}'{}: {message}", fmt_tile(.tile))]
    Reassembly {
        /// Logical job name (the flame file being reassembled).
        job: String,
        /// Tile coordinates `(ix, iy)` involved, if the failure is tile-specific.
        tile: Option<(u8, u8)>,
        /// Human readable cause.
        message: String,
    },

    /// Batch configuration that cannot run at all.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid flame description data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing flame descriptions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_tile(tile: &Option<(u8, u8)>) -> String {
    match *tile {
        Some((ix, iy)) => format!(" tile [{ix}:{iy}]"),
        None => String::new(),
    }
}

impl FlameError {
    /// Build a [`FlameError::InvalidParameter`] value.
    pub fn invalid_parameter(variation: impl Into<String>, name: impl Into<String>) -> Self {
        Self::InvalidParameter {
            variation: variation.into(),
            name: name.into(),
        }
    }

    /// Build a [`FlameError::Execution`] value.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Build a [`FlameError::Reassembly`] value.
    pub fn reassembly(
        job: impl Into<String>,
        tile: Option<(u8, u8)>,
        message: impl Into<String>,
    ) -> Self {
        Self::Reassembly {
            job: job.into(),
            tile,
            message: message.into(),
        }
    }

    /// Build a [`FlameError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`FlameError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlameError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
