pub mod model;
pub mod xform;
