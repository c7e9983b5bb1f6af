mod validate;

pub use validate::{FaceViolation, ValidateFaces};
