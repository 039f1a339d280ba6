mod r#impl;
mod structs;

pub use r#impl::{DEFAULT_ALLOWED_TYPES, DEFAULT_MAX_UPLOAD_SIZE};
pub use structs::*;
