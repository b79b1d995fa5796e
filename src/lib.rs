pub mod constant_curve;

pub mod errors;

pub mod util;

pub mod domain;

pub mod poly;

pub mod msm;

pub mod transcript;

pub mod kzg;

pub mod fk20;

pub mod erasure;

pub mod context;

pub use context::KzgContext;
pub use errors::{ErrorKind, KzgError, Result};
