mod body;
mod build;
mod client;

pub use body::BodyError;
pub use build::BuildError;
pub use client::{ClientError, ClientResult};
