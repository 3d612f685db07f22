//! HTTP request handlers.

mod health;
pub mod v1;
mod version;

pub use health::{livez, readyz};
pub use version::version;
