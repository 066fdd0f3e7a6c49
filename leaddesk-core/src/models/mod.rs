//! Domain models

pub mod lead;
pub mod touch;
pub mod user;

pub use lead::*;
pub use touch::*;
pub use user::*;
