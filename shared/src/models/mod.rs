//! Domain records consumed and produced by the analytics engine

mod application;
mod conditions;
mod crop;
mod field;
mod forecast;
mod monitoring;

pub use application::*;
pub use conditions::*;
pub use crop::*;
pub use field::*;
pub use forecast::*;
pub use monitoring::*;
