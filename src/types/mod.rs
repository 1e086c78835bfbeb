//! Type definitions

pub mod messages;
pub mod route;
pub mod stop;
pub mod validation;

pub use messages::*;
pub use route::*;
pub use stop::*;
pub use validation::ValidationError;
