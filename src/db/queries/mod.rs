//! Database queries

pub mod route;
pub mod stop;
