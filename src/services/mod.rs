//! Business logic services

pub mod geo;
pub mod planner;
pub mod proximity;
pub mod route_lock;
pub mod sequencer;
pub mod store;
