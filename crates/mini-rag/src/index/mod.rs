//! Vector index lifecycle management

mod manager;

pub use manager::{IndexManager, IndexState};
