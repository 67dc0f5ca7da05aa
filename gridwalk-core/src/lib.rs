pub mod traits;
pub mod error;
pub mod state;
pub mod csr;
pub mod metropolis;
pub mod ensembles;

#[cfg(feature = "rayon")]
pub mod parallel;

pub use error::WalkError;
pub use state::{NodeId, WalkState};
