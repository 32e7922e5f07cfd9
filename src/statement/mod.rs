//! Historical statement reconstruction.

mod reconstructor;

pub use reconstructor::Reconstructor;
