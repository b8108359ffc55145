//! fpga-link: moving packed data blocks between the host and an FPGA board
//!
//! A driver cycle produces one write block (the concatenated write frames of every
//! module on the board) and expects one read block back. This crate provides the
//! trait for that exchange, with feature-gated backends. The default build enables a
//! `mock` backend so binaries and tests run without a board attached.

mod types;
pub use types::{BlockSizes, LinkInfo};

mod error;
pub use error::{LinkError, Result};

mod traits;
pub use traits::FpgaLink;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockLink;
