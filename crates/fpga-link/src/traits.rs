use crate::{LinkInfo, Result};

/// A minimal blocking link to an FPGA board.
pub trait FpgaLink {
    /// Open a board by name (e.g., "mock0", "192.168.2.50").
    fn open(name: &str) -> Result<Self>
    where
        Self: Sized;

    /// Attempt to list boards reachable through this backend.
    fn list() -> Result<Vec<LinkInfo>>;

    /// Send one write block and fill `read` with the block the board returns.
    ///
    /// Both blocks are exchanged whole; a backend must never hand back a partial
    /// read block.
    fn exchange(&mut self, write: &[u8], read: &mut [u8]) -> Result<()>;
}
