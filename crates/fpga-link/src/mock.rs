use crate::{FpgaLink, LinkError, LinkInfo, Result};
use std::collections::VecDeque;

/// In-process mock board. Each link is independent.
///
/// Read blocks are served from a script; once the script runs dry the last block is
/// repeated so a device can be held in its final state. Every write block is kept for
/// inspection.
pub struct MockLink {
    name: String,
    script: VecDeque<Vec<u8>>,
    last_read: Option<Vec<u8>>,
    written: Vec<Vec<u8>>,
}

impl MockLink {
    /// Queue one read block to be returned by a future `exchange`.
    pub fn push_read(&mut self, block: Vec<u8>) {
        self.script.push_back(block);
    }

    /// Write blocks received so far, oldest first.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FpgaLink for MockLink {
    fn open(name: &str) -> Result<Self> {
        if !Self::list()?.iter().any(|b| b.name == name) {
            return Err(LinkError::BoardNotFound(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            script: VecDeque::new(),
            last_read: None,
            written: Vec::new(),
        })
    }

    fn list() -> Result<Vec<LinkInfo>> {
        Ok(vec![LinkInfo {
            name: "mock0".to_string(),
            driver: "mock".to_string(),
        }])
    }

    fn exchange(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.written.push(write.to_vec());

        if let Some(next) = self.script.pop_front() {
            self.last_read = Some(next);
        }
        match &self.last_read {
            Some(block) => {
                if block.len() != read.len() {
                    return Err(LinkError::BlockSize {
                        expected: read.len(),
                        actual: block.len(),
                    });
                }
                read.copy_from_slice(block);
            }
            // Nothing scripted yet: an idle board reports all zeroes
            None => read.fill(0),
        }
        tracing::trace!(board = %self.name, tx = write.len(), rx = read.len(), "mock exchange");
        Ok(())
    }
}
