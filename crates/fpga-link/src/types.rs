/// Sizes of the three shared blocks a board needs, in bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BlockSizes {
    pub config: usize,
    pub write: usize,
    pub read: usize,
}

impl BlockSizes {
    pub fn new(config: usize, write: usize, read: usize) -> Self {
        Self {
            config,
            write,
            read,
        }
    }

    /// Accumulate the sizes of another module sharing the same board.
    pub fn add(&mut self, other: BlockSizes) {
        self.config += other.config;
        self.write += other.write;
        self.read += other.read;
    }
}

#[derive(Clone, Debug)]
pub struct LinkInfo {
    pub name: String,
    pub driver: String,
}
