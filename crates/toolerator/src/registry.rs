use fpga_link::BlockSizes;
use tracing::info;

use crate::types::{
    ToolchangerInstance, CONFIG_RECORD_SIZE, CONFIG_STRIDE, MAX_INSTANCES_PER_BOARD,
    READ_FRAME_SIZE, WRITE_FRAME_SIZE,
};
use crate::{Error, Result};

/// All toolerator instances on one board, in configuration order.
///
/// The order is the order of the frames on the wire and never changes after the
/// board has been configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolerator {
    instances: Vec<ToolchangerInstance>,
}

impl Toolerator {
    /// Build the board from its config block and advance `config` past it.
    ///
    /// The block is `[count][tool_count_0]..[tool_count_{count-1}]`, padded to
    /// [`CONFIG_STRIDE`] bytes. The cursor always moves by the full stride.
    pub fn from_config(config: &mut &[u8]) -> Result<Self> {
        let block = config.get(..CONFIG_STRIDE).ok_or(Error::ConfigTruncated {
            expected: CONFIG_STRIDE,
            actual: config.len(),
        })?;

        let count = usize::from(block[0]);
        if count > MAX_INSTANCES_PER_BOARD {
            return Err(Error::TooManyInstances {
                count,
                max: MAX_INSTANCES_PER_BOARD,
            });
        }

        let mut instances = Vec::new();
        instances
            .try_reserve_exact(count)
            .map_err(|_| Error::OutOfMemory(count))?;
        for (index, &tool_count) in block[1..=count].iter().enumerate() {
            if tool_count == 0 {
                return Err(Error::ZeroToolCount { index });
            }
            instances.push(ToolchangerInstance::new(tool_count));
        }

        *config = &config[CONFIG_STRIDE..];
        info!(instances = count, "toolerator configured");
        Ok(Self { instances })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[ToolchangerInstance] {
        &self.instances
    }

    /// Mutable access to the instances, for setting inputs between cycles.
    /// The slice cannot grow or shrink, so the wire layout is fixed.
    pub fn instances_mut(&mut self) -> &mut [ToolchangerInstance] {
        &mut self.instances
    }

    pub fn instance(&self, index: usize) -> Result<&ToolchangerInstance> {
        self.instances.get(index).ok_or(Error::NoSuchInstance(index))
    }

    pub fn instance_mut(&mut self, index: usize) -> Result<&mut ToolchangerInstance> {
        self.instances
            .get_mut(index)
            .ok_or(Error::NoSuchInstance(index))
    }

    /// Clear the latched error of one instance.
    pub fn reset_error(&mut self, index: usize) -> Result<()> {
        self.instance_mut(index)?.reset_error();
        Ok(())
    }

    pub fn required_config_buffer(&self) -> usize {
        if self.instances.is_empty() {
            return 0;
        }
        CONFIG_RECORD_SIZE
    }

    pub fn required_write_buffer(&self) -> usize {
        self.instances.len() * WRITE_FRAME_SIZE
    }

    pub fn required_read_buffer(&self) -> usize {
        self.instances.len() * READ_FRAME_SIZE
    }

    pub fn block_sizes(&self) -> BlockSizes {
        BlockSizes::new(
            self.required_config_buffer(),
            self.required_write_buffer(),
            self.required_read_buffer(),
        )
    }
}

/// Boards initialised in this session, in the order they were configured.
#[derive(Debug, Default)]
pub struct BoardRegistry {
    boards: Vec<Toolerator>,
}

impl BoardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a new board from `config` and return its index.
    pub fn configure_board(&mut self, config: &mut &[u8]) -> Result<usize> {
        let board = Toolerator::from_config(config)?;
        self.boards.push(board);
        Ok(self.boards.len() - 1)
    }

    pub fn insert(&mut self, board: Toolerator) -> usize {
        self.boards.push(board);
        self.boards.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Toolerator> {
        self.boards.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Toolerator> {
        self.boards.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toolerator> {
        self.boards.iter()
    }
}
