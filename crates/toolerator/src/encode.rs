use tracing::debug;

use crate::types::{ToolchangerInstance, WRITE_FRAME_SIZE};
use crate::{Error, Result, Toolerator};

/// Write frame for one instance: `[padding][enable][tool_change][tool_number]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteFrame {
    pub enable: bool,
    pub tool_change: bool,
    pub tool_number: u8,
}

impl WriteFrame {
    pub fn to_bytes(self) -> [u8; WRITE_FRAME_SIZE] {
        [
            0,
            u8::from(self.enable),
            u8::from(self.tool_change),
            self.tool_number,
        ]
    }
}

impl ToolchangerInstance {
    /// Frame carrying the current inputs. The requested tool wraps around the
    /// turret, so tool `tool_count` is sent as tool 0.
    pub fn write_frame(&self) -> WriteFrame {
        let wrapped = self.inputs.tool_number % u32::from(self.tool_count());
        WriteFrame {
            enable: self.inputs.enable,
            tool_change: self.inputs.tool_change,
            // Lossless: the remainder is below tool_count, itself a u8
            tool_number: wrapped as u8,
        }
    }
}

impl Toolerator {
    /// Settings written during the configure cycle. The toolerator has none; the
    /// cursor only moves by the declared config size.
    pub fn configure(&self, data: &mut &mut [u8]) -> Result<()> {
        let required = self.required_config_buffer();
        let buf = take_block(data, required, "config")?;
        buf.fill(0);
        Ok(())
    }

    /// Serialise the write frames of all instances, in configuration order, and
    /// advance `data` by exactly [`Toolerator::required_write_buffer`] bytes.
    pub fn prepare_write(&self, data: &mut &mut [u8]) -> Result<()> {
        let required = self.required_write_buffer();
        let block = take_block(data, required, "write")?;

        for (instance, chunk) in self
            .instances()
            .iter()
            .zip(block.chunks_exact_mut(WRITE_FRAME_SIZE))
        {
            chunk.copy_from_slice(&instance.write_frame().to_bytes());
        }
        debug!(bytes = required, "toolerator write block prepared");
        Ok(())
    }
}

/// Split `required` bytes off the front of `data`, leaving the cursor after them.
fn take_block<'a>(
    data: &mut &'a mut [u8],
    required: usize,
    block: &'static str,
) -> Result<&'a mut [u8]> {
    if data.len() < required {
        return Err(Error::BufferTooSmall {
            block,
            expected: required,
            actual: data.len(),
        });
    }
    let (head, tail) = std::mem::take(data).split_at_mut(required);
    *data = tail;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(config: [u8; 4]) -> Toolerator {
        let mut cursor: &[u8] = &config;
        Toolerator::from_config(&mut cursor).unwrap()
    }

    #[test]
    fn test_frame_layout() {
        let frame = WriteFrame {
            enable: true,
            tool_change: false,
            tool_number: 5,
        };
        assert_eq!(frame.to_bytes(), [0, 1, 0, 5]);
    }

    #[test]
    fn test_tool_number_wraps() {
        let mut b = board([1, 6, 0, 0]);
        let inst = b.instance_mut(0).unwrap();
        for (requested, expected) in [(0u32, 0u8), (5, 5), (6, 0), (7, 1), (u32::MAX, 3)] {
            inst.inputs.tool_number = requested;
            assert_eq!(inst.write_frame().tool_number, expected, "request {requested}");
        }
    }

    #[test]
    fn test_prepare_write_in_configuration_order() {
        let mut b = board([2, 6, 8, 0]);
        {
            let inst = b.instance_mut(0).unwrap();
            inst.inputs.enable = true;
            inst.inputs.tool_number = 7;
        }
        {
            let inst = b.instance_mut(1).unwrap();
            inst.inputs.tool_change = true;
            inst.inputs.tool_number = 3;
        }

        let mut buf = [0xEEu8; 10];
        let mut cursor: &mut [u8] = &mut buf;
        b.prepare_write(&mut cursor).unwrap();
        assert_eq!(cursor.len(), 2);
        assert_eq!(&buf[..8], &[0, 1, 0, 1, 0, 0, 1, 3]);
        assert_eq!(&buf[8..], &[0xEE, 0xEE]);
    }

    #[test]
    fn test_prepare_write_leaves_inputs_alone() {
        let mut b = board([1, 6, 0, 0]);
        b.instance_mut(0).unwrap().inputs.tool_number = 13;
        let before = b.clone();
        let mut buf = [0u8; 4];
        let mut cursor: &mut [u8] = &mut buf;
        b.prepare_write(&mut cursor).unwrap();
        assert_eq!(b, before);
        assert_eq!(buf[3], 1);
    }

    #[test]
    fn test_prepare_write_rejects_short_buffer() {
        let b = board([2, 6, 6, 0]);
        let mut buf = [0u8; 7];
        let mut cursor: &mut [u8] = &mut buf;
        let err = b.prepare_write(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                block: "write",
                expected: 8,
                actual: 7
            }
        ));
        assert_eq!(cursor.len(), 7);
    }

    #[test]
    fn test_configure_moves_by_declared_size() {
        let b = board([1, 6, 0, 0]);
        let mut buf = [0xAAu8; 4];
        let mut cursor: &mut [u8] = &mut buf;
        b.configure(&mut cursor).unwrap();
        assert_eq!(cursor.len(), 4 - b.required_config_buffer());
    }
}
