//! Full driver cycles: configure a board, serialise, exchange over the mock link,
//! deserialise.

use fpga_link::{FpgaLink, MockLink};
use toolerator::{ReadFrame, Toolerator, READ_FRAME_SIZE, WRITE_FRAME_SIZE};

fn board(config: [u8; 4]) -> Toolerator {
    let mut cursor: &[u8] = &config;
    Toolerator::from_config(&mut cursor).unwrap()
}

fn frame(tool_number: u8, homed: bool, status: u8) -> Vec<u8> {
    ReadFrame {
        tool_number,
        homed,
        status,
    }
    .to_bytes()
    .to_vec()
}

fn cycle(board: &mut Toolerator, link: &mut MockLink) {
    let mut write = vec![0u8; board.required_write_buffer()];
    let mut read = vec![0u8; board.required_read_buffer()];
    {
        let mut cursor: &mut [u8] = &mut write;
        board.prepare_write(&mut cursor).unwrap();
        assert!(cursor.is_empty());
    }
    link.exchange(&write, &mut read).unwrap();
    let mut cursor: &[u8] = &read;
    board.process_read(&mut cursor).unwrap();
    assert!(cursor.is_empty());
}

#[test]
fn test_tool_change_end_to_end() {
    let mut b = board([1, 6, 0, 0]);
    let mut link = MockLink::open("mock0").unwrap();
    {
        let inst = b.instance_mut(0).unwrap();
        inst.inputs.enable = true;
        inst.inputs.tool_change = true;
        inst.inputs.tool_number = 7;
    }

    link.push_read(frame(1, true, 0x08));
    let before = b.instances()[0].outputs;
    cycle(&mut b, &mut link);

    assert_eq!(link.written()[0], vec![0, 1, 1, 1]);
    let out = b.instances()[0].outputs;
    assert_eq!(out.current_tool, 1);
    assert!(out.homed);
    assert!(out.tool_changed);
    assert_eq!(out.homing, before.homing);
    assert_eq!(out.error, before.error);
}

#[test]
fn test_homing_then_change_sequence() {
    let mut b = board([1, 8, 0, 0]);
    let mut link = MockLink::open("mock0").unwrap();
    {
        let inst = b.instance_mut(0).unwrap();
        inst.inputs.enable = true;
        inst.inputs.tool_change = true;
        inst.inputs.tool_number = 3;
    }

    for status in [0x02u8, 0x03, 0x04, 0x05] {
        link.push_read(frame(0, false, status));
    }
    link.push_read(frame(0, true, 0x06));
    link.push_read(frame(0, true, 0x07));
    link.push_read(frame(3, true, 0x08));

    let mut seen = Vec::new();
    for _ in 0..7 {
        cycle(&mut b, &mut link);
        let out = b.instances()[0].outputs;
        seen.push((out.status, out.homing, out.tool_changed));
    }

    assert_eq!(
        seen,
        vec![
            (0x02, true, false),
            (0x03, true, false),
            (0x04, true, false),
            (0x05, true, false),
            (0x06, true, false),
            (0x07, true, false),
            (0x08, true, true),
        ]
    );

    // The controller drops the request once it sees tool_changed
    b.instance_mut(0).unwrap().inputs.tool_change = false;
    cycle(&mut b, &mut link);
    assert!(!b.instances()[0].outputs.tool_changed);
    assert_eq!(b.instances()[0].outputs.current_tool, 3);
}

#[test]
fn test_held_request_reasserts_every_ready_cycle() {
    let mut b = board([1, 6, 0, 0]);
    let mut link = MockLink::open("mock0").unwrap();
    b.instance_mut(0).unwrap().inputs.tool_change = true;
    link.push_read(frame(2, true, 0x08));
    for _ in 0..3 {
        cycle(&mut b, &mut link);
        assert!(b.instances()[0].outputs.tool_changed);
    }
}

#[test]
fn test_error_survives_later_statuses() {
    let mut b = board([1, 6, 0, 0]);
    let mut link = MockLink::open("mock0").unwrap();
    link.push_read(frame(0, false, 0x02));
    link.push_read(frame(0, false, 0x09));
    for status in [0x01u8, 0x02, 0x05, 0x06, 0x07, 0x08, 0x0F] {
        link.push_read(frame(0, true, status));
    }

    cycle(&mut b, &mut link);
    assert!(!b.instances()[0].outputs.error);
    for _ in 0..8 {
        cycle(&mut b, &mut link);
        assert!(b.instances()[0].outputs.error);
    }
}

#[test]
fn test_unknown_status_is_identity() {
    let mut b = board([1, 6, 0, 0]);
    let mut link = MockLink::open("mock0").unwrap();
    b.instance_mut(0).unwrap().inputs.tool_change = true;
    link.push_read(frame(0, true, 0x02));
    link.push_read(frame(0, true, 0x09));
    link.push_read(frame(0, true, 0x01));
    cycle(&mut b, &mut link);
    cycle(&mut b, &mut link);

    let before = b.instances()[0].outputs;
    cycle(&mut b, &mut link);
    let after = b.instances()[0].outputs;
    assert_eq!(
        (after.homing, after.tool_changed, after.error),
        (before.homing, before.tool_changed, before.error)
    );
    assert_eq!(after.status, 0x01);
}

#[test]
fn test_three_instance_block_sizes() {
    let mut b = board([3, 6, 8, 12]);
    let mut link = MockLink::open("mock0").unwrap();
    assert_eq!(b.required_write_buffer(), 3 * WRITE_FRAME_SIZE);
    assert_eq!(b.required_read_buffer(), 3 * READ_FRAME_SIZE);

    let mut block = frame(1, true, 0x08);
    block.extend(frame(2, true, 0x06));
    block.extend(frame(3, false, 0x09));
    link.push_read(block);
    cycle(&mut b, &mut link);

    let tools: Vec<u8> = b.instances().iter().map(|i| i.outputs.current_tool).collect();
    assert_eq!(tools, vec![1, 2, 3]);
    assert_eq!(link.written()[0].len(), 12);
}
