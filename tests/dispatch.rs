//! End-to-end request dispatch over in-memory streams

mod common;

use common::*;
use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use xdispatch::protocol::*;
use xdispatch::resources::gc::gc_mask;
use xdispatch::resources::GcValues;
use xdispatch::server::{listener, DispatchError, Server, ServerConfig};

const GC: u32 = 0x0020_0001;
const GC2: u32 = 0x0020_0002;
const PIXMAP: u32 = 0x0020_0010;

fn error(frame: &[u8]) -> X11Error {
    X11Error::parse(frame, ByteOrder::LSBFirst).expect("error frame")
}

fn gc_values(h: &Harness, id: u32) -> GcValues {
    h.server
        .graphics_contexts()
        .get_graphics_context(XID::new(id))
        .expect("gc exists")
        .values()
}

#[test]
fn test_create_gc_then_lookup() {
    let h = Harness::new();
    h.run(&[create_gc(GC, ROOT, 0, &[])]);

    assert!(h.frames().is_empty());
    assert_eq!(gc_values(&h, GC), GcValues::default());
    assert_eq!(h.client.sequence_number(), 1);
}

#[test]
fn test_create_gc_with_values() {
    let h = Harness::new();
    h.run(&[create_gc(
        GC,
        ROOT,
        gc_mask::FUNCTION | gc_mask::BACKGROUND | gc_mask::ARC_MODE,
        &[6, 0x0012_3456, 0],
    )]);

    let values = gc_values(&h, GC);
    assert_eq!(values.function, GCFunction::Xor);
    assert_eq!(values.background, 0x0012_3456);
    assert_eq!(values.arc_mode, ArcMode::Chord);
    assert_eq!(values.foreground, 0);
}

#[test]
fn test_create_gc_duplicate_id() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, gc_mask::FOREGROUND, &[7]),
        create_gc(GC, ROOT, gc_mask::FOREGROUND, &[9]),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    let err = error(&frames[0]);
    assert_eq!(err.code, ErrorCode::IDChoice);
    assert_eq!(err.bad_value, GC);
    assert_eq!(err.sequence, 2);
    assert_eq!(err.major_opcode, 55);
    assert_eq!(err.minor_opcode, 0);

    assert_eq!(gc_values(&h, GC).foreground, 7);
    assert_eq!(h.server.graphics_contexts().len(), 1);
}

#[test]
fn test_create_gc_id_outside_client_range() {
    let h = Harness::new();
    h.run(&[create_gc(0x0040_0001, ROOT, 0, &[])]);

    let err = error(&h.frames()[0]);
    assert_eq!(err.code, ErrorCode::IDChoice);
    assert_eq!(err.bad_value, 0x0040_0001);
    assert!(h.server.graphics_contexts().is_empty());
}

#[test]
fn test_create_gc_id_taken_by_other_resource() {
    let h = Harness::new();
    h.run(&[
        create_pixmap(24, PIXMAP, ROOT, 8, 8),
        create_gc(PIXMAP, ROOT, 0, &[]),
    ]);

    let err = error(&h.frames()[0]);
    assert_eq!(err.code, ErrorCode::IDChoice);
    assert_eq!(err.bad_value, PIXMAP);
    assert!(h.server.graphics_contexts().is_empty());
}

#[test]
fn test_create_gc_missing_drawable() {
    let h = Harness::new();
    h.run(&[create_gc(GC, 0x0000_0999, gc_mask::FOREGROUND, &[1])]);

    let err = error(&h.frames()[0]);
    assert_eq!(err.code, ErrorCode::Drawable);
    assert_eq!(err.bad_value, 0x0000_0999);
    assert!(h.server.graphics_contexts().is_empty());

    // The id was never taken, so a retry works.
    h.run(&[create_gc(GC, ROOT, 0, &[])]);
    assert!(h.frames().is_empty());
}

#[test]
fn test_create_gc_bad_value_creates_nothing() {
    let h = Harness::new();
    h.run(&[create_gc(GC, ROOT, gc_mask::LINE_STYLE, &[3])]);

    let err = error(&h.frames()[0]);
    assert_eq!(err.code, ErrorCode::Value);
    assert_eq!(err.bad_value, 3);
    assert!(h.server.graphics_contexts().is_empty());
}

#[test]
fn test_change_gc_foreground_and_line_width() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, 0, &[]),
        change_gc(GC, gc_mask::FOREGROUND | gc_mask::LINE_WIDTH, &[0x00ff_00ff, 4]),
    ]);

    assert!(h.frames().is_empty());
    let expected = GcValues {
        foreground: 0x00ff_00ff,
        line_width: 4,
        ..GcValues::default()
    };
    assert_eq!(gc_values(&h, GC), expected);
}

#[test]
fn test_change_gc_ignores_bits_past_table() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, 0, &[]),
        change_gc(GC, gc_mask::FOREGROUND | 1 << 23 | 1 << 31, &[5]),
    ]);

    assert!(h.frames().is_empty());
    assert_eq!(gc_values(&h, GC).foreground, 5);
}

#[test]
fn test_change_gc_unknown_gc_keeps_connection() {
    let h = Harness::new();
    h.run(&[
        change_gc(GC, gc_mask::FOREGROUND, &[1]),
        create_gc(GC, ROOT, 0, &[]),
        change_gc(GC, gc_mask::FOREGROUND, &[2]),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    let err = error(&frames[0]);
    assert_eq!(err.code, ErrorCode::GContext);
    assert_eq!(err.bad_value, GC);
    assert_eq!(err.sequence, 1);
    assert_eq!(err.major_opcode, 56);
    assert_eq!(gc_values(&h, GC).foreground, 2);
    assert_eq!(h.client.sequence_number(), 3);
}

#[test]
fn test_change_gc_short_value_list() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, 0, &[]),
        change_gc(GC, gc_mask::FOREGROUND | gc_mask::BACKGROUND, &[0x11]),
    ]);

    let err = error(&h.frames()[0]);
    assert_eq!(err.code, ErrorCode::Length);
    assert_eq!(gc_values(&h, GC), GcValues::default());
}

#[test]
fn test_change_gc_zero_mask_still_checks_gc() {
    let h = Harness::new();
    h.run(&[change_gc(GC, 0, &[])]);

    assert_eq!(error(&h.frames()[0]).code, ErrorCode::GContext);
}

#[test]
fn test_copy_gc_masked() {
    let h = Harness::new();
    h.run(&[
        create_gc(
            GC,
            ROOT,
            gc_mask::FOREGROUND | gc_mask::BACKGROUND | gc_mask::LINE_WIDTH,
            &[0xaa, 0xbb, 3],
        ),
        create_gc(GC2, ROOT, gc_mask::LINE_WIDTH, &[9]),
        copy_gc(GC, GC2, gc_mask::FOREGROUND | gc_mask::BACKGROUND),
    ]);

    assert!(h.frames().is_empty());
    let copied = gc_values(&h, GC2);
    assert_eq!(copied.foreground, 0xaa);
    assert_eq!(copied.background, 0xbb);
    assert_eq!(copied.line_width, 9);
}

#[test]
fn test_copy_gc_zero_mask_changes_nothing() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, gc_mask::FOREGROUND, &[0xaa]),
        create_gc(GC2, ROOT, 0, &[]),
        copy_gc(GC, GC2, 0),
    ]);

    assert!(h.frames().is_empty());
    assert_eq!(gc_values(&h, GC2), GcValues::default());
}

#[test]
fn test_copy_gc_reports_missing_side() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, 0, &[]),
        copy_gc(GC, GC2, gc_mask::FOREGROUND),
        copy_gc(0x0020_0099, GC, gc_mask::FOREGROUND),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(error(&frames[0]).bad_value, GC2);
    assert_eq!(error(&frames[1]).bad_value, 0x0020_0099);
    assert_eq!(error(&frames[1]).sequence, 3);
}

#[test]
fn test_set_dashes() {
    let h = Harness::new();
    let mut payload = words(&[GC]);
    payload.extend_from_slice(&5u16.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes());
    payload.extend_from_slice(&[2, 4, 6]);

    let mut empty = words(&[GC]);
    empty.extend_from_slice(&[0, 0, 0, 0]);

    h.run(&[
        create_gc(GC, ROOT, 0, &[]),
        request(58, 0, &payload),
        request(58, 0, &empty),
    ]);

    let values = gc_values(&h, GC);
    assert_eq!(values.dash_offset, 5);
    assert_eq!(values.dashes, vec![2, 4, 6]);
    assert_eq!(error(&h.frames()[0]).code, ErrorCode::Value);
}

#[test]
fn test_free_gc_is_idempotent() {
    let h = Harness::new();
    h.run(&[
        create_gc(GC, ROOT, 0, &[]),
        create_gc(GC2, ROOT, 0, &[]),
        free_gc(0x0020_0050),
        free_gc(GC),
        free_gc(GC),
    ]);

    assert!(h.frames().is_empty());
    assert_eq!(h.server.graphics_contexts().len(), 1);
    assert!(h
        .server
        .graphics_contexts()
        .get_graphics_context(XID::new(GC))
        .is_none());

    // The freed id can be used again.
    h.run(&[create_gc(GC, ROOT, 0, &[])]);
    assert!(h.frames().is_empty());
}

#[test]
fn test_pixmap_lifecycle() {
    let h = Harness::new();
    h.run(&[
        create_pixmap(24, PIXMAP, ROOT, 16, 16),
        create_gc(GC, PIXMAP, 0, &[]),
        free_pixmap(PIXMAP),
        free_pixmap(PIXMAP),
        free_pixmap(ROOT),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    let err = error(&frames[0]);
    assert_eq!(err.code, ErrorCode::Pixmap);
    assert_eq!(err.bad_value, ROOT);

    let gc = h
        .server
        .graphics_contexts()
        .get_graphics_context(XID::new(GC))
        .unwrap();
    assert_eq!(gc.drawable(), Drawable::Pixmap(Pixmap::new(PIXMAP)));
    assert!(h.server.drawables().get_drawable(XID::new(PIXMAP)).is_none());
}

#[test]
fn test_create_pixmap_validation() {
    let h = Harness::new();
    h.run(&[
        create_pixmap(24, PIXMAP, 0x0000_0999, 8, 8),
        create_pixmap(24, PIXMAP, ROOT, 0, 8),
        create_pixmap(7, PIXMAP, ROOT, 8, 8),
        create_pixmap(1, PIXMAP, ROOT, 8, 8),
    ]);

    let codes: Vec<ErrorCode> = h.frames().iter().map(|f| error(f).code).collect();
    assert_eq!(codes, vec![ErrorCode::Drawable, ErrorCode::Value, ErrorCode::Value]);
    assert_eq!(
        h.server.drawables().get_drawable(XID::new(PIXMAP)).unwrap().depth,
        1
    );
}

#[test]
fn test_unknown_opcode_is_request_error() {
    let h = Harness::new();
    h.run(&[request(1, 0, &[0; 28]), no_operation()]);

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    let err = error(&frames[0]);
    assert_eq!(err.code, ErrorCode::Request);
    assert_eq!(err.major_opcode, 1);
    assert_eq!(err.sequence, 1);
    assert_eq!(h.client.sequence_number(), 2);
}

#[test]
fn test_zero_length_request_is_fatal() {
    let h = Harness::new();
    let mut bytes = no_operation();
    bytes.extend_from_slice(&[127, 0, 0, 0]);
    bytes.extend(no_operation());

    let result = h.send(&bytes);
    assert!(matches!(result, Err(DispatchError::Framing(_))));
    assert!(h.output.is_empty());
    assert_eq!(h.client.sequence_number(), 1);
}

#[test]
fn test_truncated_request_is_fatal() {
    let h = Harness::new();
    let mut bytes = create_gc(GC, ROOT, 0, &[]);
    bytes.truncate(10);

    let result = h.send(&bytes);
    assert!(matches!(result, Err(DispatchError::Framing(_))));
    assert!(h.server.graphics_contexts().is_empty());
    assert_eq!(h.client.sequence_number(), 0);
}

#[test]
fn test_intern_atom_and_get_name() {
    let h = Harness::new();
    h.run(&[
        named(16, 0, "WM_NAME"),
        named(16, 1, "_NET_MISSING"),
        named(16, 0, "_NET_WM_PID"),
        request(17, 0, &words(&[69])),
        request(17, 0, &words(&[500])),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 5);
    let atom = |frame: &[u8]| u32::from_le_bytes([frame[8], frame[9], frame[10], frame[11]]);

    assert_eq!(frames[0][0], 1);
    assert_eq!(&frames[0][2..4], &[1, 0]);
    assert_eq!(atom(&frames[0]), 39);
    assert_eq!(atom(&frames[1]), 0);
    assert_eq!(atom(&frames[2]), 69);

    let name = &frames[3];
    assert_eq!(u16::from_le_bytes([name[8], name[9]]), 11);
    assert_eq!(&name[32..43], b"_NET_WM_PID");
    assert_eq!(&name[2..4], &[4, 0]);

    let err = error(&frames[4]);
    assert_eq!(err.code, ErrorCode::Atom);
    assert_eq!(err.bad_value, 500);
}

#[test]
fn test_atom_names_are_raw_bytes() {
    let h = Harness::new();
    h.run(&[
        named_bytes(16, 0, b"caf\xe9"),
        named_bytes(16, 0, b"caf\xe8"),
        request(17, 0, &words(&[69])),
        request(17, 0, &words(&[70])),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 4);
    let atom = |frame: &[u8]| u32::from_le_bytes([frame[8], frame[9], frame[10], frame[11]]);
    assert_eq!(atom(&frames[0]), 69);
    assert_eq!(atom(&frames[1]), 70);

    for (frame, name) in frames[2..].iter().zip([b"caf\xe9", b"caf\xe8"]) {
        assert_eq!(frame.len(), 36);
        assert_eq!(u16::from_le_bytes([frame[8], frame[9]]), 4);
        assert_eq!(&frame[32..36], name);
    }
}

#[test]
fn test_query_extension_not_present() {
    let h = Harness::new();
    h.run(&[named(98, 0, "RENDER")]);

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0][0], 1);
    assert_eq!(frames[0][8], 0);
}

#[test]
fn test_get_keyboard_mapping() {
    let h = Harness::new();
    h.run(&[
        request(101, 0, &[38, 3, 0, 0]),
        request(101, 0, &[8, 248, 0, 0]),
        request(101, 0, &[7, 1, 0, 0]),
        request(101, 0, &[250, 10, 0, 0]),
    ]);

    let frames = h.frames();
    assert_eq!(frames.len(), 4);

    let letters = &frames[0];
    assert_eq!(letters[0], 1);
    assert_eq!(letters[1], 2);
    assert_eq!(&letters[2..4], &[1, 0]);
    assert_eq!(u32::from_le_bytes([letters[4], letters[5], letters[6], letters[7]]), 6);
    assert_eq!(letters.len(), 32 + 6 * 4);
    let asd: Vec<u32> = b"aAsSdD".iter().map(|&c| c as u32).collect();
    assert_eq!(&letters[32..56], &words(&asd)[..]);

    let full = &frames[1];
    assert_eq!(u32::from_le_bytes([full[4], full[5], full[6], full[7]]), 496);
    assert_eq!(full.len(), 32 + 496 * 4);

    let below = error(&frames[2]);
    assert_eq!(below.code, ErrorCode::Value);
    assert_eq!(below.bad_value, 7);
    assert_eq!(below.major_opcode, 101);

    let past = error(&frames[3]);
    assert_eq!(past.code, ErrorCode::Value);
    assert_eq!(past.sequence, 4);
}

#[test]
fn test_get_modifier_mapping() {
    let h = Harness::new();
    h.run(&[request(119, 0, &[])]);

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    let reply = &frames[0];
    assert_eq!(reply[0], 1);
    assert_eq!(reply[1], 2);
    assert_eq!(u32::from_le_bytes([reply[4], reply[5], reply[6], reply[7]]), 4);
    assert_eq!(reply.len(), 48);
    // Shift row, then Lock, then Control
    assert_eq!(&reply[32..38], &[50, 62, 66, 0, 37, 105]);
}

#[test]
fn test_big_endian_client() {
    let h = Harness::with_byte_order(ByteOrder::MSBFirst);
    let be = |values: &[u32]| -> Vec<u8> { values.iter().flat_map(|v| v.to_be_bytes()).collect() };

    h.send(
        &[
            request_in(
                ByteOrder::MSBFirst,
                55,
                0,
                &be(&[GC, ROOT, gc_mask::FOREGROUND, 0x0102_0304]),
            ),
            request_in(ByteOrder::MSBFirst, 60, 0, &be(&[GC2 + 0x0020_0000])),
            request_in(ByteOrder::MSBFirst, 56, 0, &be(&[GC2, 0])),
        ]
        .concat(),
    )
    .unwrap();

    assert_eq!(gc_values(&h, GC).foreground, 0x0102_0304);
    let frames = split_frames(&h.output.take(), ByteOrder::MSBFirst);
    let err = X11Error::parse(&frames[0], ByteOrder::MSBFirst).unwrap();
    assert_eq!(err.code, ErrorCode::GContext);
    assert_eq!(err.sequence, 3);
    assert_eq!(err.bad_value, GC2);
}

#[test]
fn test_event_uses_sequence_at_send_time() {
    let h = Harness::new();
    h.run(&[no_operation(), no_operation(), no_operation()]);

    let base = EventBase::new(Window::new(ROOT), Window::new(ROOT), Window::NONE)
        .at(Point::new(10, 20), Point::new(10, 20))
        .with_state(Bitmask::new(modifier_mask::SHIFT));
    assert!(h
        .server
        .send_event(h.client.client_id, &Event::key_press(Keycode::new(38), base))
        .unwrap());
    assert!(!h.server.send_event(99, &Event::key_press(Keycode::new(38), base)).unwrap());

    let frames = h.frames();
    assert_eq!(frames.len(), 1);
    let frame: &[u8; EVENT_FRAME_SIZE] = frames[0].as_slice().try_into().unwrap();
    let (sequence, event) = InputEvent::parse(frame, ByteOrder::LSBFirst).unwrap();
    assert_eq!(sequence, 3);
    assert_eq!(event.kind, InputKind::KeyPress(Keycode::new(38)));
    assert_eq!(event.base.root_pos, Point::new(10, 20));
}

#[test]
fn test_handshake_and_teardown() {
    let server = Server::new(ServerConfig::default());
    let output = SharedBuffer::default();

    let mut input = vec![b'l', 0, 11, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    input.extend(create_gc(GC, ROOT, 0, &[]));
    input.extend(create_pixmap(24, PIXMAP, ROOT, 4, 4));

    listener::handle_connection(&server, Cursor::new(input), Box::new(output.clone())).unwrap();

    let bytes = output.take();
    assert_eq!(bytes[0], 1);
    assert_eq!(&bytes[12..16], &0x0020_0000u32.to_le_bytes());
    let setup_len = 8 + u16::from_le_bytes([bytes[6], bytes[7]]) as usize * 4;
    assert_eq!(bytes.len(), setup_len);

    assert_eq!(server.client_count(), 0);
    assert!(server.graphics_contexts().is_empty());
    assert!(server.drawables().get_drawable(XID::new(PIXMAP)).is_none());
}

#[test]
fn test_handshake_rejects_wrong_version() {
    let server = Server::new(ServerConfig::default());
    let output = SharedBuffer::default();
    let input = vec![b'B', 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0];

    listener::handle_connection(&server, Cursor::new(input), Box::new(output.clone())).unwrap();

    let bytes = output.take();
    assert_eq!(bytes[0], 0);
    assert_eq!(server.client_count(), 0);
}

#[test]
fn test_clients_create_concurrently() {
    let server = Arc::new(Server::new(ServerConfig::default()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let server = Arc::clone(&server);
            thread::spawn(move || {
                let output = SharedBuffer::default();
                let client = server
                    .connect_client(ByteOrder::LSBFirst, Box::new(output.clone()))
                    .unwrap();
                let base = client.id_range().base;
                let requests: Vec<u8> = (1..=50)
                    .flat_map(|n| create_gc(base | n, ROOT, gc_mask::FOREGROUND, &[n]))
                    .collect();
                server.serve(&client, &mut Cursor::new(requests)).unwrap();
                assert!(output.is_empty());
                client
            })
        })
        .collect();

    let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(server.graphics_contexts().len(), 200);
    for client in &clients {
        let gc = server
            .graphics_contexts()
            .get_graphics_context(XID::new(client.id_range().base | 7))
            .unwrap();
        assert_eq!(gc.values().foreground, 7);
    }

    for client in &clients {
        server.disconnect_client(client);
    }
    assert!(server.graphics_contexts().is_empty());
}

#[test]
fn test_same_id_race_has_one_winner() {
    for _ in 0..20 {
        let server = Arc::new(Server::new(ServerConfig::default()));
        let root = server.drawables().get_drawable(XID::new(ROOT)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|owner| {
                let server = Arc::clone(&server);
                let root = Arc::clone(&root);
                thread::spawn(move || {
                    server
                        .graphics_contexts()
                        .create_graphics_context(owner, XID::new(GC), &root)
                        .is_some()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(server.graphics_contexts().len(), 1);
    }
}
