//! X11 protocol events
//!
//! Events are sent from the server to clients to notify them of user input.
//! Every event is a 32-byte frame; the sequence number in bytes 2..4 is only
//! filled in when the frame is written to a client.

use super::bitmask::Bitmask;
use super::types::*;

/// Size of every event frame on the wire
pub const EVENT_FRAME_SIZE: usize = 32;

/// Event type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EventType {
    KeyPress = 2,
    KeyRelease = 3,
    ButtonPress = 4,
    ButtonRelease = 5,
    MotionNotify = 6,
    EnterNotify = 7,
    LeaveNotify = 8,
}

impl EventType {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            2 => Some(EventType::KeyPress),
            3 => Some(EventType::KeyRelease),
            4 => Some(EventType::ButtonPress),
            5 => Some(EventType::ButtonRelease),
            6 => Some(EventType::MotionNotify),
            7 => Some(EventType::EnterNotify),
            8 => Some(EventType::LeaveNotify),
            _ => None,
        }
    }
}

/// Detail of a pointer crossing event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDetail {
    Ancestor = 0,
    Virtual = 1,
    Inferior = 2,
    Nonlinear = 3,
    NonlinearVirtual = 4,
}

impl CrossingDetail {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CrossingDetail::Ancestor),
            1 => Some(CrossingDetail::Virtual),
            2 => Some(CrossingDetail::Inferior),
            3 => Some(CrossingDetail::Nonlinear),
            4 => Some(CrossingDetail::NonlinearVirtual),
            _ => None,
        }
    }
}

/// Mode of a pointer crossing event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingMode {
    Normal = 0,
    Grab = 1,
    Ungrab = 2,
}

impl CrossingMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CrossingMode::Normal),
            1 => Some(CrossingMode::Grab),
            2 => Some(CrossingMode::Ungrab),
            _ => None,
        }
    }
}

/// Fields shared by every pointer and keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBase {
    pub time: Timestamp,
    pub root: Window,
    pub event: Window,
    pub child: Window,
    pub root_pos: Point,
    pub event_pos: Point,
    /// Modifier and button state (low 16 bits go on the wire)
    pub state: Bitmask,
    pub same_screen: bool,
}

impl EventBase {
    pub fn new(root: Window, event: Window, child: Window) -> Self {
        EventBase {
            time: Timestamp::CURRENT_TIME,
            root,
            event,
            child,
            root_pos: Point::default(),
            event_pos: Point::default(),
            state: Bitmask::EMPTY,
            same_screen: true,
        }
    }

    pub fn at(mut self, root_pos: Point, event_pos: Point) -> Self {
        self.root_pos = root_pos;
        self.event_pos = event_pos;
        self
    }

    pub fn with_state(mut self, state: Bitmask) -> Self {
        self.state = state;
        self
    }

    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }
}

/// Extension carried by EnterNotify and LeaveNotify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub detail: CrossingDetail,
    pub mode: CrossingMode,
    pub focus: bool,
}

/// Kind-specific part of an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    KeyPress(Keycode),
    KeyRelease(Keycode),
    ButtonPress(Button),
    ButtonRelease(Button),
    MotionNotify { is_hint: bool },
    EnterNotify(Crossing),
    LeaveNotify(Crossing),
}

/// A structured pointer or keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub base: EventBase,
    pub kind: InputKind,
}

/// A pre-encoded event frame produced by a protocol-aware source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    data: [u8; EVENT_FRAME_SIZE],
}

impl RawEvent {
    pub fn new(data: [u8; EVENT_FRAME_SIZE]) -> Self {
        RawEvent { data }
    }

    /// Event code with the synthetic (SendEvent) flag stripped
    pub fn code(&self) -> u8 {
        self.data[0] & 0x7f
    }

    pub fn as_bytes(&self) -> &[u8; EVENT_FRAME_SIZE] {
        &self.data
    }
}

/// Event delivered to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    Raw(RawEvent),
}

impl Event {
    pub fn key_press(keycode: Keycode, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::KeyPress(keycode) })
    }

    pub fn key_release(keycode: Keycode, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::KeyRelease(keycode) })
    }

    pub fn button_press(button: Button, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::ButtonPress(button) })
    }

    pub fn button_release(button: Button, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::ButtonRelease(button) })
    }

    pub fn motion_notify(is_hint: bool, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::MotionNotify { is_hint } })
    }

    pub fn enter_notify(crossing: Crossing, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::EnterNotify(crossing) })
    }

    pub fn leave_notify(crossing: Crossing, base: EventBase) -> Self {
        Event::Input(InputEvent { base, kind: InputKind::LeaveNotify(crossing) })
    }

    /// The event code written in byte 0
    pub fn code(&self) -> u8 {
        match self {
            Event::Input(e) => e.event_type() as u8,
            Event::Raw(raw) => raw.code(),
        }
    }

    /// Encode event to wire format (32 bytes)
    ///
    /// Structured events get `sequence` in bytes 2..4. Raw frames are
    /// returned verbatim.
    pub fn encode(&self, sequence: u16, byte_order: ByteOrder) -> [u8; EVENT_FRAME_SIZE] {
        match self {
            Event::Input(e) => e.encode(sequence, byte_order),
            Event::Raw(raw) => *raw.as_bytes(),
        }
    }
}

impl InputEvent {
    pub fn event_type(&self) -> EventType {
        match self.kind {
            InputKind::KeyPress(_) => EventType::KeyPress,
            InputKind::KeyRelease(_) => EventType::KeyRelease,
            InputKind::ButtonPress(_) => EventType::ButtonPress,
            InputKind::ButtonRelease(_) => EventType::ButtonRelease,
            InputKind::MotionNotify { .. } => EventType::MotionNotify,
            InputKind::EnterNotify(_) => EventType::EnterNotify,
            InputKind::LeaveNotify(_) => EventType::LeaveNotify,
        }
    }

    fn detail(&self) -> u8 {
        match self.kind {
            InputKind::KeyPress(k) | InputKind::KeyRelease(k) => k.get(),
            InputKind::ButtonPress(b) | InputKind::ButtonRelease(b) => b.get(),
            InputKind::MotionNotify { is_hint } => is_hint as u8,
            InputKind::EnterNotify(c) | InputKind::LeaveNotify(c) => c.detail as u8,
        }
    }

    pub fn encode(&self, sequence: u16, byte_order: ByteOrder) -> [u8; EVENT_FRAME_SIZE] {
        let mut buffer = [0u8; EVENT_FRAME_SIZE];
        let base = &self.base;

        buffer[0] = self.event_type() as u8;
        buffer[1] = self.detail();
        byte_order.write_u16(&mut buffer[2..4], sequence);
        byte_order.write_u32(&mut buffer[4..8], base.time.get());
        byte_order.write_u32(&mut buffer[8..12], base.root.id().get());
        byte_order.write_u32(&mut buffer[12..16], base.event.id().get());
        byte_order.write_u32(&mut buffer[16..20], base.child.id().get());
        byte_order.write_i16(&mut buffer[20..22], base.root_pos.x);
        byte_order.write_i16(&mut buffer[22..24], base.root_pos.y);
        byte_order.write_i16(&mut buffer[24..26], base.event_pos.x);
        byte_order.write_i16(&mut buffer[26..28], base.event_pos.y);
        byte_order.write_u16(&mut buffer[28..30], base.state.bits() as u16);

        match self.kind {
            InputKind::EnterNotify(c) | InputKind::LeaveNotify(c) => {
                buffer[30] = c.mode as u8;
                buffer[31] = (base.same_screen as u8) << 1 | c.focus as u8;
            }
            _ => {
                buffer[30] = base.same_screen as u8;
            }
        }

        buffer
    }

    /// Decode an input event frame, returning it with its sequence number
    pub fn parse(frame: &[u8; EVENT_FRAME_SIZE], byte_order: ByteOrder) -> Option<(u16, Self)> {
        let event_type = EventType::from_u8(frame[0] & 0x7f)?;
        let detail = frame[1];
        let sequence = byte_order.read_u16(&frame[2..4]);

        let mut base = EventBase {
            time: Timestamp::new(byte_order.read_u32(&frame[4..8])),
            root: Window::new(byte_order.read_u32(&frame[8..12])),
            event: Window::new(byte_order.read_u32(&frame[12..16])),
            child: Window::new(byte_order.read_u32(&frame[16..20])),
            root_pos: Point::new(
                byte_order.read_i16(&frame[20..22]),
                byte_order.read_i16(&frame[22..24]),
            ),
            event_pos: Point::new(
                byte_order.read_i16(&frame[24..26]),
                byte_order.read_i16(&frame[26..28]),
            ),
            state: Bitmask::new(byte_order.read_u16(&frame[28..30]) as u32),
            same_screen: frame[30] != 0,
        };

        let crossing = || -> Option<Crossing> {
            Some(Crossing {
                detail: CrossingDetail::from_u8(detail)?,
                mode: CrossingMode::from_u8(frame[30])?,
                focus: frame[31] & 0x01 != 0,
            })
        };

        let kind = match event_type {
            EventType::KeyPress => InputKind::KeyPress(Keycode::new(detail)),
            EventType::KeyRelease => InputKind::KeyRelease(Keycode::new(detail)),
            EventType::ButtonPress => InputKind::ButtonPress(Button::new(detail)),
            EventType::ButtonRelease => InputKind::ButtonRelease(Button::new(detail)),
            EventType::MotionNotify => InputKind::MotionNotify { is_hint: detail != 0 },
            EventType::EnterNotify => InputKind::EnterNotify(crossing()?),
            EventType::LeaveNotify => InputKind::LeaveNotify(crossing()?),
        };

        if matches!(kind, InputKind::EnterNotify(_) | InputKind::LeaveNotify(_)) {
            base.same_screen = frame[31] & 0x02 != 0;
        }

        Some((sequence, InputEvent { base, kind }))
    }
}
