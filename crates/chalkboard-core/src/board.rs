//! Application state for one participant on one board.
//!
//! The `Board` owns everything the UI touches: tool selection, the gesture
//! in progress, the connection, presence and the drawing surface. Hosts call
//! the pointer methods from their input handlers and [`Board::poll`] once per
//! frame.

use crate::color::RgbHex;
use crate::config::ClientConfig;
use crate::connection::{ConnectionEvent, ConnectionManager, ConnectionState};
use crate::drawing::DrawingMachine;
use crate::event::DrawEvent;
use crate::input::{PointerEvent, PointerInput, PointerSample, SurfaceOrigin};
use crate::presence::PresenceFeed;
use crate::protocol::{ClientMessage, HistoryEntry, ServerMessage};
use crate::session::{Session, SessionError};
use crate::surface::DrawSurface;
use crate::sync::Transport;
use crate::tools::{ToolKind, ToolState};
use std::num::NonZeroU32;
use std::time::Instant;

pub struct Board<S: DrawSurface, T: Transport> {
    tools: ToolState,
    session: Session,
    drawing: DrawingMachine,
    connection: ConnectionManager<T>,
    presence: PresenceFeed,
    surface: S,
    origin: SurfaceOrigin,
}

impl<S: DrawSurface, T: Transport> Board<S, T> {
    /// Build a board for `session`. Nothing is sent until [`Board::join`].
    pub fn new(
        config: &ClientConfig,
        session: Session,
        transport: T,
        surface: S,
    ) -> Result<Self, SessionError> {
        let url = session.connect_url(&config.server_url)?;
        Ok(Self {
            tools: ToolState::new(),
            session,
            drawing: DrawingMachine::new(),
            connection: ConnectionManager::new(
                transport,
                url,
                config.reconnect_delay,
                config.outbound,
            ),
            presence: PresenceFeed::new(config.notice_visible, config.notice_fade),
            surface,
            origin: SurfaceOrigin::default(),
        })
    }

    /// Open the connection.
    pub fn join(&mut self, now: Instant) {
        self.connection.connect(now);
    }

    /// Close the connection without scheduling a reconnect.
    pub fn leave(&mut self) {
        self.connection.disconnect();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn presence(&self) -> &PresenceFeed {
        &self.presence
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn status_label(&self) -> &'static str {
        self.connection.status_label()
    }

    /// Where the surface sits in client coordinates.
    pub fn set_origin(&mut self, origin: SurfaceOrigin) {
        self.origin = origin;
    }

    // --- Tool selection ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    pub fn set_color(&mut self, color: RgbHex) {
        self.tools.set_color(color);
    }

    pub fn set_stroke_width(&mut self, width: NonZeroU32) {
        self.tools.set_stroke_width(width);
    }

    /// Apply a single-key tool shortcut. Returns whether the key was bound.
    pub fn apply_shortcut(&mut self, key: char) -> bool {
        match ToolKind::from_shortcut(key) {
            Some(tool) => {
                self.tools.set_tool(tool);
                true
            }
            None => false,
        }
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, input: &PointerInput) {
        if let Some(position) = self.origin.sample(input) {
            self.handle_pointer_event(PointerEvent::Down { position });
        }
    }

    pub fn pointer_move(&mut self, input: &PointerInput) {
        if let Some(position) = self.origin.sample(input) {
            self.handle_pointer_event(PointerEvent::Move { position });
        }
    }

    /// Release. Touch releases carry no active touch and commit at the last sample.
    pub fn pointer_up(&mut self, input: &PointerInput) {
        let position = self.origin.sample(input);
        self.handle_pointer_event(PointerEvent::Up { position });
    }

    pub fn pointer_leave(&mut self) {
        self.handle_pointer_event(PointerEvent::Leave);
    }

    /// Feed an already-normalized pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        let emitted = match event {
            PointerEvent::Down { position } => {
                self.drawing.pointer_down(position, &self.tools, &mut self.surface);
                None
            }
            PointerEvent::Move { position } => self.drawing.pointer_move(position, &mut self.surface),
            PointerEvent::Up { position } => self.drawing.pointer_up(position, &mut self.surface),
            PointerEvent::Leave => self.drawing.pointer_leave(&mut self.surface),
        };
        if let Some(event) = emitted {
            self.send_draw(event);
        }
    }

    /// Convenience for hosts that already have canvas-local coordinates.
    pub fn stroke(&mut self, from: PointerSample, points: &[PointerSample]) {
        self.handle_pointer_event(PointerEvent::Down { position: from });
        for &position in points {
            self.handle_pointer_event(PointerEvent::Move { position });
        }
        self.handle_pointer_event(PointerEvent::Up { position: points.last().copied() });
    }

    fn send_draw(&mut self, event: DrawEvent) {
        self.connection.send(&ClientMessage::Draw(event));
    }

    /// Wipe the board locally and for everyone else.
    pub fn clear_board(&mut self) {
        self.surface.clear();
        self.connection.send(&ClientMessage::Clear);
    }

    /// Send a keepalive ping.
    pub fn ping(&mut self) -> bool {
        self.connection.send(&ClientMessage::Ping)
    }

    // --- Inbound ---

    /// Drive timers and apply everything the server sent since the last poll.
    pub fn poll(&mut self, now: Instant) {
        for event in self.connection.poll(now) {
            match event {
                ConnectionEvent::Opened => {
                    let username = self.session.username().to_string();
                    self.presence.connected(&username, now);
                }
                ConnectionEvent::Message(msg) => self.apply_server_message(msg, now),
                ConnectionEvent::Lost => {}
            }
        }
        self.presence.tick(now);
    }

    fn apply_server_message(&mut self, msg: ServerMessage, now: Instant) {
        match msg {
            ServerMessage::History { data } => {
                log::debug!("Replaying {} history entries", data.len());
                self.surface.clear();
                for entry in &data {
                    match entry {
                        HistoryEntry::Draw(event) => self.surface.apply_to_committed(event),
                        HistoryEntry::Clear => self.surface.clear(),
                        HistoryEntry::Unknown => {}
                    }
                }
            }
            ServerMessage::Draw(event) => self.surface.apply_to_committed(&event),
            ServerMessage::Clear => {
                self.surface.clear();
                self.presence.board_cleared(now);
            }
            ServerMessage::Pong => log::trace!("Pong"),
            other => {
                self.presence.apply(&other, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Segment, ShapeEvent};
    use crate::sync::TransportEvent;
    use crate::test_support::{MockSocket, MockTransport, RecordingSurface};
    use crate::tools::ShapeKind;
    use kurbo::Point;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn board() -> (Board<RecordingSurface, MockTransport>, Rc<RefCell<MockSocket>>) {
        let (transport, socket) = MockTransport::new();
        let session = Session::join("ada").unwrap();
        let board = Board::new(
            &ClientConfig::default(),
            session,
            transport,
            RecordingSurface::default(),
        )
        .unwrap();
        (board, socket)
    }

    fn open(board: &mut Board<RecordingSurface, MockTransport>, socket: &Rc<RefCell<MockSocket>>, now: Instant) {
        board.join(now);
        socket.borrow_mut().push(TransportEvent::Opened);
        board.poll(now);
    }

    fn segment(x: f64) -> DrawEvent {
        DrawEvent::Segment(Segment {
            tool: ToolKind::Pencil,
            color: RgbHex::BLACK,
            size: NonZeroU32::new(4).unwrap(),
            eraser: false,
            from: Point::new(x, 0.0),
            to: Point::new(x + 1.0, 1.0),
        })
    }

    fn draw_frame(event: DrawEvent) -> String {
        ServerMessage::Draw(event).to_frame().unwrap()
    }

    #[test]
    fn test_connect_url_uses_session() {
        let (mut board, socket) = board();
        board.join(Instant::now());
        let url = socket.borrow().connects[0].clone();
        assert_eq!(url.path(), format!("/ws/{}", board.session().client_id()));
        assert_eq!(url.query(), Some("username=ada"));
    }

    #[test]
    fn test_history_with_clear_replays_only_tail() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        let a = segment(0.0);
        let b = segment(50.0);
        let history = ServerMessage::history(vec![
            HistoryEntry::Draw(a),
            HistoryEntry::Clear,
            HistoryEntry::Draw(b),
        ]);
        socket.borrow_mut().push_frame(&history.to_frame().unwrap());
        board.poll(now);

        assert_eq!(board.surface().committed(), vec![b]);
    }

    #[test]
    fn test_history_replaces_existing_content() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        socket.borrow_mut().push_frame(&draw_frame(segment(0.0)));
        board.poll(now);
        assert_eq!(board.surface().committed().len(), 1);

        socket.borrow_mut().push_frame(r#"{"type":"history","data":[]}"#);
        board.poll(now);
        assert!(board.surface().committed().is_empty());
    }

    #[test]
    fn test_remote_draw_and_clear() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        socket.borrow_mut().push_frame(&draw_frame(segment(0.0)));
        socket.borrow_mut().push_frame(r#"{"type":"clear"}"#);
        board.poll(now);

        assert!(board.surface().committed().is_empty());
        let texts: Vec<_> = board.presence().notices().iter().map(|n| n.text.clone()).collect();
        assert_eq!(texts, vec!["Connected as ada".to_string(), "Board cleared".to_string()]);
    }

    #[test]
    fn test_local_stroke_sends_segments() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        board.stroke(
            Point::new(0.0, 0.0),
            &[Point::new(1.0, 0.0), Point::new(2.0, 0.0), Point::new(3.0, 0.0)],
        );
        assert_eq!(socket.borrow().sent.len(), 3);
        assert_eq!(board.surface().committed().len(), 3);
    }

    #[test]
    fn test_shape_sends_single_draw() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        board.set_tool(ToolKind::Circle);
        board.set_origin(SurfaceOrigin::new(100.0, 100.0));
        board.pointer_down(&PointerInput::mouse(110.0, 110.0));
        for i in 0..10 {
            board.pointer_move(&PointerInput::mouse(120.0 + i as f64, 130.0));
        }
        board.pointer_up(&PointerInput::mouse(150.0, 160.0));

        let sent = socket.borrow().sent.clone();
        assert_eq!(sent.len(), 1);
        let value: Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["tool"], "circle");
        assert_eq!(value["fromX"], 10.0);
        assert_eq!(value["toY"], 60.0);
        assert!(board.surface().preview_is_empty());
        assert_eq!(
            board.surface().committed(),
            vec![DrawEvent::Shape(ShapeEvent {
                kind: ShapeKind::Circle,
                color: RgbHex::BLACK,
                size: NonZeroU32::new(4).unwrap(),
                from: Point::new(10.0, 10.0),
                to: Point::new(50.0, 60.0),
            })]
        );
    }

    #[test]
    fn test_touch_end_commits_at_last_sample() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        board.set_tool(ToolKind::Line);
        board.pointer_down(&PointerInput::touch([Point::new(5.0, 5.0)]));
        board.pointer_move(&PointerInput::touch([Point::new(25.0, 5.0), Point::new(0.0, 0.0)]));
        board.pointer_up(&PointerInput::Touch { touches: Vec::new() });

        let sent = socket.borrow().sent.clone();
        let value: Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["toX"], 25.0);
        assert_eq!(value["toY"], 5.0);
    }

    #[test]
    fn test_reconnect_scenario_drops_offline_strokes() {
        let (mut board, socket) = board();
        let start = Instant::now();
        open(&mut board, &socket, start);
        assert_eq!(board.status_label(), "Connected");

        socket.borrow_mut().push(TransportEvent::Closed { reason: None });
        board.poll(start);
        assert_eq!(board.status_label(), "Reconnecting...");

        // Drawn while offline: painted locally, never sent.
        board.stroke(Point::new(0.0, 0.0), &[Point::new(10.0, 10.0)]);
        assert_eq!(board.surface().committed().len(), 1);
        assert!(socket.borrow().sent.is_empty());

        board.poll(start + Duration::from_secs(3));
        assert_eq!(socket.borrow().connects.len(), 2);

        socket.borrow_mut().push(TransportEvent::Opened);
        socket.borrow_mut().push_frame(r#"{"type":"history","data":[]}"#);
        board.poll(start + Duration::from_secs(3));

        assert_eq!(board.status_label(), "Connected");
        assert!(socket.borrow().sent.is_empty());
        assert!(board.surface().committed().is_empty());
    }

    #[test]
    fn test_clear_board_is_local_and_sent() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        board.stroke(Point::new(0.0, 0.0), &[Point::new(1.0, 1.0)]);
        board.clear_board();
        assert!(board.surface().committed().is_empty());
        assert_eq!(socket.borrow().sent.last().unwrap(), r#"{"type":"clear"}"#);
    }

    #[test]
    fn test_color_pick_leaves_eraser() {
        let (mut board, _socket) = board();
        assert!(board.apply_shortcut('e'));
        assert_eq!(board.tools().active_tool(), ToolKind::Eraser);
        board.set_color(RgbHex::new(255, 0, 0));
        assert_eq!(board.tools().active_tool(), ToolKind::Pencil);
        assert_eq!(board.tools().color(), RgbHex::new(255, 0, 0));
        assert!(!board.apply_shortcut('x'));
    }

    #[test]
    fn test_presence_routed_to_feed() {
        let (mut board, socket) = board();
        let now = Instant::now();
        open(&mut board, &socket, now);

        socket
            .borrow_mut()
            .push_frame(r#"{"type":"user_joined","username":"grace","user_count":2}"#);
        board.poll(now);
        assert_eq!(board.presence().count_label(), "2 users");

        board.poll(now + Duration::from_secs(4));
        assert!(board.presence().notices().is_empty());
    }
}
