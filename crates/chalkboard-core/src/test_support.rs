//! In-memory stand-ins for the surface and the socket, shared by unit tests.

use crate::sync::{Transport, TransportError, TransportEvent};
use crate::event::{DrawEvent, ShapeEvent};
use crate::surface::DrawSurface;
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Commit(DrawEvent),
    Clear,
    Preview(ShapeEvent),
    ClearPreview,
}

/// Records every call and keeps a logical model of both layers.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    committed: Vec<DrawEvent>,
    preview: Option<ShapeEvent>,
}

impl RecordingSurface {
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Events painted since the last clear, in order.
    pub fn committed(&self) -> Vec<DrawEvent> {
        self.committed.clone()
    }

    pub fn preview_is_empty(&self) -> bool {
        self.preview.is_none()
    }

    pub fn preview_draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Preview(_)))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn apply_to_committed(&mut self, event: &DrawEvent) {
        self.calls.push(SurfaceCall::Commit(*event));
        self.committed.push(*event);
    }

    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
        self.committed.clear();
    }

    fn preview_shape(&mut self, shape: &ShapeEvent) {
        self.calls.push(SurfaceCall::Preview(*shape));
        self.preview = Some(*shape);
    }

    fn clear_preview(&mut self) {
        self.calls.push(SurfaceCall::ClearPreview);
        self.preview = None;
    }
}

/// Shared view of what a [`MockTransport`] has seen, kept by the test.
#[derive(Debug, Default)]
pub struct MockSocket {
    pub connects: Vec<Url>,
    pub sent: Vec<String>,
    pub pending: Vec<TransportEvent>,
    pub fail_connect: bool,
}

/// Scripted transport: tests push events into the shared [`MockSocket`].
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    socket: Rc<RefCell<MockSocket>>,
}

impl MockTransport {
    pub fn new() -> (Self, Rc<RefCell<MockSocket>>) {
        let transport = Self::default();
        let socket = transport.socket.clone();
        (transport, socket)
    }
}

impl MockSocket {
    pub fn push(&mut self, event: TransportEvent) {
        self.pending.push(event);
    }

    pub fn push_frame(&mut self, frame: &str) {
        self.pending.push(TransportEvent::Frame(frame.to_string()));
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &Url) -> Result<(), TransportError> {
        let mut socket = self.socket.borrow_mut();
        socket.connects.push(url.clone());
        if socket.fail_connect {
            return Err(TransportError::ConnectFailed("refused".to_string()));
        }
        Ok(())
    }

    fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        self.socket.borrow_mut().sent.push(frame.to_string());
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.socket.borrow_mut().pending)
    }

    fn disconnect(&mut self) {}
}
