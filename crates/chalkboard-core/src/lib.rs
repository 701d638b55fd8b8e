//! Chalkboard Core Library
//!
//! Drawing engine and realtime sync client for the Chalkboard shared canvas:
//! tool state, pointer normalization, the gesture state machine, the wire
//! protocol, the connection manager and presence tracking. Rendering is
//! abstracted behind [`DrawSurface`].

pub mod board;
pub mod color;
pub mod config;
pub mod connection;
pub mod drawing;
pub mod event;
pub mod input;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod surface;
pub mod sync;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use board::Board;
pub use color::{ColorParseError, RgbHex};
pub use config::{ClientConfig, OutboundPolicy};
pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState};
pub use drawing::{DrawingMachine, Gesture};
pub use event::{CompositeMode, DrawEvent, Segment, ShapeEvent};
pub use input::{PointerEvent, PointerInput, PointerSample, SurfaceOrigin};
pub use presence::{Notice, NoticeKind, NoticePhase, PresenceFeed, count_label};
pub use protocol::{ClientMessage, Frame, HistoryEntry, ProtocolError, ServerMessage};
pub use session::{Session, SessionError};
pub use surface::DrawSurface;
pub use sync::{NativeSocket, Transport, TransportError, TransportEvent};
pub use tools::{ShapeKind, ToolKind, ToolState};
