//! Headless participant: joins a board, mirrors it and plays a command script.

use crate::commands::{Command, parse_line};
use chalkboard_core::board::Board;
use chalkboard_core::config::ClientConfig;
use chalkboard_core::connection::ConnectionState;
use chalkboard_core::input::PointerInput;
use chalkboard_core::session::{Session, SessionError};
use chalkboard_core::surface::DrawSurface;
use chalkboard_core::sync::{NativeSocket, Transport};
use chalkboard_render::{RasterEngine, RendererError, encode_png};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Main loop period.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Keepalive period while connected.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Failed to write snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub username: String,
    /// Where to write PNG snapshots of the committed layer.
    pub snapshot: Option<PathBuf>,
    /// Write a snapshot periodically as well as on exit.
    pub snapshot_every: Option<Duration>,
    /// Exit after this long. Without it the client runs until killed.
    pub duration: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            username: "anonymous".to_string(),
            snapshot: None,
            snapshot_every: None,
            duration: None,
        }
    }
}

/// Apply one scripted command to the board.
///
/// Returns `true` when the command asks for a snapshot.
pub fn apply_command<S: DrawSurface, T: Transport>(board: &mut Board<S, T>, command: Command) -> bool {
    match command {
        Command::Tool(tool) => board.set_tool(tool),
        Command::Key(key) => {
            if !board.apply_shortcut(key) {
                log::warn!("No shortcut bound to '{}'", key);
            }
        }
        Command::Color(color) => board.set_color(color),
        Command::Size(width) => board.set_stroke_width(width),
        Command::Down(p) => board.pointer_down(&PointerInput::mouse(p.x, p.y)),
        Command::Move(p) => board.pointer_move(&PointerInput::mouse(p.x, p.y)),
        Command::Up(Some(p)) => board.pointer_up(&PointerInput::mouse(p.x, p.y)),
        Command::Up(None) => board.pointer_up(&PointerInput::Touch { touches: Vec::new() }),
        Command::Leave => board.pointer_leave(),
        Command::Clear => board.clear_board(),
        Command::Snapshot => return true,
    }
    false
}

/// Read stdin lines on a background thread.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = channel();
    let spawned = thread::Builder::new()
        .name("chalkboard-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to read command: {}", e);
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        log::error!("Failed to start command reader: {}", e);
    }
    rx
}

pub struct App {
    config: AppConfig,
    board: Board<RasterEngine, NativeSocket>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let session = Session::join(&config.username)?;
        let surface = RasterEngine::new(config.client.width, config.client.height)?;
        let board = Board::new(&config.client, session, NativeSocket::new(), surface)?;
        log::info!(
            "Joining {} as {} ({})",
            config.client.server_url,
            board.session().username(),
            board.session().client_id()
        );
        Ok(Self { config, board })
    }

    /// Run until `duration` elapses (or forever), then write a final snapshot.
    pub fn run(mut self) -> Result<(), AppError> {
        let commands = spawn_stdin_reader();
        let started = Instant::now();
        self.board.join(started);

        let mut script_open = true;
        let mut last_status = "";
        let mut last_count = None;
        let mut next_ping = started + PING_INTERVAL;
        let mut next_snapshot = self.config.snapshot_every.map(|every| started + every);

        loop {
            let now = Instant::now();
            self.board.poll(now);

            while script_open {
                match commands.try_recv() {
                    Ok(line) => self.execute_line(&line)?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        log::info!("Command script finished");
                        script_open = false;
                    }
                }
            }

            let status = self.board.status_label();
            if status != last_status {
                log::info!("Status: {}", status);
                last_status = status;
            }
            let count = self.board.presence().user_count();
            if last_count != Some(count) {
                log::info!("{} online", self.board.presence().count_label());
                last_count = Some(count);
            }

            if self.board.connection_state() == ConnectionState::Open && now >= next_ping {
                self.board.ping();
                next_ping = now + PING_INTERVAL;
            }

            if let (Some(at), Some(every)) = (next_snapshot, self.config.snapshot_every) {
                if now >= at {
                    self.write_snapshot()?;
                    next_snapshot = Some(now + every);
                }
            }

            if let Some(duration) = self.config.duration {
                if now.duration_since(started) >= duration {
                    break;
                }
            }

            thread::sleep(FRAME_INTERVAL);
        }

        self.board.leave();
        self.write_snapshot()?;
        log::info!("Left the board");
        Ok(())
    }

    fn execute_line(&mut self, line: &str) -> Result<(), AppError> {
        match parse_line(line) {
            Ok(Some(command)) => {
                log::debug!("> {}", line.trim());
                if apply_command(&mut self.board, command) {
                    self.write_snapshot()?;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Skipping line '{}': {}", line.trim(), e),
        }
        Ok(())
    }

    /// Write the committed layer to the snapshot path, if one is configured.
    fn write_snapshot(&self) -> Result<(), AppError> {
        let Some(path) = &self.config.snapshot else {
            log::debug!("No snapshot path configured");
            return Ok(());
        };
        let png_data = encode_png(self.board.surface().committed())?;
        std::fs::write(path, &png_data)?;
        log::info!("Snapshot written to {} ({} bytes)", path.display(), png_data.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board<RasterEngine, NativeSocket> {
        let session = Session::join("script").unwrap();
        Board::new(
            &ClientConfig::default(),
            session,
            NativeSocket::new(),
            RasterEngine::new(100, 100).unwrap(),
        )
        .unwrap()
    }

    fn run_script(board: &mut Board<RasterEngine, NativeSocket>, script: &str) -> usize {
        let mut snapshots = 0;
        for line in script.lines() {
            if let Some(command) = parse_line(line).unwrap() {
                if apply_command(board, command) {
                    snapshots += 1;
                }
            }
        }
        snapshots
    }

    #[test]
    fn test_script_draws_offline() {
        let mut board = board();
        let snapshots = run_script(
            &mut board,
            "# a red line\ncolor #ff0000\nsize 6\ndown 10 50\nmove 90 50\nup\nsnapshot\n",
        );
        assert_eq!(snapshots, 1);
        assert_eq!(board.surface().committed_rgba(50, 50), Some([255, 0, 0, 255]));
        assert_eq!(board.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_script_shape_and_clear() {
        let mut board = board();
        run_script(&mut board, "key r\ndown 20 20\nmove 50 50\nmove 80 80\n");
        assert!(!board.surface().preview_is_empty());
        assert_eq!(board.surface().painted_pixels(), 0);

        run_script(&mut board, "leave\n");
        assert!(board.surface().preview_is_empty());
        assert!(board.surface().committed_alpha(20, 50).unwrap() > 0);

        run_script(&mut board, "clear\n");
        assert_eq!(board.surface().painted_pixels(), 0);
    }

    #[test]
    fn test_script_eraser_then_color() {
        let mut board = board();
        run_script(&mut board, "tool eraser\ncolor #00ff00\n");
        assert_eq!(board.tools().active_tool(), chalkboard_core::tools::ToolKind::Pencil);
    }
}
