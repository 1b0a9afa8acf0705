use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};

use crate::generator::GenerationError;

/// Everything the controller reacts to: terminal input plus exactly one
/// completion per dispatched command.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    FileLoaded {
        path: PathBuf,
        result: Result<String, String>,
    },
    FileSaved {
        path: PathBuf,
        result: Result<(), String>,
    },
    Generated {
        request_id: u64,
        result: Result<String, GenerationError>,
    },
    GenerationTick {
        request_id: u64,
    },
    ResetStatus {
        seq: u64,
    },
}

/// Single consumer queue. Terminal input is pumped by a background thread;
/// command workers send through [`EventHandler::sender`].
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(poll_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if !event::poll(poll_rate).unwrap_or(false) {
                    continue;
                }
                let app_event = match event::read() {
                    // Release/repeat reports would double every keystroke.
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                    Ok(Event::Paste(text)) => AppEvent::Paste(text),
                    Ok(Event::Mouse(mouse)) => AppEvent::Mouse(mouse),
                    Ok(Event::Resize(w, h)) => AppEvent::Resize(w, h),
                    _ => continue,
                };
                if input_tx.send(app_event).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
