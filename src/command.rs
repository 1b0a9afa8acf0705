use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::event::AppEvent;
use crate::generator::GenerationBackend;

#[derive(Clone)]
pub struct GenerationRequest {
    pub request_id: u64,
    pub credential: String,
    pub model: String,
    pub instructions: String,
    pub payload: String,
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("request_id", &self.request_id)
            .field("model", &self.model)
            .field("instructions_len", &self.instructions.len())
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickSignal {
    Generation { request_id: u64 },
    ResetStatus { seq: u64 },
}

impl TickSignal {
    fn into_event(self) -> AppEvent {
        match self {
            TickSignal::Generation { request_id } => AppEvent::GenerationTick { request_id },
            TickSignal::ResetStatus { seq } => AppEvent::ResetStatus { seq },
        }
    }
}

/// A deferred side effect. Everything it needs is captured up front and
/// running it yields exactly one completion event.
#[derive(Clone, Debug)]
pub enum Command {
    ReadFile(PathBuf),
    WriteFile { path: PathBuf, content: String },
    Generate(GenerationRequest),
    Tick { delay: Duration, signal: TickSignal },
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::ReadFile(_) => "read_file",
            Command::WriteFile { .. } => "write_file",
            Command::Generate(_) => "generate",
            Command::Tick { .. } => "tick",
        }
    }

    /// Execute on the calling thread. Blocks for file I/O, the network call,
    /// or the timer delay.
    pub fn run(self, backend: &dyn GenerationBackend) -> AppEvent {
        match self {
            Command::ReadFile(path) => {
                let result = fs::read(&path)
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .map_err(|e| e.to_string());
                AppEvent::FileLoaded { path, result }
            }
            Command::WriteFile { path, content } => {
                let result = fs::write(&path, content).map_err(|e| e.to_string());
                AppEvent::FileSaved { path, result }
            }
            Command::Generate(req) => {
                let result = backend.generate(
                    &req.credential,
                    &req.model,
                    &req.instructions,
                    &req.payload,
                );
                AppEvent::Generated {
                    request_id: req.request_id,
                    result,
                }
            }
            Command::Tick { delay, signal } => {
                thread::sleep(delay);
                signal.into_event()
            }
        }
    }
}

/// Runs each command on its own worker thread and funnels the completion
/// back into the controller's event queue.
pub struct CommandRunner {
    tx: mpsc::Sender<AppEvent>,
    backend: Arc<dyn GenerationBackend>,
}

impl CommandRunner {
    pub fn new(tx: mpsc::Sender<AppEvent>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { tx, backend }
    }

    pub fn dispatch(&self, command: Command) -> io::Result<()> {
        let kind = command.kind();
        match &command {
            Command::Tick { .. } => debug!(kind, "dispatching command"),
            _ => info!(kind, "dispatching command"),
        }

        let tx = self.tx.clone();
        let backend = Arc::clone(&self.backend);
        thread::Builder::new()
            .name(format!("cmd-{kind}"))
            .spawn(move || {
                let event = command.run(backend.as_ref());
                // The receiver is gone only once the app is shutting down.
                let _ = tx.send(event);
            })?;
        Ok(())
    }

    pub fn dispatch_all(&self, commands: Vec<Command>) -> io::Result<()> {
        for command in commands {
            self.dispatch(command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationError;

    struct EchoBackend;

    impl GenerationBackend for EchoBackend {
        fn generate(
            &self,
            credential: &str,
            model: &str,
            _instructions: &str,
            payload: &str,
        ) -> Result<String, GenerationError> {
            if credential.is_empty() {
                return Err(GenerationError::MissingCredential);
            }
            Ok(format!("{model}:{payload}"))
        }
    }

    fn request(id: u64, credential: &str) -> GenerationRequest {
        GenerationRequest {
            request_id: id,
            credential: credential.to_string(),
            model: "gpt-5".to_string(),
            instructions: "rules".to_string(),
            payload: "bank = shore".to_string(),
        }
    }

    #[test]
    fn read_file_yields_content_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "bank = shore").unwrap();

        match Command::ReadFile(path.clone()).run(&EchoBackend) {
            AppEvent::FileLoaded { path: p, result } => {
                assert_eq!(p, path);
                assert_eq!(result.unwrap(), "bank = shore");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn read_missing_file_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let event = Command::ReadFile(dir.path().join("missing.txt")).run(&EchoBackend);
        assert!(matches!(event, AppEvent::FileLoaded { result: Err(_), .. }));
    }

    #[test]
    fn write_file_writes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_problem.txt");
        let event = Command::WriteFile {
            path: path.clone(),
            content: "1. 문제\n".to_string(),
        }
        .run(&EchoBackend);
        assert!(matches!(event, AppEvent::FileSaved { result: Ok(()), .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1. 문제\n");
    }

    #[test]
    fn write_into_missing_dir_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let event = Command::WriteFile {
            path: dir.path().join("nope").join("out.txt"),
            content: String::new(),
        }
        .run(&EchoBackend);
        assert!(matches!(event, AppEvent::FileSaved { result: Err(_), .. }));
    }

    #[test]
    fn generate_carries_request_id_and_result() {
        match Command::Generate(request(7, "sk-test")).run(&EchoBackend) {
            AppEvent::Generated { request_id, result } => {
                assert_eq!(request_id, 7);
                assert_eq!(result.unwrap(), "gpt-5:bank = shore");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        match Command::Generate(request(8, "")).run(&EchoBackend) {
            AppEvent::Generated { result, .. } => {
                assert_eq!(result, Err(GenerationError::MissingCredential))
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn tick_maps_signal_to_event() {
        let event = Command::Tick {
            delay: Duration::ZERO,
            signal: TickSignal::ResetStatus { seq: 3 },
        }
        .run(&EchoBackend);
        assert!(matches!(event, AppEvent::ResetStatus { seq: 3 }));

        let event = Command::Tick {
            delay: Duration::ZERO,
            signal: TickSignal::Generation { request_id: 2 },
        }
        .run(&EchoBackend);
        assert!(matches!(event, AppEvent::GenerationTick { request_id: 2 }));
    }

    #[test]
    fn runner_delivers_one_event_per_command() {
        let (tx, rx) = mpsc::channel();
        let runner = CommandRunner::new(tx, Arc::new(EchoBackend));
        runner
            .dispatch_all(vec![
                Command::Generate(request(1, "sk-test")),
                Command::Tick {
                    delay: Duration::from_millis(5),
                    signal: TickSignal::Generation { request_id: 1 },
                },
            ])
            .unwrap();

        let mut generated = 0;
        let mut ticks = 0;
        for _ in 0..2 {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                AppEvent::Generated { .. } => generated += 1,
                AppEvent::GenerationTick { .. } => ticks += 1,
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert_eq!((generated, ticks), (1, 1));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn debug_output_hides_credential() {
        let shown = format!("{:?}", request(1, "sk-secret"));
        assert!(!shown.contains("sk-secret"));
    }
}
