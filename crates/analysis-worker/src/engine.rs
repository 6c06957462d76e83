//! UCI engine process wrapper (async I/O)

use std::future::Future;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use crate::error::WorkerError;

/// Anything that can suggest a best move for a position.
pub trait BestMoveSearch {
    /// Best move for `fen` in UCI text, or `None` if the engine has none.
    fn best_move(&mut self, fen: &str, depth: u8) -> impl Future<Output = Result<Option<String>, WorkerError>> + Send;
}

/// Engine process settings sent after the handshake.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
}

/// A running UCI engine such as Stockfish.
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl UciEngine {
    /// Spawn the engine binary at `path` and complete the UCI handshake.
    pub async fn spawn(path: &str, options: EngineOptions) -> Result<Self, WorkerError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WorkerError::Engine(format!("Failed to spawn {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| WorkerError::Engine("Engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| WorkerError::Engine("Engine stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;
        engine
            .send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        engine
            .send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    async fn send(&mut self, cmd: &str) -> Result<(), WorkerError> {
        debug!(cmd, "engine <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to write to engine: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to flush engine stdin: {e}")))
    }

    /// Read one line; a closed stdout means the engine died.
    async fn read_line(&mut self, line: &mut String) -> Result<(), WorkerError> {
        line.clear();
        let read = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to read from engine: {e}")))?;
        if read == 0 {
            return Err(WorkerError::Engine("Engine closed its output".into()));
        }
        debug!(line = line.trim(), "engine >");
        Ok(())
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), WorkerError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl BestMoveSearch for UciEngine {
    async fn best_move(&mut self, fen: &str, depth: u8) -> Result<Option<String>, WorkerError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if let Some(reply) = parse_bestmove(line.trim()) {
                return Ok(reply);
            }
        }
    }
}

/// `Some(reply)` for a `bestmove` line, where the reply is `None` when the
/// engine reports `(none)`. Other lines give `None`.
fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    match parts.next() {
        None | Some("(none)") | Some("0000") => Some(None),
        Some(mv) => Some(Some(mv.to_string())),
    }
}
