//! RelayProcess: the mcp-pointer binary running `start` as a child process,
//! driven over stdin/stdout the way an MCP client drives it

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::test_relay::TEST_TIMEOUT;

/// Path of the compiled binary under test
pub fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mcp-pointer"))
}

pub struct RelayProcess {
    dir: TempDir,
    pub port: u16,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl RelayProcess {
    /// Run `start --port <port> <extra_args>` with stdin held open
    pub fn start(port: u16, extra_args: &[&str]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut child = Self::command(&dir, port, extra_args)
            .stdin(Stdio::piped())
            .spawn()
            .expect("Failed to spawn mcp-pointer");

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().expect("stdout is piped");
        Self {
            dir,
            port,
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        }
    }

    /// Base `start` command with an isolated state file
    pub fn command(dir: &TempDir, port: u16, extra_args: &[&str]) -> Command {
        let mut command = Command::new(binary());
        command
            .arg("start")
            .arg("--port")
            .arg(port.to_string())
            .args(extra_args)
            .env("MCP_POINTER_STATE_FILE", dir.path().join("state.json"))
            .env_remove("MCP_POINTER_PORT")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }

    pub fn pid(&self) -> u32 {
        self.child.id().expect("process already reaped")
    }

    /// Send one JSON-RPC message as a line on stdin
    pub async fn send(&mut self, message: Value) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        let mut line = message.to_string();
        line.push('\n');
        stdin
            .write_all(line.as_bytes())
            .await
            .expect("Failed to write to stdin");
        stdin.flush().await.expect("Failed to flush stdin");
    }

    /// Read stdout until the response with `id` arrives
    pub async fn response(&mut self, id: u64) -> Value {
        loop {
            let line = tokio::time::timeout(TEST_TIMEOUT, self.stdout.next_line())
                .await
                .expect("timed out waiting for a response")
                .expect("Failed to read stdout")
                .expect("stdout closed before the response");
            let value: Value = match serde_json::from_str(&line) {
                Ok(value) => value,
                Err(_) => continue,
            };
            if value["id"] == id {
                return value;
            }
        }
    }

    pub async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.response(id).await
    }

    /// MCP handshake: `initialize` then `notifications/initialized`
    pub async fn initialize(&mut self) -> Value {
        let reply = self
            .request(
                1,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "integration-tests", "version": "0.0.0"}
                }),
            )
            .await;
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        reply
    }

    /// Close stdin, which ends the MCP session
    pub fn close_stdin(&mut self) {
        self.stdin.take();
    }

    /// Wait for the process to exit
    pub async fn wait(&mut self) -> ExitStatus {
        tokio::time::timeout(TEST_TIMEOUT, self.child.wait())
            .await
            .expect("mcp-pointer did not exit in time")
            .expect("Failed to wait for mcp-pointer")
    }

    /// Send SIGTERM
    #[cfg(unix)]
    pub fn terminate(&self) {
        let status = std::process::Command::new("kill")
            .args(["-TERM", &self.pid().to_string()])
            .status()
            .expect("Failed to run kill");
        assert!(status.success(), "kill -TERM failed");
    }
}

/// Wait until something accepts TCP connections on `port`
pub async fn wait_until_listening(port: u16) {
    let attempt = async {
        loop {
            if tokio::net::TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };
    tokio::time::timeout(TEST_TIMEOUT, attempt)
        .await
        .unwrap_or_else(|_| panic!("nothing listening on port {}", port));
}

/// True if this test can bind `port` itself
pub fn port_is_free(port: u16) -> bool {
    std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}
