use super::error::ToolInvokeError;
use super::interface::{ServerToolInfo, ToolProvider};
use crate::config::ServerConfig;
use crate::constants::{CLIENT_NAME, CLIENT_VERSION};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";

/// Session with one MCP server running as a child process.
///
/// The child is spawned on the first `list_tools` call and lives until `shutdown`
/// or until it exits. Once gone it is not respawned.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: ServerConfig,
    state: AsyncMutex<SessionState>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: Mutex<PendingMap>,
    id_counter: AtomicU64,
    late_responses: AtomicUsize,
    tools: AsyncMutex<Vec<ServerToolInfo>>,
}

type PendingMap = HashMap<String, oneshot::Sender<Result<Value, ToolInvokeError>>>;

/// Removes a request's pending slot when its caller stops waiting, answered or not.
struct PendingSlot<'a> {
    inner: &'a McpProcessInner,
    id: String,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if self.inner.pending().remove(&self.id).is_some() {
            debug!(
                server = %self.inner.server.name,
                request_id = %self.id,
                "caller stopped waiting before the server answered"
            );
        }
    }
}

enum SessionState {
    NotStarted,
    Running(Child),
    Closed,
}

impl McpProcess {
    pub fn new(server: ServerConfig) -> Self {
        Self {
            inner: Arc::new(McpProcessInner {
                server,
                state: AsyncMutex::new(SessionState::NotStarted),
                writer: AsyncMutex::new(None),
                pending: Mutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                late_responses: AtomicUsize::new(0),
                tools: AsyncMutex::new(Vec::new()),
            }),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.inner.server.name
    }

    /// Kills the child process and fails any request still waiting on it.
    pub async fn shutdown(&self) {
        info!(
            server = %self.inner.server.name,
            late_responses = self.inner.late_responses.load(Ordering::Relaxed),
            "Shutting down MCP server"
        );
        self.inner.close().await;
    }
}

#[async_trait]
impl ToolProvider for McpProcess {
    async fn list_tools(&self) -> Result<Vec<ServerToolInfo>, ToolInvokeError> {
        self.inner.ensure_started().await?;
        Ok(self.inner.tools.lock().await.clone())
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        self.inner.ensure_connected().await?;
        self.inner.call_tool(tool, arguments).await
    }
}

impl McpProcessInner {
    async fn ensure_connected(&self) -> Result<(), ToolInvokeError> {
        match *self.state.lock().await {
            SessionState::Running(_) => Ok(()),
            SessionState::NotStarted | SessionState::Closed => Err(self.terminated()),
        }
    }

    async fn ensure_started(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        {
            let state = self.state.lock().await;
            match *state {
                SessionState::Running(_) => return Ok(()),
                SessionState::Closed => return Err(self.terminated()),
                SessionState::NotStarted => {}
            }
        }

        let mut command = Command::new(&self.server.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.server.workdir {
            command.current_dir(dir);
        }
        if !self.server.args.is_empty() {
            command.args(&self.server.args);
        }
        for (key, value) in &self.server.env {
            command.env(key, value);
        }

        info!(
            server = %self.server.name,
            command = %self.server.command.display(),
            "Starting MCP server"
        );
        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: self.server.name.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        {
            let mut writer = self.writer.lock().await;
            *writer = Some(BufWriter::new(stdin));
        }

        {
            let mut state = self.state.lock().await;
            *state = SessionState::Running(child);
        }

        let reader_self = Arc::clone(self);
        tokio::spawn(async move {
            reader_self.reader_loop(stdout).await;
        });

        match self.initialize_sequence().await {
            Ok(_) => Ok(()),
            Err(err) => {
                self.close().await;
                Err(err)
            }
        }
    }

    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": CLIENT_VERSION,
                "title": "Canvas Agent"
            },
            "capabilities": {}
        });
        let init_result = self.send_request("initialize", params).await?;
        debug!(
            server = %self.server.name,
            protocol = init_result.get("protocolVersion").and_then(|v| v.as_str()),
            "MCP session initialized"
        );
        self.send_notification("notifications/initialized", json!({}))
            .await?;

        let listed = self.send_request("tools/list", json!({})).await?;
        let tools = parse_tool_list(&listed);
        info!(server = %self.server.name, tools = tools.len(), "Received tool list");
        *self.tools.lock().await = tools;
        Ok(())
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        self.send_request("tools/call", params).await
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = self.process_inbound_message(value).await {
                        warn!(
                            server = %self.server.name,
                            %err,
                            "failed to process message from MCP server"
                        );
                    }
                }
                Err(source) => {
                    debug!(
                        server = %self.server.name,
                        line = trimmed,
                        %source,
                        "skipping non-JSON line from MCP server"
                    );
                }
            }
        }

        warn!(server = %self.server.name, "MCP server closed its output stream");
        self.close().await;
    }

    async fn process_inbound_message(&self, value: Value) -> Result<(), ToolInvokeError> {
        match (value.get("id").cloned(), value.get("method").is_some()) {
            (Some(id), true) => self.handle_server_request(id, value).await,
            (Some(id), false) => {
                self.handle_response(id, value).await;
                Ok(())
            }
            (None, true) => {
                self.handle_notification(&value);
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }

    async fn handle_response(&self, id: Value, value: Value) {
        let Some(key) = response_key(&id) else {
            return;
        };

        let responder = self.pending().remove(&key);
        let Some(sender) = responder else {
            if self.is_issued_id(&key) {
                self.report_late_response(&key);
            } else {
                debug!(
                    server = %self.server.name,
                    response_id = key,
                    "received response for unknown request"
                );
            }
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => Err(ToolInvokeError::Rpc {
                server: self.server.name.clone(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };

        if sender.send(outcome).is_err() {
            self.report_late_response(&key);
        }
    }

    /// The caller gave up waiting; whatever the tool did has still happened.
    fn report_late_response(&self, key: &str) {
        self.late_responses.fetch_add(1, Ordering::Relaxed);
        warn!(
            server = %self.server.name,
            response_id = key,
            "response arrived after the caller stopped waiting; the action may have completed"
        );
    }

    fn is_issued_id(&self, key: &str) -> bool {
        key.strip_prefix("req-")
            .and_then(|n| n.parse::<u64>().ok())
            .is_some_and(|n| n > 0 && n < self.id_counter.load(Ordering::SeqCst))
    }

    async fn handle_server_request(&self, id: Value, value: Value) -> Result<(), ToolInvokeError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if method == "ping" {
            return self.send_message(id, "result", json!({})).await;
        }

        warn!(
            server = %self.server.name,
            method,
            "server sent unsupported request"
        );
        let error = json!({
            "code": -32601,
            "message": format!("client does not implement method '{method}'"),
        });
        self.send_message(id, "error", error).await
    }

    fn handle_notification(&self, value: &Value) {
        if let Some(method) = value.get("method").and_then(Value::as_str) {
            if method == "notifications/tools/list_changed" {
                debug!(
                    server = %self.server.name,
                    "ignoring tool list change; catalog is fixed for the session"
                );
            } else {
                debug!(
                    server = %self.server.name,
                    method,
                    "received notification from server"
                );
            }
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id.clone(), tx);
        let _slot = PendingSlot {
            inner: self,
            id: id.clone(),
        };

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.write_message(&payload).await?;

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            }),
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write_message(&payload).await
    }

    async fn send_message(&self, id: Value, kind: &str, body: Value) -> Result<(), ToolInvokeError> {
        let mut payload = json!({ "jsonrpc": "2.0", "id": id });
        if let Value::Object(ref mut map) = payload {
            map.insert(kind.to_string(), body);
        }
        self.write_message(&payload).await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let mut encoded =
            serde_json::to_string(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.name.clone(),
                source,
            })?;
        encoded.push('\n');

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("writer not initialised"))?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))
    }

    async fn close(&self) {
        self.writer.lock().await.take();

        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, SessionState::Closed)
        };
        if let SessionState::Running(mut child) = previous {
            if let Err(err) = child.kill().await {
                debug!(
                    server = %self.server.name,
                    %err,
                    "failed to kill MCP server process (may have already exited)"
                );
            }
        }

        let drained: Vec<_> = self.pending().drain().collect();
        for (_, sender) in drained {
            let _ = sender.send(Err(self.terminated()));
        }
    }

    fn pending(&self) -> MutexGuard<'_, PendingMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn terminated(&self) -> ToolInvokeError {
        ToolInvokeError::Terminated {
            server: self.server.name.clone(),
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

/// Reads the `tools` array of a `tools/list` result, preserving server order.
pub(crate) fn parse_tool_list(result: &Value) -> Vec<ServerToolInfo> {
    result
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .filter_map(|tool| {
                    let name = tool.get("name").and_then(Value::as_str)?;
                    Some(ServerToolInfo {
                        name: name.to_string(),
                        description: tool
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        input_schema: tool.get("inputSchema").cloned(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_list_keeps_order_and_skips_nameless_entries() {
        let listed = json!({
            "tools": [
                {"name": "open_paint", "description": "Open Microsoft Paint", "inputSchema": {"type": "object", "properties": {}}},
                {"description": "no name"},
                {"name": "draw_oval", "inputSchema": {"properties": {"x1": {"type": "integer"}}}}
            ]
        });
        let tools = parse_tool_list(&listed);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "open_paint");
        assert_eq!(tools[0].description.as_deref(), Some("Open Microsoft Paint"));
        assert_eq!(tools[1].name, "draw_oval");
        assert!(tools[1].description.is_none());
    }

    #[test]
    fn response_keys_accept_strings_and_numbers() {
        assert_eq!(response_key(&json!("req-3")).as_deref(), Some("req-3"));
        assert_eq!(response_key(&json!(7)).as_deref(), Some("7"));
        assert_eq!(response_key(&Value::Null), None);
    }

    #[tokio::test]
    async fn calls_before_start_report_not_running() {
        let process = McpProcess::new(ServerConfig::default());
        let result = process.call_tool("open_paint", json!({})).await;
        assert!(matches!(result, Err(ToolInvokeError::Terminated { .. })));
    }

    #[tokio::test]
    async fn missing_executable_fails_to_spawn() {
        let process = McpProcess::new(ServerConfig {
            command: "/nonexistent/canvas-agent-mcp-server".into(),
            args: Vec::new(),
            ..ServerConfig::default()
        });
        let result = process.list_tools().await;
        assert!(matches!(result, Err(ToolInvokeError::Spawn { .. })));
    }

    /// Answers the session handshake and rejects any other opening sequence.
    #[cfg(unix)]
    const HANDSHAKE: &str = r#"
read -r line
case "$line" in *'"method":"initialize"'*) ;; *) exit 3 ;; esac
printf '%s\n' '{"jsonrpc":"2.0","id":"req-1","result":{"protocolVersion":"2025-06-18","capabilities":{}}}'
read -r line
case "$line" in *'"method":"notifications/initialized"'*) ;; *) exit 3 ;; esac
read -r line
case "$line" in *'"method":"tools/list"'*) ;; *) exit 3 ;; esac
printf '%s\n' '{"jsonrpc":"2.0","id":"req-2","result":{"tools":[{"name":"open_paint","description":"Open Microsoft Paint","inputSchema":{"type":"object","properties":{}}}]}}'
"#;

    #[cfg(unix)]
    fn scripted_server(body: &str) -> McpProcess {
        McpProcess::new(ServerConfig {
            name: "scripted".into(),
            command: "sh".into(),
            args: vec!["-c".into(), [HANDSHAKE, body].concat()],
            ..ServerConfig::default()
        })
    }

    #[cfg(unix)]
    fn text_of(result: &Value) -> Option<&str> {
        result
            .get("content")
            .and_then(|content| content.get(0))
            .and_then(|item| item.get("text"))
            .and_then(|text| text.as_str())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn handshake_runs_in_order_and_yields_tool_list() {
        let process = scripted_server("read -r line\n");
        let tools = process.list_tools().await.expect("tool list");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "open_paint");
        assert_eq!(tools[0].description.as_deref(), Some("Open Microsoft Paint"));
        process.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn server_ping_is_answered() {
        let process = scripted_server(
            r#"
read -r line
printf '%s\n' '{"jsonrpc":"2.0","id":"srv-1","method":"ping"}'
read -r reply
case "$reply" in *'"id":"srv-1"'*'"result":{}'*) text=pong-ok ;; *) text=pong-bad ;; esac
printf '{"jsonrpc":"2.0","id":"req-3","result":{"content":[{"type":"text","text":"%s"}]}}\n' "$text"
read -r line
"#,
        );
        process.list_tools().await.expect("tool list");
        let result = process
            .call_tool("open_paint", json!({}))
            .await
            .expect("call result");
        assert_eq!(text_of(&result), Some("pong-ok"));
        process.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unsupported_server_request_gets_method_not_found() {
        let process = scripted_server(
            r#"
read -r line
printf '%s\n' '{"jsonrpc":"2.0","id":7,"method":"sampling/createMessage","params":{}}'
read -r reply
case "$reply" in *'"id":7'*'"code":-32601'*) text=rejected ;; *) text=accepted ;; esac
printf '{"jsonrpc":"2.0","id":"req-3","result":{"content":[{"type":"text","text":"%s"}]}}\n' "$text"
read -r line
"#,
        );
        process.list_tools().await.expect("tool list");
        let result = process
            .call_tool("open_paint", json!({}))
            .await
            .expect("call result");
        assert_eq!(text_of(&result), Some("rejected"));
        process.shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_exit_fails_pending_and_later_calls() {
        let process = scripted_server("read -r line\nexit 0\n");
        process.list_tools().await.expect("tool list");

        let pending = process.call_tool("open_paint", json!({})).await;
        assert!(matches!(pending, Err(ToolInvokeError::Terminated { .. })));
        let later = process.call_tool("open_paint", json!({})).await;
        assert!(matches!(later, Err(ToolInvokeError::Terminated { .. })));
        assert!(process.inner.pending().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn abandoned_call_frees_its_slot_and_late_answer_is_counted() {
        let process = scripted_server(
            r#"
read -r line
sleep 1
printf '%s\n' '{"jsonrpc":"2.0","id":"req-3","result":{"content":[{"type":"text","text":"late"}]}}'
read -r line
printf '%s\n' '{"jsonrpc":"2.0","id":"req-4","result":{"content":[{"type":"text","text":"on time"}]}}'
read -r line
"#,
        );
        process.list_tools().await.expect("tool list");

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            process.call_tool("open_paint", json!({})),
        )
        .await;
        assert!(abandoned.is_err(), "first call must time out");
        assert!(process.inner.pending().is_empty());

        let result = process
            .call_tool("open_paint", json!({}))
            .await
            .expect("second call");
        assert_eq!(text_of(&result), Some("on time"));
        assert_eq!(process.inner.late_responses.load(Ordering::Relaxed), 1);
        assert!(process.inner.pending().is_empty());
        process.shutdown().await;
    }
}
