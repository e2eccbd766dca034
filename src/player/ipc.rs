use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const IO_TIMEOUT: Duration = Duration::from_millis(500);

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Serialize)]
struct IpcCommand {
    command: Vec<Value>,
    request_id: u64,
}

/// One line from mpv: either a reply (has `error`) or an event broadcast (has `event`)
#[derive(Debug, Deserialize)]
struct IpcMessage {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_id: Option<u64>,
    #[serde(default)]
    event: Option<String>,
}

pub struct MpvIpc {
    socket_path: PathBuf,
}

impl MpvIpc {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub fn get_property(&self, property: &str) -> Result<Value> {
        self.command(&[Value::from("get_property"), Value::from(property)])
    }

    pub fn get_f64(&self, property: &str) -> Option<f64> {
        match self.get_property(property) {
            Ok(v) => v.as_f64(),
            Err(e) => {
                debug!("Failed to query {} from mpv: {}", property, e);
                None
            }
        }
    }

    pub fn get_bool(&self, property: &str) -> Option<bool> {
        match self.get_property(property) {
            Ok(v) => v.as_bool(),
            Err(e) => {
                debug!("Failed to query {} from mpv: {}", property, e);
                None
            }
        }
    }

    pub fn set_property(&self, property: &str, value: impl Into<Value>) -> Result<()> {
        self.command(&[
            Value::from("set_property"),
            Value::from(property),
            value.into(),
        ])
        .map(|_| ())
    }

    /// Run an mpv command and return its `data`
    pub fn command(&self, args: &[Value]) -> Result<Value> {
        let request_id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        let cmd = IpcCommand {
            command: args.to_vec(),
            request_id,
        };

        let reply = self.send_command(&cmd)?;
        match reply.error.as_deref() {
            Some("success") => Ok(reply.data.unwrap_or(Value::Null)),
            Some(err) => Err(Error::PlayerIpc(format!("{:?}: {}", args, err))),
            None => Err(Error::PlayerIpc(format!("{:?}: no reply", args))),
        }
    }

    fn send_command(&self, cmd: &IpcCommand) -> Result<IpcMessage> {
        let mut json = serde_json::to_string(cmd)?;
        json.push('\n');

        #[cfg(unix)]
        let stream = {
            use std::os::unix::net::UnixStream;

            let stream = UnixStream::connect(&self.socket_path)?;
            stream.set_read_timeout(Some(IO_TIMEOUT))?;
            stream.set_write_timeout(Some(IO_TIMEOUT))?;
            stream
        };

        #[cfg(windows)]
        let stream = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.socket_path)?;

        let mut writer = &stream;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        read_reply(BufReader::new(&stream), cmd.request_id)
    }

    pub fn cleanup(&self) {
        #[cfg(unix)]
        {
            if self.socket_path.exists() {
                if let Err(e) = std::fs::remove_file(&self.socket_path) {
                    warn!("Failed to cleanup mpv socket: {}", e);
                }
            }
        }
    }
}

impl Drop for MpvIpc {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Read lines until the reply for `request_id`, skipping event broadcasts
fn read_reply(mut reader: impl BufRead, request_id: u64) -> Result<IpcMessage> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::PlayerIpc("mpv closed the connection".to_string()));
        }

        let msg: IpcMessage = serde_json::from_str(line.trim())?;
        if msg.event.is_some() {
            continue;
        }
        if msg.request_id.is_none_or(|id| id == request_id) {
            return Ok(msg);
        }
    }
}

/// Per-process, per-instance socket path
pub fn generate_socket_path(instance: u64) -> PathBuf {
    let pid = std::process::id();

    #[cfg(unix)]
    {
        std::env::temp_dir().join(format!("anistream-mpv-{}-{}.sock", pid, instance))
    }

    #[cfg(windows)]
    {
        PathBuf::from(format!(r"\\.\pipe\anistream-mpv-{}-{}", pid, instance))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_reply_skips_events() {
        let lines = concat!(
            "{\"event\":\"playback-restart\"}\n",
            "{\"data\":12.5,\"error\":\"success\",\"request_id\":7}\n",
        );

        let reply = read_reply(Cursor::new(lines), 7).unwrap();

        assert_eq!(reply.error.as_deref(), Some("success"));
        assert_eq!(reply.data.and_then(|v| v.as_f64()), Some(12.5));
    }

    #[test]
    fn test_reply_skips_other_requests() {
        let lines = concat!(
            "{\"data\":null,\"error\":\"success\",\"request_id\":3}\n",
            "{\"error\":\"property unavailable\",\"request_id\":4}\n",
        );

        let reply = read_reply(Cursor::new(lines), 4).unwrap();
        assert_eq!(reply.error.as_deref(), Some("property unavailable"));
    }

    #[test]
    fn test_closed_connection() {
        assert!(matches!(
            read_reply(Cursor::new(""), 1),
            Err(Error::PlayerIpc(_))
        ));
    }

    #[test]
    fn test_command_serialization() {
        let cmd = IpcCommand {
            command: vec![Value::from("set_property"), Value::from("pause"), Value::from(true)],
            request_id: 9,
        };

        assert_eq!(
            serde_json::to_string(&cmd).unwrap(),
            r#"{"command":["set_property","pause",true],"request_id":9}"#
        );
    }

    #[test]
    fn test_socket_paths_are_distinct() {
        assert_ne!(generate_socket_path(1), generate_socket_path(2));
    }
}
