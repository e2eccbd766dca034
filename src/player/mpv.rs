use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::player::ipc::{MpvIpc, generate_socket_path};
use crate::player::{MediaElement, MediaSignal, SignalSink, SubscriptionId, TaggedSignal};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const STARTUP_POLL: Duration = Duration::from_millis(50);
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
/// Consecutive failed connections before the player counts as gone
const MAX_CONNECT_FAILURES: u32 = 8;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

struct Poller {
    stop: Arc<AtomicBool>,
}

/// Property writes made before mpv opens its IPC socket. The first poller tick
/// that reaches mpv applies them in order.
#[derive(Debug)]
struct Startup {
    launched: Instant,
    ready: AtomicBool,
    pending: Mutex<Vec<(&'static str, Value)>>,
}

impl Startup {
    fn new() -> Self {
        Self {
            launched: Instant::now(),
            ready: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn timed_out(&self) -> bool {
        self.launched.elapsed() >= STARTUP_TIMEOUT
    }

    /// Queue a write unless mpv is already up; a later write to the same
    /// property replaces the queued one. Returns whether it was queued.
    fn defer(&self, property: &'static str, value: &Value) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_ready() {
            return false;
        }
        pending.retain(|(name, _)| *name != property);
        pending.push((property, value.clone()));
        true
    }

    fn flush(&self, ipc: &MpvIpc) -> Result<()> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        ipc.get_property("mpv-version")?;

        while let Some((property, value)) = pending.first().cloned() {
            match ipc.set_property(property, value) {
                Ok(()) => {}
                Err(Error::Io(e)) => return Err(Error::Io(e)),
                Err(e) => warn!(property, error = %e, "mpv rejected deferred property"),
            }
            pending.remove(0);
        }

        self.ready.store(true, Ordering::Release);
        Ok(())
    }
}

/// mpv process driven over its JSON IPC socket
pub struct MpvElement {
    command: String,
    args: Vec<String>,
    child: Option<Child>,
    ipc: Option<Arc<MpvIpc>>,
    startup: Arc<Startup>,
    pollers: HashMap<SubscriptionId, Poller>,
}

impl MpvElement {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            child: None,
            ipc: None,
            startup: Arc::new(Startup::new()),
            pollers: HashMap::new(),
        }
    }

    /// Check if mpv is still running
    pub fn is_running(&mut self) -> bool {
        if let Some(ref mut child) = self.child {
            match child.try_wait() {
                Ok(Some(_)) => {
                    self.child = None;
                    self.ipc = None;
                    false
                }
                Ok(None) => true,
                Err(_) => false,
            }
        } else {
            false
        }
    }

    fn ipc(&self) -> Result<&MpvIpc> {
        self.ipc
            .as_deref()
            .ok_or_else(|| Error::PlayerIpc("mpv is not running".to_string()))
    }

    /// Write a property now, or queue it until mpv's socket is up
    fn set(&self, property: &'static str, value: impl Into<Value>) -> Result<()> {
        let ipc = self.ipc()?;
        let value = value.into();

        if self.startup.defer(property, &value) {
            debug!(property, "Deferring until mpv is ready");
            return Ok(());
        }
        ipc.set_property(property, value)
    }

    /// Spawn mpv and return without waiting for its socket; the signal poller
    /// picks up readiness
    fn launch(&mut self, url: &str) -> Result<()> {
        let socket_path = generate_socket_path(NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed));
        let mut cmd = Command::new(&self.command);

        // Keep mpv output away from the TUI
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        cmd.arg(format!("--input-ipc-server={}", socket_path.display()));
        cmd.arg("--pause");
        cmd.arg("--keep-open=yes");
        cmd.arg("--force-window=yes");
        for arg in &self.args {
            cmd.arg(arg);
        }
        cmd.arg(url);

        debug!(url = %url, socket = %socket_path.display(), "Launching mpv");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::PlayerNotFound(self.command.clone())
            } else {
                Error::PlayerLaunch(e.to_string())
            }
        })?;

        info!(url = %url, "mpv started");
        self.child = Some(child);
        self.ipc = Some(Arc::new(MpvIpc::new(socket_path)));
        self.startup = Arc::new(Startup::new());
        Ok(())
    }

    fn stop_pollers(&mut self) {
        for (_, poller) in self.pollers.drain() {
            poller.stop.store(true, Ordering::Relaxed);
        }
    }

    fn shutdown(&mut self) {
        self.stop_pollers();
        self.ipc = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("mpv already exited: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl MediaElement for MpvElement {
    fn load(&mut self, url: &str) -> Result<()> {
        // A player that never came up is replaced rather than reused
        if !self.is_running() || !self.startup.is_ready() {
            self.shutdown();
            return self.launch(url);
        }

        let ipc = self.ipc()?;
        ipc.command(&[Value::from("loadfile"), Value::from(url), Value::from("replace")])?;
        ipc.set_property("pause", true)?;
        debug!(url = %url, "Loaded new source into mpv");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        // Playing from the end starts over, like a browser video element
        if self.startup.is_ready() && self.ipc()?.get_bool("eof-reached") == Some(true) {
            self.set("time-pos", 0.0)?;
        }
        self.set("pause", false)
    }

    fn pause(&mut self) -> Result<()> {
        self.set("pause", true)
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.set("volume", volume * 100.0)
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.set("mute", muted)
    }

    fn position(&self) -> Result<f64> {
        Ok(self.ipc()?.get_f64("time-pos").unwrap_or(0.0))
    }

    fn set_position(&mut self, seconds: f64) -> Result<()> {
        // mpv reads negative positions as offsets from the end
        self.set("time-pos", seconds.max(0.0))
    }

    fn is_fullscreen(&self) -> Result<bool> {
        Ok(self.ipc()?.get_bool("fullscreen").unwrap_or(false))
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        self.set("fullscreen", true)
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.set("fullscreen", false)
    }

    fn subscribe(&mut self, id: SubscriptionId, sink: SignalSink) -> Result<()> {
        let ipc = self
            .ipc
            .clone()
            .ok_or_else(|| Error::PlayerIpc("mpv is not running".to_string()))?;
        let startup = self.startup.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        thread::Builder::new()
            .name(format!("mpv-signals-{}", id.0))
            .spawn(move || poll_signals(&ipc, &startup, id, &sink, &thread_stop))?;

        if let Some(previous) = self.pollers.insert(id, Poller { stop }) {
            previous.stop.store(true, Ordering::Relaxed);
        }
        Ok(())
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(poller) = self.pollers.remove(&id) {
            poller.stop.store(true, Ordering::Relaxed);
        }
    }
}

impl Drop for MpvElement {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn poll_signals(
    ipc: &MpvIpc,
    startup: &Startup,
    id: SubscriptionId,
    sink: &SignalSink,
    stop: &AtomicBool,
) {
    let mut tracker = SignalTracker::default();

    while !stop.load(Ordering::Relaxed) {
        if !startup.is_ready() {
            match startup.flush(ipc) {
                Ok(()) => debug!("mpv IPC ready"),
                Err(e) if startup.timed_out() => {
                    warn!(error = %e, "mpv never opened its IPC socket");
                    let _ = sink.send(TaggedSignal {
                        subscription: id,
                        signal: MediaSignal::Closed,
                    });
                    return;
                }
                Err(_) => {
                    thread::sleep(STARTUP_POLL);
                    continue;
                }
            }
        }

        let signals = match read_snapshot(ipc) {
            Ok(snapshot) => tracker.observe(snapshot),
            Err(Error::Io(e)) => {
                debug!("mpv unreachable: {}", e);
                tracker.connection_failed().into_iter().collect()
            }
            Err(e) => {
                debug!("mpv poll failed: {}", e);
                Vec::new()
            }
        };

        for signal in signals {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            if sink
                .send(TaggedSignal {
                    subscription: id,
                    signal,
                })
                .is_err()
            {
                return;
            }
            if signal == MediaSignal::Closed {
                warn!("mpv exited, stopping signal poller");
                return;
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}

fn read_snapshot(ipc: &MpvIpc) -> Result<Snapshot> {
    // `pause` is always available while mpv runs, so it doubles as the liveness check
    let paused = ipc.get_property("pause")?.as_bool();
    Ok(Snapshot {
        paused,
        eof: ipc.get_bool("eof-reached"),
        time_pos: ipc.get_f64("time-pos"),
        duration: ipc.get_f64("duration"),
    })
}

#[derive(Debug, Clone, Copy, Default)]
struct Snapshot {
    paused: Option<bool>,
    eof: Option<bool>,
    time_pos: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Transport {
    Playing,
    Paused,
    Ended,
}

/// Turns polled property snapshots into change signals
#[derive(Debug, Default)]
struct SignalTracker {
    transport: Option<Transport>,
    time_pos: Option<f64>,
    duration: Option<f64>,
    connect_failures: u32,
}

impl SignalTracker {
    fn observe(&mut self, snapshot: Snapshot) -> Vec<MediaSignal> {
        self.connect_failures = 0;
        let mut signals = Vec::new();

        if let Some(duration) = snapshot.duration {
            if self.duration != Some(duration) {
                self.duration = Some(duration);
                signals.push(MediaSignal::MetadataLoaded(duration));
            }
        }

        if let Some(t) = snapshot.time_pos {
            if self.time_pos != Some(t) {
                self.time_pos = Some(t);
                signals.push(MediaSignal::TimeProgress(t));
            }
        }

        let transport = match (snapshot.eof, snapshot.paused) {
            (Some(true), _) => Some(Transport::Ended),
            (_, Some(true)) => Some(Transport::Paused),
            (_, Some(false)) => Some(Transport::Playing),
            _ => None,
        };
        if let Some(transport) = transport {
            if self.transport != Some(transport) {
                self.transport = Some(transport);
                signals.push(match transport {
                    Transport::Playing => MediaSignal::Started,
                    Transport::Paused => MediaSignal::Paused,
                    Transport::Ended => MediaSignal::Ended,
                });
            }
        }

        signals
    }

    fn connection_failed(&mut self) -> Option<MediaSignal> {
        self.connect_failures += 1;
        (self.connect_failures == MAX_CONNECT_FAILURES).then_some(MediaSignal::Closed)
    }
}
