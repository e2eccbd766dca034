pub mod controller;
pub mod ipc;
pub mod mpv;
pub mod sources;

use tokio::sync::mpsc;

use crate::error::Result;

pub use controller::{PlaybackController, PlaybackState, PlaybackStatus, format_time};
pub use mpv::MpvElement;
pub use sources::{SourceResolver, SourceTable};

/// Events the media element emits on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaSignal {
    TimeProgress(f64),
    MetadataLoaded(f64),
    Started,
    Paused,
    Ended,
    /// The element went away (player window closed)
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedSignal {
    pub subscription: SubscriptionId,
    pub signal: MediaSignal,
}

pub type SignalSink = mpsc::UnboundedSender<TaggedSignal>;

/// A playable media surface the controller can drive.
pub trait MediaElement {
    fn load(&mut self, url: &str) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// `volume` in [0, 1]
    fn set_volume(&mut self, volume: f64) -> Result<()>;

    fn set_muted(&mut self, muted: bool) -> Result<()>;

    /// Current playback position in seconds
    fn position(&self) -> Result<f64>;

    fn set_position(&mut self, seconds: f64) -> Result<()>;

    fn is_fullscreen(&self) -> Result<bool>;

    fn request_fullscreen(&mut self) -> Result<()>;

    fn exit_fullscreen(&mut self) -> Result<()>;

    /// Start delivering signals to `sink`, tagged with `id`
    fn subscribe(&mut self, id: SubscriptionId, sink: SignalSink) -> Result<()>;

    fn unsubscribe(&mut self, id: SubscriptionId);
}
