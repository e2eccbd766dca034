//! Playback state mirrored from a media element, plus the transport commands
//! the player view sends to it.
//!
//! The element is authoritative: native signals overwrite local state. A
//! play/pause toggle is recorded as a pending intent so the controls react
//! immediately; the next start/pause/end signal replaces it.

use tracing::{debug, info};

use crate::error::Result;
use crate::player::{MediaElement, MediaSignal, SignalSink, SubscriptionId, TaggedSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Paused,
    Playing,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Requested play (`true`) or pause (`false`) not yet confirmed by the element
    pub pending_play: Option<bool>,
    /// In [0, 1]
    pub volume: f64,
    pub muted: bool,
    pub current_time: f64,
    /// 0 until the element reports it
    pub duration: f64,
}

impl PlaybackState {
    fn new(volume: f64) -> Self {
        Self {
            status: PlaybackStatus::Paused,
            pending_play: None,
            volume: clamp_unit(volume),
            muted: false,
            current_time: 0.0,
            duration: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.pending_play
            .unwrap_or(self.status == PlaybackStatus::Playing)
    }

    pub fn is_ended(&self) -> bool {
        self.pending_play.is_none() && self.status == PlaybackStatus::Ended
    }

    /// Muted, or volume all the way down
    pub fn is_silent(&self) -> bool {
        self.muted || self.volume == 0.0
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    fn reset_media(&mut self) {
        self.status = PlaybackStatus::Paused;
        self.pending_play = None;
        self.current_time = 0.0;
        self.duration = 0.0;
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

pub struct PlaybackController<E: MediaElement> {
    state: PlaybackState,
    element: Option<E>,
    source: Option<String>,
    subscription: Option<SubscriptionId>,
    next_subscription: u64,
    sink: SignalSink,
}

impl<E: MediaElement> PlaybackController<E> {
    pub fn new(sink: SignalSink, volume: f64) -> Self {
        Self {
            state: PlaybackState::new(volume),
            element: None,
            source: None,
            subscription: None,
            next_subscription: 0,
            sink,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    /// Attach to `element` and load `url` into it. Any previously bound element
    /// is detached and dropped first.
    pub fn bind(&mut self, mut element: E, url: &str) -> Result<()> {
        self.unbind();

        element.load(url)?;
        self.state.reset_media();
        self.element = Some(element);
        self.source = Some(url.to_string());
        info!(url = %url, "Bound media element");

        self.attach()
    }

    /// Detach the signal subscription, push volume and mute again, re-subscribe
    pub fn rebind(&mut self) -> Result<()> {
        self.detach();
        self.attach()
    }

    /// Detach and drop the bound element
    pub fn unbind(&mut self) {
        self.release();
    }

    /// Detach and hand the element back so it can be bound to another source
    pub fn release(&mut self) -> Option<E> {
        self.detach();
        self.source = None;
        self.state.reset_media();
        self.element.take()
    }

    fn attach(&mut self) -> Result<()> {
        let Some(element) = self.element.as_mut() else {
            return Ok(());
        };

        element.set_volume(self.state.volume)?;
        element.set_muted(self.state.muted)?;

        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        element.subscribe(id, self.sink.clone())?;
        self.subscription = Some(id);
        debug!(subscription = id.0, "Subscribed to media signals");
        Ok(())
    }

    fn detach(&mut self) {
        if let Some(id) = self.subscription.take() {
            if let Some(element) = self.element.as_mut() {
                element.unsubscribe(id);
                debug!(subscription = id.0, "Unsubscribed from media signals");
            }
        }
    }

    /// Apply a native signal. Signals from a detached subscription are ignored;
    /// returns whether the signal was applied.
    pub fn handle_signal(&mut self, tagged: TaggedSignal) -> bool {
        if self.subscription != Some(tagged.subscription) {
            return false;
        }

        match tagged.signal {
            MediaSignal::TimeProgress(t) => {
                let t = non_negative(t);
                self.state.current_time = if self.state.duration > 0.0 {
                    t.min(self.state.duration)
                } else {
                    t
                };
            }
            MediaSignal::MetadataLoaded(d) => {
                self.state.duration = non_negative(d);
                if self.state.duration > 0.0 {
                    self.state.current_time = self.state.current_time.min(self.state.duration);
                }
            }
            MediaSignal::Started => {
                self.state.status = PlaybackStatus::Playing;
                self.state.pending_play = None;
            }
            MediaSignal::Paused => {
                self.state.status = PlaybackStatus::Paused;
                self.state.pending_play = None;
            }
            MediaSignal::Ended => {
                self.state.status = PlaybackStatus::Ended;
                self.state.pending_play = None;
            }
            MediaSignal::Closed => {
                info!("Media element closed");
                self.unbind();
            }
        }
        true
    }

    pub fn toggle_play_pause(&mut self) -> Result<()> {
        let Some(element) = self.element.as_mut() else {
            return Ok(());
        };

        let playing = self.state.is_playing();
        if playing {
            element.pause()?;
        } else {
            element.play()?;
        }
        self.state.pending_play = Some(!playing);
        Ok(())
    }

    /// Set volume as a fraction in [0, 1]. Any non-zero volume also unmutes.
    pub fn set_volume(&mut self, fraction: f64) -> Result<()> {
        let volume = clamp_unit(fraction);
        self.state.volume = volume;
        if volume > 0.0 {
            self.state.muted = false;
        }
        self.rebind()
    }

    /// Set volume from a 0-100 slider value
    pub fn set_volume_percent(&mut self, percent: u8) -> Result<()> {
        self.set_volume(f64::from(percent.min(100)) / 100.0)
    }

    /// Step the volume by `delta` percentage points
    pub fn adjust_volume(&mut self, delta: i16) -> Result<()> {
        let current = (self.state.volume * 100.0).round() as i16;
        let percent = (current + delta).clamp(0, 100) as u8;
        self.set_volume_percent(percent)
    }

    pub fn toggle_mute(&mut self) -> Result<()> {
        self.state.muted = !self.state.muted;
        self.rebind()
    }

    /// Jump to `percent` (0-100) of the known duration
    pub fn seek(&mut self, percent: f64) -> Result<()> {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let target = percent / 100.0 * self.state.duration;

        if let Some(element) = self.element.as_mut() {
            element.set_position(target)?;
        }
        self.state.current_time = target;
        Ok(())
    }

    /// Move the element's position by `delta` seconds. Boundary clamping is left
    /// to the element.
    pub fn skip(&mut self, delta: f64) -> Result<()> {
        let Some(element) = self.element.as_mut() else {
            return Ok(());
        };

        let position = element.position()?;
        element.set_position(position + delta)
    }

    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        let Some(element) = self.element.as_mut() else {
            return Ok(());
        };

        if element.is_fullscreen()? {
            element.exit_fullscreen()
        } else {
            element.request_fullscreen()
        }
    }
}

impl<E: MediaElement> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.detach();
    }
}

/// `M:SS`, whole minutes and zero-padded whole seconds
pub fn format_time(seconds: f64) -> String {
    let total = non_negative(seconds).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
