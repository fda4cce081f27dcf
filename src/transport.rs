use nih_plug::prelude::Transport;

use crate::analysis_data::SnapshotPublisher;

/// What the host tells us about its transport.
pub trait HostTransport {
    /// The host's play state, or `None` when the host does not report a playhead position.
    fn playing(&self) -> Option<bool>;
}

impl HostTransport for Transport {
    fn playing(&self) -> Option<bool> {
        let has_position = self.pos_samples().is_some()
            || self.pos_seconds().is_some()
            || self.pos_beats().is_some();

        has_position.then_some(self.playing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportState {
    pub playing: bool,
    pub input_connected: bool,
}

impl TransportState {
    pub fn resolve(transport: Option<&impl HostTransport>, input_channels: usize) -> Self {
        Self {
            playing: transport.and_then(|t| t.playing()).unwrap_or(false),
            input_connected: input_channels > 0,
        }
    }
}

/// Mirrors the host's playback and connection state into the snapshot once per cycle. The flags
/// are only stored when they change.
#[derive(Default)]
pub struct TransportMonitor {
    last: TransportState,
}

impl TransportMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(
        &mut self,
        transport: Option<&impl HostTransport>,
        input_channels: usize,
        publisher: &SnapshotPublisher,
    ) -> TransportState {
        let state = TransportState::resolve(transport, input_channels);
        // the snapshot flags start out matching `TransportState::default()`
        if state != self.last {
            publisher.set_transport(state.playing, state.input_connected);
            self.last = state;
        }

        state
    }
}
