use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{self, Sender};
use nih_plug::{nih_log, nih_warn};
use serde::Serialize;

use crate::{
    analysis_data::{AnalysisSnapshot, SnapshotReader},
    errors::FeedError,
};

/// Display refresh rate.
pub const POLL_RATE_HZ: f32 = 60.0;

/// The payload handed to the display on every poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDataMessage {
    pub fft_data: Vec<f32>,
    pub average_amplitude: f32,
    pub sample_rate: f32,
    pub is_playing: bool,
    pub is_input_connected: bool,
}

impl AudioDataMessage {
    pub fn from_snapshot(snapshot: &AnalysisSnapshot<'_>) -> Self {
        Self {
            fft_data: snapshot.spectrum().to_vec(),
            average_amplitude: snapshot.avg_amplitude(),
            sample_rate: snapshot.sample_rate(),
            is_playing: snapshot.is_playing(),
            is_input_connected: snapshot.is_input_connected(),
        }
    }

    pub fn to_json(&self) -> Result<String, FeedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wraps the payload in the callback the web display registers.
    pub fn to_script_call(&self) -> Result<String, FeedError> {
        Ok(format!("window.audioDataCallback({});", self.to_json()?))
    }
}

/// Receives every polled snapshot.
pub trait SnapshotSink: Send + 'static {
    fn deliver(&mut self, message: &AudioDataMessage);
}

impl<F> SnapshotSink for F
where
    F: FnMut(&AudioDataMessage) + Send + 'static,
{
    fn deliver(&mut self, message: &AudioDataMessage) {
        self(message)
    }
}

/// Polls one `SnapshotReader` at a fixed rate on its own thread. The thread stops when the feed is
/// stopped or dropped.
pub struct SnapshotFeed {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotFeed {
    pub fn spawn(
        reader: SnapshotReader,
        rate_hz: f32,
        mut sink: impl SnapshotSink,
    ) -> Result<Self, FeedError> {
        // NaN, non-positive and overflowing rates all fail the conversion, absurdly high ones
        // round down to a zero period
        let period = Duration::try_from_secs_f32(1.0 / rate_hz)
            .ok()
            .filter(|period| !period.is_zero())
            .ok_or(FeedError::InvalidRate(rate_hz))?;

        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let ticker = channel::tick(period);

        let handle = thread::Builder::new()
            .name(String::from("snapshot-feed"))
            .spawn(move || {
                nih_log!("snapshot feed started at {} Hz", rate_hz);
                loop {
                    crossbeam::select! {
                        recv(ticker) -> _ => poll(&reader, &mut sink),
                        recv(stop_rx) -> _ => break,
                    }
                }
                nih_log!("snapshot feed stopped");
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops polling and waits for the feed thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // disconnecting the stop channel wakes the select
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                nih_warn!("snapshot feed thread panicked");
            }
        }
    }
}

impl Drop for SnapshotFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One poll. Stale snapshots are delivered too; the display keeps showing the last block.
fn poll(reader: &SnapshotReader, sink: &mut impl SnapshotSink) {
    match reader.read(|snapshot| AudioDataMessage::from_snapshot(&snapshot)) {
        Ok(message) => sink.deliver(&message),
        Err(err) => nih_warn!("skipping snapshot poll: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{analysis_data::snapshot_channel, fft_core::fft_size::FFTSize};

    #[test]
    fn message_uses_display_keys() {
        let (mut publisher, reader) = snapshot_channel(FFTSize::_256, 48000.0);
        let mut spectrum = vec![0.0f32; 128];
        spectrum[1] = 4.0;
        publisher.publish(&spectrum, 0.5);
        publisher.set_transport(true, false);

        let message = reader.read(|s| AudioDataMessage::from_snapshot(&s)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        assert_eq!(json["fftData"].as_array().unwrap().len(), 128);
        assert_eq!(json["fftData"][1], 4.0);
        assert_eq!(json["averageAmplitude"], 0.5);
        assert_eq!(json["sampleRate"], 48000.0);
        assert_eq!(json["isPlaying"], true);
        assert_eq!(json["isInputConnected"], false);
    }

    #[test]
    fn script_call_wraps_json() {
        let message = AudioDataMessage {
            fft_data: vec![1.0, 2.0],
            average_amplitude: 1.5,
            sample_rate: 44100.0,
            is_playing: false,
            is_input_connected: true,
        };

        let call = message.to_script_call().unwrap();
        assert!(call.starts_with("window.audioDataCallback({"));
        assert!(call.ends_with("});"));
        assert!(call.contains("\"fftData\":[1.0,2.0]"));
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let (_publisher, reader) = snapshot_channel(FFTSize::_256, 48000.0);
        for rate in [0.0, -60.0, f32::NAN, f32::INFINITY, 1e-39, 1e12, f32::MAX] {
            let result = SnapshotFeed::spawn(reader.clone(), rate, |_: &AudioDataMessage| {});
            assert!(matches!(result, Err(FeedError::InvalidRate(_))));
        }
    }

    #[test]
    fn feed_delivers_latest_snapshot_and_stops() {
        let (mut publisher, reader) = snapshot_channel(FFTSize::_256, 48000.0);
        publisher.publish(&vec![3.0f32; 128], 3.0);

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_received = received.clone();
        let feed = SnapshotFeed::spawn(reader, 500.0, move |message: &AudioDataMessage| {
            sink_received.lock().unwrap().push(message.average_amplitude);
        })
        .unwrap();

        let start = std::time::Instant::now();
        while received.lock().unwrap().len() < 3 {
            assert!(start.elapsed() < Duration::from_secs(5), "feed never polled");
            thread::sleep(Duration::from_millis(2));
        }
        feed.stop();

        let count = received.lock().unwrap().len();
        // stale polls repeat the last published block
        assert!(received.lock().unwrap().iter().all(|avg| *avg == 3.0));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(received.lock().unwrap().len(), count);
    }
}
