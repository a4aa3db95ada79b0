//! `rodio`-backed [`AudioOutput`].
//!
//! Local files are decoded straight from disk; URL sources are downloaded
//! into memory first (preview clips are short) and decoded from there.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::backend::resolve_url;
use crate::library::TrackSource;

use super::output::{AudioOutput, OutputError};

pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,
    ended_reported: bool,
    http: reqwest::blocking::Client,
    base_url: Option<String>,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn open(base_url: Option<String>, fetch_timeout: Duration) -> Result<Self, OutputError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| OutputError::Device(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        let http = reqwest::blocking::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| OutputError::Device(e.to_string()))?;

        Ok(Self {
            stream,
            sink: None,
            duration: None,
            volume: 1.0,
            ended_reported: false,
            http,
            base_url,
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, OutputError> {
        let url = resolve_url(self.base_url.as_deref(), url)
            .ok_or_else(|| OutputError::Unresolved(url.to_string()))?;
        log::debug!("fetching {url}");

        let fetch_err = |source| OutputError::Fetch {
            url: url.clone(),
            source,
        };
        let bytes = self
            .http
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(fetch_err)?;
        Ok(bytes.to_vec())
    }

    /// Create a paused `Sink` holding `source`, returning it with the source's length if known.
    fn open_sink(&self, source: &TrackSource) -> Result<(Sink, Option<Duration>), OutputError> {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();

        let duration = match source {
            TrackSource::File(path) => {
                let file = File::open(path).map_err(|source| OutputError::Open {
                    path: path.clone(),
                    source,
                })?;
                let decoder = Decoder::new(BufReader::new(file))
                    .map_err(|e| OutputError::Decode(e.to_string()))?;
                let total = decoder.total_duration().or_else(|| {
                    lofty::read_from_path(path)
                        .ok()
                        .map(|f| f.properties().duration())
                });
                sink.append(decoder);
                total
            }
            TrackSource::Url(url) => {
                let bytes = self.fetch(url)?;
                let probed = probe_duration(&bytes);
                let decoder = Decoder::new(Cursor::new(bytes))
                    .map_err(|e| OutputError::Decode(e.to_string()))?;
                let total = decoder.total_duration().or(probed);
                sink.append(decoder);
                total
            }
        };

        Ok((sink, duration.filter(|d| !d.is_zero())))
    }
}

fn probe_duration(bytes: &[u8]) -> Option<Duration> {
    lofty::probe::Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()?
        .read()
        .ok()
        .map(|f| f.properties().duration())
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, source: &TrackSource) -> Result<(), OutputError> {
        let (sink, duration) = self.open_sink(source)?;
        sink.set_volume(self.volume);

        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.sink = Some(sink);
        self.duration = duration;
        self.ended_reported = false;
        Ok(())
    }

    fn play(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_position(&mut self, position: Duration) {
        if let Some(s) = &self.sink {
            if let Err(e) = s.try_seek(position) {
                log::warn!("seek to {position:?} failed: {e}");
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = &self.sink {
            s.set_volume(volume);
        }
    }

    fn take_ended(&mut self) -> bool {
        let Some(s) = &self.sink else {
            return false;
        };
        if self.ended_reported || s.is_paused() || !s.empty() {
            return false;
        }
        self.ended_reported = true;
        true
    }
}
