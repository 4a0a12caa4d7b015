use std::path::Path;

use super::{DeviceError, Recorder};

/// Stand-in when no input device can be used; opening always fails
#[derive(Debug, Clone)]
pub struct NoMicrophone {
    reason: String,
}

impl NoMicrophone {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn open(&self) -> Result<Box<dyn Recorder>, DeviceError> {
        Err(DeviceError::Unavailable(self.reason.clone()))
    }
}

#[cfg(feature = "audio")]
pub fn default_microphone(recordings_dir: &Path) -> Result<Box<dyn Recorder>, DeviceError> {
    Ok(Box::new(cpal_recorder::CpalRecorder::open(recordings_dir)?))
}

#[cfg(not(feature = "audio"))]
pub fn default_microphone(_recordings_dir: &Path) -> Result<Box<dyn Recorder>, DeviceError> {
    NoMicrophone::new("built without audio support").open()
}

#[cfg(feature = "audio")]
mod cpal_recorder {
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

    use crate::devices::{DeviceError, Recorder, Recording};

    fn encode_error(e: hound::Error) -> DeviceError {
        DeviceError::Encode(e.to_string())
    }

    /// 16-bit WAV file filled as samples arrive, so memory stays flat for long sessions
    pub(super) struct WavSink {
        path: PathBuf,
        channels: u16,
        sample_rate: u32,
        writer: hound::WavWriter<BufWriter<File>>,
        samples: usize,
        error: Option<String>,
    }

    impl WavSink {
        pub(super) fn create(
            path: PathBuf,
            channels: u16,
            sample_rate: u32,
        ) -> Result<Self, DeviceError> {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let spec = hound::WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let writer = hound::WavWriter::create(&path, spec).map_err(encode_error)?;
            Ok(Self {
                path,
                channels,
                sample_rate,
                writer,
                samples: 0,
                error: None,
            })
        }

        pub(super) fn push(&mut self, samples: impl IntoIterator<Item = f32>) {
            if self.error.is_some() {
                return;
            }
            for s in samples {
                let value = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                if let Err(e) = self.writer.write_sample(value) {
                    tracing::error!("recording write failed: {e}");
                    self.error = Some(e.to_string());
                    return;
                }
                self.samples += 1;
            }
        }

        /// Finalize the file; an empty take is deleted and yields `None`
        pub(super) fn finish(self) -> Result<Option<Recording>, DeviceError> {
            let Self {
                path,
                channels,
                sample_rate,
                writer,
                samples,
                error,
            } = self;
            writer.finalize().map_err(encode_error)?;
            if let Some(e) = error {
                return Err(DeviceError::Encode(e));
            }
            if samples == 0 {
                if let Err(e) = std::fs::remove_file(&path) {
                    tracing::warn!("could not remove empty recording: {e}");
                }
                return Ok(None);
            }

            let frames = samples / usize::from(channels.max(1));
            let duration = Duration::from_secs_f64(frames as f64 / f64::from(sample_rate.max(1)));
            Ok(Some(Recording {
                path: Some(path),
                duration,
                samples,
            }))
        }
    }

    type Sink = Arc<Mutex<Option<WavSink>>>;

    /// Default input device captured through cpal, written out as 16-bit WAV
    pub struct CpalRecorder {
        device: Device,
        config: StreamConfig,
        format: SampleFormat,
        recordings_dir: PathBuf,
        sink: Sink,
        capturing: Arc<AtomicBool>,
        stream: Option<Stream>,
    }

    impl CpalRecorder {
        pub fn open(recordings_dir: &Path) -> Result<Self, DeviceError> {
            let host = cpal::default_host();
            tracing::debug!("audio host: {:?}", host.id());
            let device = host
                .default_input_device()
                .ok_or_else(|| DeviceError::Unavailable("no default input device".to_string()))?;
            let supported = device
                .default_input_config()
                .map_err(|e| DeviceError::PermissionDenied(e.to_string()))?;
            if let Ok(name) = device.name() {
                tracing::info!(
                    "microphone: {name} ({}ch, {}hz)",
                    supported.channels(),
                    supported.sample_rate().0
                );
            }

            Ok(Self {
                format: supported.sample_format(),
                config: supported.config(),
                device,
                recordings_dir: recordings_dir.to_path_buf(),
                sink: Arc::default(),
                capturing: Arc::new(AtomicBool::new(false)),
                stream: None,
            })
        }

        fn build_stream<T>(&self) -> Result<Stream, DeviceError>
        where
            T: SizedSample,
            f32: FromSample<T>,
        {
            let sink = Arc::clone(&self.sink);
            let capturing = Arc::clone(&self.capturing);
            self.device
                .build_input_stream(
                    &self.config,
                    move |data: &[T], _: &cpal::InputCallbackInfo| {
                        if !capturing.load(Ordering::Relaxed) {
                            return;
                        }
                        if let Ok(mut guard) = sink.lock() {
                            if let Some(wav) = guard.as_mut() {
                                wav.push(data.iter().map(|s| s.to_sample::<f32>()));
                            }
                        }
                    },
                    move |err| tracing::error!("input stream error: {err}"),
                    None,
                )
                .map_err(|e| DeviceError::Stream(e.to_string()))
        }

        fn take_sink(&self) -> Result<Option<WavSink>, DeviceError> {
            self.sink
                .lock()
                .map(|mut guard| guard.take())
                .map_err(|_| DeviceError::Stream("recording sink poisoned".to_string()))
        }
    }

    impl Recorder for CpalRecorder {
        fn start(&mut self) -> Result<(), DeviceError> {
            let name = format!(
                "session-{}.wav",
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            );
            let wav = WavSink::create(
                self.recordings_dir.join(name),
                self.config.channels,
                self.config.sample_rate.0,
            )?;
            match self.sink.lock() {
                Ok(mut guard) => *guard = Some(wav),
                Err(_) => return Err(DeviceError::Stream("recording sink poisoned".to_string())),
            }

            let stream = match self.format {
                SampleFormat::F32 => self.build_stream::<f32>()?,
                SampleFormat::I16 => self.build_stream::<i16>()?,
                SampleFormat::U16 => self.build_stream::<u16>()?,
                other => {
                    return Err(DeviceError::Stream(format!(
                        "unsupported sample format {other:?}"
                    )))
                }
            };
            stream
                .play()
                .map_err(|e| DeviceError::Stream(e.to_string()))?;
            self.capturing.store(true, Ordering::Relaxed);
            self.stream = Some(stream);
            Ok(())
        }

        fn pause(&mut self) {
            self.capturing.store(false, Ordering::Relaxed);
            if let Some(stream) = &self.stream {
                if let Err(e) = stream.pause() {
                    tracing::warn!("could not pause input stream: {e}");
                }
            }
        }

        fn resume(&mut self) {
            if let Some(stream) = &self.stream {
                if let Err(e) = stream.play() {
                    tracing::warn!("could not resume input stream: {e}");
                    return;
                }
                self.capturing.store(true, Ordering::Relaxed);
            }
        }

        fn stop(&mut self) -> Result<Option<Recording>, DeviceError> {
            self.capturing.store(false, Ordering::Relaxed);
            // dropping the stream ends the callbacks before the file is finalized
            if self.stream.take().is_none() {
                return Ok(None);
            }

            let Some(wav) = self.take_sink()? else {
                return Ok(None);
            };
            let recording = wav.finish()?;
            if let Some(path) = recording.as_ref().and_then(|r| r.path.as_ref()) {
                tracing::info!("saved recording to {}", path.display());
            }
            Ok(recording)
        }
    }

    impl Drop for CpalRecorder {
        fn drop(&mut self) {
            self.capturing.store(false, Ordering::Relaxed);
            self.stream.take();
            if let Ok(Some(wav)) = self.take_sink() {
                if let Err(e) = wav.finish() {
                    tracing::warn!("could not finalize recording: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_no_microphone_reports_reason() {
        let result = NoMicrophone::new("recording disabled").open();
        assert_matches!(result.err(), Some(DeviceError::Unavailable(reason)) if reason == "recording disabled");
    }
}
