// Audio output using cpal
// The stream lives on its own thread; the mixer is shared with its callback

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::{Result, SoundboardError};
use super::mixer::Mixer;

pub struct AudioOutput {
    sample_rate: u32,
    channels: u16,
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AudioOutput {
    /// Open the default output device and start mixing into it
    pub fn new(mixer: Arc<Mutex<Mixer>>) -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(u32, u16)>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("soundboard-output".into())
            .spawn(move || {
                let stream = match Self::open_stream(mixer) {
                    Ok((stream, format)) => {
                        let _ = ready_tx.send(Ok(format));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Keep the stream alive until the engine goes away
                let _ = shutdown_rx.recv();
                drop(stream);
                log::debug!("Audio output stream closed");
            })
            .map_err(|e| SoundboardError::Device(format!("Failed to spawn output thread: {}", e)))?;

        let (sample_rate, channels) = ready_rx
            .recv()
            .map_err(|_| SoundboardError::Device("Output thread exited before start".into()))??;

        log::info!("Audio output started: {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            sample_rate,
            channels,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    fn open_stream(mixer: Arc<Mutex<Mixer>>) -> Result<(Stream, (u32, u16))> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| SoundboardError::Device("No output device available".into()))?;

        let config = device
            .default_output_config()
            .map_err(|e| SoundboardError::Device(format!("Failed to get default output config: {}", e)))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(&device, &config.into(), mixer)?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(&device, &config.into(), mixer)?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(&device, &config.into(), mixer)?,
            format => {
                return Err(SoundboardError::Device(format!(
                    "Unsupported sample format: {:?}",
                    format
                )))
            }
        };

        stream
            .play()
            .map_err(|e| SoundboardError::Device(format!("Failed to start stream: {}", e)))?;

        Ok((stream, (sample_rate, channels)))
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        mixer: Arc<Mutex<Mixer>>,
    ) -> Result<Stream> {
        let channels = config.channels as usize;
        let mut scratch: Vec<f32> = Vec::new();

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    mixer.lock().render(&mut scratch, channels);

                    for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                        *out = T::from_sample(sample);
                    }
                },
                move |err| {
                    log::error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| SoundboardError::Device(format!("Failed to build output stream: {}", e)))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
