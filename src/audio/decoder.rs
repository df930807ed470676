// Audio decoder using Symphonia
// Decodes a whole clip to interleaved f32 PCM

use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Result, SoundboardError};

/// Fully decoded clip held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct ClipBuffer {
    /// Interleaved samples
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl ClipBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / self.sample_rate as f64
        }
    }
}

pub struct AudioDecoder {
    path: PathBuf,
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| SoundboardError::io(path, e))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| SoundboardError::decode(path, format!("probe failed: {}", e)))?;

        let format = probed.format;

        // Find the first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| SoundboardError::decode(path, "no audio track found"))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| SoundboardError::decode(path, format!("no decoder: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
        })
    }

    /// Decode next packet, returns interleaved f32 samples.
    /// Returns None at end of stream.
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(SoundboardError::decode(&self.path, format!("read failed: {}", e)))
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    // The actual channel layout wins over the container's guess
                    self.channels = decoded.spec().channels.count();
                    self.sample_rate = decoded.spec().rate;

                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    buf.copy_interleaved_ref(decoded);
                    return Ok(Some(buf.samples().to_vec()));
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Decode error in {:?} (skipping packet): {}", self.path, e);
                    continue;
                }
                Err(e) => {
                    return Err(SoundboardError::decode(&self.path, format!("decode failed: {}", e)))
                }
            }
        }
    }

    /// Decode the remainder of the stream into memory
    pub fn decode_all(mut self) -> Result<ClipBuffer> {
        let mut samples = Vec::new();
        while let Some(chunk) = self.decode_next()? {
            samples.extend_from_slice(&chunk);
        }

        if samples.is_empty() {
            return Err(SoundboardError::decode(&self.path, "no audio frames"));
        }

        Ok(ClipBuffer {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels.max(1),
        })
    }
}

/// Open and decode a clip in one step
pub fn decode_file(path: &Path) -> Result<ClipBuffer> {
    AudioDecoder::open(path)?.decode_all()
}
