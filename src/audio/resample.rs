// Conform decoded clips to the output stream format
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{Result, SoundboardError};
use super::decoder::ClipBuffer;

/// Resample and remap channels so the clip can be mixed frame-for-frame
pub fn conform(clip: ClipBuffer, target_rate: u32, target_channels: usize) -> Result<ClipBuffer> {
    let target_channels = target_channels.max(1);
    if clip.sample_rate == target_rate && clip.channels == target_channels {
        return Ok(clip);
    }

    let mut planes = deinterleave(&clip);

    if clip.sample_rate != target_rate && clip.frames() > 0 {
        planes = resample_planes(planes, clip.sample_rate, target_rate)?;
    }

    let planes = remap_channels(planes, target_channels);

    Ok(ClipBuffer {
        samples: interleave(&planes),
        sample_rate: target_rate,
        channels: target_channels,
    })
}

fn deinterleave(clip: &ClipBuffer) -> Vec<Vec<f32>> {
    let frames = clip.frames();
    let mut planes = vec![Vec::with_capacity(frames); clip.channels];
    for frame in clip.samples.chunks_exact(clip.channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            planes[ch].push(sample);
        }
    }
    planes
}

fn interleave(planes: &[Vec<f32>]) -> Vec<f32> {
    let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            out.push(plane[frame]);
        }
    }
    out
}

fn resample_planes(planes: Vec<Vec<f32>>, from: u32, to: u32) -> Result<Vec<Vec<f32>>> {
    let frames = planes.first().map(Vec::len).unwrap_or(0);
    let ratio = to as f64 / from as f64;
    let expected = (frames as f64 * ratio).round() as usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, frames, planes.len())
        .map_err(|e| SoundboardError::Resample(e.to_string()))?;

    log::debug!("Resampling {} frames from {} Hz to {} Hz", frames, from, to);

    let delay = resampler.output_delay();
    let mut out = resampler
        .process(&planes, None)
        .map_err(|e| SoundboardError::Resample(e.to_string()))?;

    // Flush the filter until the tail of the clip has come out
    while out.first().map(Vec::len).unwrap_or(0) < delay + expected {
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| SoundboardError::Resample(e.to_string()))?;
        if tail.first().map(Vec::is_empty).unwrap_or(true) {
            break;
        }
        for (plane, more) in out.iter_mut().zip(tail) {
            plane.extend(more);
        }
    }

    for plane in out.iter_mut() {
        plane.drain(..delay.min(plane.len()));
        plane.truncate(expected);
    }
    Ok(out)
}

fn remap_channels(planes: Vec<Vec<f32>>, target: usize) -> Vec<Vec<f32>> {
    let source = planes.len();
    if source == target || source == 0 {
        return planes;
    }

    if target == 1 {
        // Fold down to mono
        let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
        let scale = 1.0 / source as f32;
        let mono = (0..frames)
            .map(|i| planes.iter().map(|p| p[i]).sum::<f32>() * scale)
            .collect();
        return vec![mono];
    }

    (0..target).map(|ch| planes[ch % source].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(samples: Vec<f32>, sample_rate: u32, channels: usize) -> ClipBuffer {
        ClipBuffer { samples, sample_rate, channels }
    }

    #[test]
    fn test_matching_format_is_untouched() {
        let original = clip(vec![0.1, 0.2, 0.3, 0.4], 48000, 2);
        let out = conform(original.clone(), 48000, 2).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_mono_to_stereo_duplicates() {
        let out = conform(clip(vec![0.1, 0.2, 0.3], 44100, 1), 44100, 2).unwrap();
        assert_eq!(out.channels, 2);
        assert_eq!(out.samples, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let out = conform(clip(vec![0.2, 0.4, -1.0, 1.0], 44100, 2), 44100, 1).unwrap();
        assert_eq!(out.channels, 1);
        assert_eq!(out.frames(), 2);
        assert!((out.samples[0] - 0.3).abs() < 1e-6);
        assert!(out.samples[1].abs() < 1e-6);
    }

    #[test]
    fn test_resample_changes_length_by_ratio() {
        let frames = 22050;
        let samples: Vec<f32> = (0..frames).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let out = conform(clip(samples, 22050, 1), 44100, 1).unwrap();

        assert_eq!(out.sample_rate, 44100);
        assert!(out.frames().abs_diff(frames * 2) <= 1);
        assert!((out.duration_secs() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_resample_keeps_clip_tail() {
        let frames = 2425;
        let burst = 200;
        let samples: Vec<f32> = (0..frames)
            .map(|i| if i >= frames - burst { 1.0 } else { 0.0 })
            .collect();

        let out = conform(clip(samples, 22050, 1), 44100, 1).unwrap();

        assert!(out.frames().abs_diff(frames * 2) <= 1);
        let tail = &out.samples[out.frames() - burst * 2..];
        let peak = tail.iter().cloned().fold(0.0f32, f32::max);
        assert!(peak > 0.9, "tail peak {}", peak);
        // Output is aligned: the silent head stays silent
        assert!(out.samples[..1000].iter().all(|s| s.abs() < 1e-3));
    }
}
