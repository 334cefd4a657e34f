//! Media normalization for uploaded audio and video.
//!
//! Converts arbitrary uploads into the canonical waveform the transcription
//! stage consumes: one channel of f32 samples at the configured rate. WAV
//! files already at the target rate are read directly (multi-channel audio
//! is collapsed by averaging); everything else is decoded through ffmpeg
//! into a scoped temporary WAV.

use crate::error::{OppsumError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Canonical mono waveform produced by normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the waveform in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Normalize an uploaded media file into the canonical waveform.
///
/// Rejects empty files before any decode attempt. A `.wav` file already at
/// the target sample rate is read in place; anything else (other
/// containers, other rates, unreadable WAV headers) goes through ffmpeg.
#[instrument(skip_all, fields(file = %path.display()))]
pub async fn normalize_media(path: &Path, target_sample_rate: u32) -> Result<Waveform> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() == 0 {
        return Err(OppsumError::Validation("Uploaded file is empty".to_string()));
    }

    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);

    if is_wav {
        match read_wav(path) {
            Ok(waveform) if waveform.sample_rate == target_sample_rate => {
                debug!("WAV already at {} Hz, no decode needed", target_sample_rate);
                return Ok(waveform);
            }
            Ok(waveform) => {
                debug!(
                    "WAV at {} Hz, resampling to {} Hz via ffmpeg",
                    waveform.sample_rate, target_sample_rate
                );
            }
            Err(e) => {
                debug!("Direct WAV read failed ({}), falling back to ffmpeg", e);
            }
        }
    }

    decode_with_ffmpeg(path, target_sample_rate).await
}

/// Read a WAV file into a mono waveform, averaging channels sample-wise.
fn read_wav(path: &Path) -> Result<Waveform> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| OppsumError::MediaDecode(format!("Failed to parse WAV file: {}", e)))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(OppsumError::MediaDecode(
            "WAV file reports zero channels".to_string(),
        ));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| OppsumError::MediaDecode(format!("Failed to read WAV samples: {}", e)))?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| OppsumError::MediaDecode(format!("Failed to read WAV samples: {}", e)))?,
    };

    Ok(Waveform {
        samples: average_channels(&interleaved, channels),
        sample_rate: spec.sample_rate,
    })
}

/// Collapse interleaved multi-channel samples to mono by averaging each frame.
fn average_channels(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Decode any container to mono WAV at the target rate, then read it back.
///
/// The intermediate WAV lives in a named temp file that is removed when the
/// guard drops, on success and on every error path.
async fn decode_with_ffmpeg(path: &Path, target_sample_rate: u32) -> Result<Waveform> {
    let wav_file = tempfile::Builder::new()
        .prefix("oppsum-")
        .suffix(".wav")
        .tempfile()?;

    let result = Command::new("ffmpeg")
        .arg("-i").arg(path)
        .arg("-vn")
        .arg("-ac").arg("1")
        .arg("-ar").arg(target_sample_rate.to_string())
        .arg("-f").arg("wav")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(wav_file.path())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(OppsumError::ToolNotFound("ffmpeg".into()));
        }
        Err(e) => {
            return Err(OppsumError::MediaDecode(format!("ffmpeg execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OppsumError::MediaDecode(format!(
            "ffmpeg could not decode the file: {}",
            stderr.trim()
        )));
    }

    read_wav(wav_file.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_wav(dir: &Path, name: &str, sample_rate: u32, channels: u16, samples: &[i16]) -> PathBuf {
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[tokio::test]
    async fn test_canonical_wav_is_read_without_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "mono.wav", 16_000, 1, &[0i16; 80_000]);

        let waveform = normalize_media(&path, 16_000).await.unwrap();

        // A silent 5 s mono WAV at 16 kHz passes through unchanged.
        assert_eq!(waveform.sample_rate, 16_000);
        assert_eq!(waveform.len(), 80_000);
        assert!((waveform.duration_seconds() - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected_before_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp4");
        std::fs::write(&path, b"").unwrap();

        let result = normalize_media(&path, 16_000).await;

        assert!(matches!(result, Err(OppsumError::Validation(_))));
    }

    #[test]
    fn test_stereo_wav_is_downmixed_by_averaging() {
        let dir = tempfile::tempdir().unwrap();
        // Frames: (8192, 16384), (-8192, 8192), (0, 0)
        let path = write_wav(
            dir.path(),
            "stereo.wav",
            16_000,
            2,
            &[8192, 16384, -8192, 8192, 0, 0],
        );

        let waveform = read_wav(&path).unwrap();

        assert_eq!(waveform.len(), 3);
        let expected = [
            (8192.0 + 16384.0) / 2.0 / 32768.0,
            (-8192.0 + 8192.0) / 2.0 / 32768.0,
            0.0,
        ];
        for (got, want) in waveform.samples.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {} want {}", got, want);
        }
    }

    #[test]
    fn test_mono_wav_samples_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(dir.path(), "mono.wav", 16_000, 1, &[0, 16384, -32768, 32767]);

        let waveform = read_wav(&path).unwrap();

        assert_eq!(waveform.samples[0], 0.0);
        assert!((waveform.samples[1] - 0.5).abs() < 1e-6);
        assert_eq!(waveform.samples[2], -1.0);
        assert!((waveform.samples[3] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_garbage_bytes_are_not_a_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let result = read_wav(&path);

        assert!(matches!(result, Err(OppsumError::MediaDecode(_))));
    }

    #[test]
    fn test_average_channels_mono_is_identity() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(average_channels(&samples, 1), samples);
    }

    #[test]
    fn test_average_channels_handles_ragged_tail() {
        // Final frame has one sample; average over what is present.
        let samples = vec![0.2, 0.4, 0.6];
        let mono = average_channels(&samples, 2);

        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] - 0.6).abs() < 1e-6);
    }
}
