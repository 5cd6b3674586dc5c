//! Audio decoding and WAV export
//!
//! The selected file is decoded once with Symphonia into interleaved `f32`
//! samples. Both result lanes and the waveform peaks share that buffer.

use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{AudioError, Result};
use crate::source::{FileSource, SelectedFile};

/// Decoded PCM audio, interleaved
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples in -1.0..=1.0
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count (at least 1)
    pub channels: u16,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Length in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Stereo frame at `index`; mono sources are duplicated, extra channels ignored
    pub fn stereo_frame(&self, index: usize) -> (f32, f32) {
        let channels = self.channels.max(1) as usize;
        let base = index * channels;
        match self.samples.get(base..base + channels) {
            Some(frame) if channels >= 2 => (frame[0], frame[1]),
            Some(frame) => (frame[0], frame[0]),
            None => (0.0, 0.0),
        }
    }

    /// Mono down-mix (channel average) for waveform display
    pub fn mono(&self) -> Vec<f32> {
        let channels = self.channels.max(1) as usize;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

/// Decode the selected file
///
/// Packet-level decode errors are logged and skipped; a file that cannot be
/// probed or has no audio track is an error.
pub fn decode(file: &SelectedFile) -> Result<DecodedAudio> {
    let source: Box<dyn MediaSource> = match file.source() {
        FileSource::Path(path) => Box::new(File::open(path).map_err(|e| AudioError::Read {
            path: path.clone(),
            source: e,
        })?),
        FileSource::Memory(bytes) => Box::new(Cursor::new(bytes.clone())),
    };

    let mut hint = Hint::new();
    if let Some(ext) = file.extension() {
        hint.with_extension(ext);
    }

    let decoded = decode_stream(MediaSourceStream::new(source, Default::default()), &hint)?;
    log::info!(
        "decode: {} -> {} frames, {} Hz, {} channels ({:.2}s)",
        file.name(),
        decoded.frames(),
        decoded.sample_rate,
        decoded.channels,
        decoded.duration_seconds()
    );
    Ok(decoded)
}

fn decode_stream(mss: MediaSourceStream, hint: &Hint) -> Result<DecodedAudio> {
    let probed = symphonia::default::get_probe()
        .format(hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::UnsupportedFormat("No audio track found".to_string()))?;

    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::UnsupportedFormat("Unknown sample rate".to_string()))?;

    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("decode: error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("decode: error decoding packet: {}", e);
                continue;
            }
        };

        // Initialize sample buffer on first decode
        if sample_buf.is_none() {
            let spec = *decoded.spec();
            channels = spec.channels.count() as u16;
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() {
        return Err(AudioError::Decode("No audio frames decoded".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels: channels.max(1),
    })
}

/// Write decoded audio as a 32-bit float WAV
pub fn write_wav(path: &Path, audio: &DecodedAudio) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels.max(1),
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let write_err = |source| AudioError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(write_err)?;
    for &sample in &audio.samples {
        writer.write_sample(sample).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)?;
    Ok(())
}

/// Export both lanes into `dir` as `<name>_<lane>.wav`
///
/// Both files carry the same audio: the stems are a mock.
pub fn export_stems(dir: &Path, name: &str, audio: &DecodedAudio) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2);
    for lane in crate::lanes::LaneId::ALL {
        let path = dir.join(format!("{}_{}.wav", name, lane.file_suffix()));
        write_wav(&path, audio)?;
        log::info!("export_stems: wrote {:?}", path);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 16-bit stereo WAV with a ramp in the left channel
    fn wav_bytes(frames: u32, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..frames {
                let left = ((i % 100) as i32 * 300) as i16;
                writer.write_sample(left).unwrap();
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_wav_from_memory() {
        let file = SelectedFile::from_bytes("tone.wav", wav_bytes(44_100, 44_100));
        let audio = decode(&file).unwrap();

        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frames(), 44_100);
        assert!((audio.duration_seconds() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        std::fs::write(&path, wav_bytes(4_800, 48_000)).unwrap();

        let audio = decode(&SelectedFile::from_path(&path).unwrap()).unwrap();
        assert_eq!(audio.sample_rate, 48_000);
        assert_eq!(audio.frames(), 4_800);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let file = SelectedFile::from_bytes("noise.bin", vec![0x5Au8; 4096]);
        assert!(decode(&file).is_err());
    }

    #[test]
    fn test_mono_and_stereo_frames() {
        let audio = DecodedAudio {
            samples: vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0],
            sample_rate: 3,
            channels: 2,
        };
        assert_eq!(audio.mono(), vec![0.5, 0.5, 0.0]);
        assert_eq!(audio.stereo_frame(1), (0.5, 0.5));
        assert_eq!(audio.stereo_frame(9), (0.0, 0.0));

        let mono = DecodedAudio {
            samples: vec![0.25, -0.25],
            sample_rate: 2,
            channels: 1,
        };
        assert_eq!(mono.stereo_frame(1), (-0.25, -0.25));
        assert_eq!(mono.duration_seconds(), 1.0);
    }

    #[test]
    fn test_export_stems_writes_both_lanes() {
        let dir = tempfile::tempdir().unwrap();
        let audio = DecodedAudio {
            samples: vec![0.0, 0.1, 0.2, 0.3],
            sample_rate: 8_000,
            channels: 2,
        };

        let written = export_stems(dir.path(), "song", &audio).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("song_vocals.wav"));
        assert!(written[1].ends_with("song_instrumental.wav"));

        let reader = hound::WavReader::open(&written[1]).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.len(), 4);
    }
}
