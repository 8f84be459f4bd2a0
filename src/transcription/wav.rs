use hound::{SampleFormat, WavReader, WavSpec};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::TranscribeError;
use crate::config::MAX_CHUNK_FRAMES;

/// Opens `path` and checks it is mono, 16-bit, integer PCM
///
/// Encodings the reader can't decode (A-law, ADPCM, ...) count as a format
/// mismatch rather than an I/O failure.
///
/// # Errors
/// Returns `UnsupportedFormat` on a format mismatch, `Wav` for anything else
pub fn open_validated(path: &Path) -> Result<WavReader<BufReader<File>>, TranscribeError> {
    let reader = match WavReader::open(path) {
        Ok(reader) => reader,
        Err(hound::Error::Unsupported) => return Err(TranscribeError::UnsupportedFormat),
        Err(e) => return Err(e.into()),
    };

    validate_spec(&reader.spec())?;
    Ok(reader)
}

/// Checks channel count, sample width and encoding
///
/// # Errors
/// Returns `UnsupportedFormat` unless the spec is mono 16-bit integer PCM
pub fn validate_spec(spec: &WavSpec) -> Result<(), TranscribeError> {
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int
    {
        tracing::warn!(
            channels = spec.channels,
            bits_per_sample = spec.bits_per_sample,
            sample_format = ?spec.sample_format,
            "unsupported WAV format"
        );
        return Err(TranscribeError::UnsupportedFormat);
    }
    Ok(())
}

/// Streams samples to `feed` in chunks of `chunk_frames` frames
///
/// The last chunk may be shorter. Returns the number of chunks fed.
///
/// # Errors
/// Returns error if a sample can't be decoded or `feed` fails
pub fn feed_chunks<R, F>(
    reader: &mut WavReader<R>,
    chunk_frames: usize,
    mut feed: F,
) -> Result<usize, TranscribeError>
where
    R: Read,
    F: FnMut(&[i16]) -> Result<(), TranscribeError>,
{
    let chunk_len = chunk_frames
        .max(1)
        .saturating_mul(usize::from(reader.spec().channels));
    let mut chunk = Vec::with_capacity(chunk_len.min(MAX_CHUNK_FRAMES));
    let mut fed = 0;

    for sample in reader.samples::<i16>() {
        chunk.push(sample?);
        if chunk.len() == chunk_len {
            feed(&chunk)?;
            chunk.clear();
            fed += 1;
        }
    }

    if !chunk.is_empty() {
        feed(&chunk)?;
        fed += 1;
    }

    Ok(fed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavWriter;
    use std::io::Cursor;

    fn mono16_bytes(samples: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_validate_spec_accepts_mono16() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        assert!(validate_spec(&spec).is_ok());
    }

    #[test]
    fn test_validate_spec_rejects_mismatches() {
        let base = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let rejected = [
            WavSpec { channels: 2, ..base },
            WavSpec { bits_per_sample: 8, ..base },
            WavSpec { bits_per_sample: 24, ..base },
            WavSpec {
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
                ..base
            },
        ];

        for spec in rejected {
            assert!(
                matches!(validate_spec(&spec), Err(TranscribeError::UnsupportedFormat)),
                "expected rejection for {spec:?}"
            );
        }
    }

    #[test]
    fn test_feed_chunks_preserves_samples() {
        let samples: Vec<i16> = (0..10).collect();
        let mut reader = WavReader::new(Cursor::new(mono16_bytes(&samples))).unwrap();

        let mut seen = Vec::new();
        let mut sizes = Vec::new();
        let fed = feed_chunks(&mut reader, 4, |chunk| {
            sizes.push(chunk.len());
            seen.extend_from_slice(chunk);
            Ok(())
        })
        .unwrap();

        assert_eq!(fed, 3);
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(seen, samples);
    }

    #[test]
    fn test_feed_chunks_exact_multiple_has_no_empty_tail() {
        let samples = vec![1_i16; 8];
        let mut reader = WavReader::new(Cursor::new(mono16_bytes(&samples))).unwrap();

        let mut sizes = Vec::new();
        let fed = feed_chunks(&mut reader, 4, |chunk| {
            sizes.push(chunk.len());
            Ok(())
        })
        .unwrap();

        assert_eq!(fed, 2);
        assert_eq!(sizes, vec![4, 4]);
    }

    #[test]
    fn test_feed_chunks_huge_chunk_size_feeds_once() {
        let samples: Vec<i16> = (0..100).collect();
        let mut reader = WavReader::new(Cursor::new(mono16_bytes(&samples))).unwrap();

        let mut sizes = Vec::new();
        let fed = feed_chunks(&mut reader, usize::MAX, |chunk| {
            sizes.push(chunk.len());
            Ok(())
        })
        .unwrap();

        assert_eq!(fed, 1);
        assert_eq!(sizes, vec![100]);
    }

    #[test]
    fn test_feed_chunks_stops_on_error() {
        let samples = vec![0_i16; 12];
        let mut reader = WavReader::new(Cursor::new(mono16_bytes(&samples))).unwrap();

        let mut calls = 0;
        let result = feed_chunks(&mut reader, 4, |_| {
            calls += 1;
            Err(TranscribeError::Recognition("stop".to_owned()))
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_open_validated_not_a_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not RIFF").unwrap();

        let result = open_validated(&path);
        assert!(matches!(result, Err(TranscribeError::Wav(_))));
    }

    #[test]
    fn test_open_validated_compressed_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alaw.wav");

        // Minimal RIFF/WAVE with an A-law (format tag 6) fmt chunk
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4_u32 + 8 + 16 + 8 + 2).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16_u32.to_le_bytes());
        bytes.extend_from_slice(&6_u16.to_le_bytes()); // A-law
        bytes.extend_from_slice(&1_u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&8000_u32.to_le_bytes()); // sample rate
        bytes.extend_from_slice(&8000_u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&1_u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&8_u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&2_u32.to_le_bytes());
        bytes.extend_from_slice(&[0xd5, 0xd5]);
        std::fs::write(&path, bytes).unwrap();

        let result = open_validated(&path);
        assert!(matches!(result, Err(TranscribeError::UnsupportedFormat)));
    }
}
