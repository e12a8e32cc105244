//! WAV framing for decoded PCM
//!
//! The format parameters are fixed pipeline policy: mono, 16-bit, 16 kHz.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::error::SpeechError;
use crate::types::{
    AudioContainer, CHANNELS, ContainerInfo, PcmBuffer, SAMPLE_RATE_HZ, SAMPLE_WIDTH_BYTES,
};

/// Size of the canonical PCM WAV header
pub const HEADER_LEN: usize = 44;

const fn wav_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE_HZ,
        bits_per_sample: SAMPLE_WIDTH_BYTES * 8,
        sample_format: SampleFormat::Int,
    }
}

/// Frame `pcm` as a WAV container
///
/// # Errors
///
/// Returns `SpeechError::Container` if the writer fails.
pub fn encode(pcm: &PcmBuffer) -> Result<AudioContainer, SpeechError> {
    let mut data = Vec::with_capacity(HEADER_LEN + pcm.byte_len());

    let mut writer = WavWriter::new(Cursor::new(&mut data), wav_spec())?;
    for &sample in pcm.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    debug!(
        samples = pcm.len(),
        container_size = data.len(),
        "Encoded WAV container"
    );

    Ok(AudioContainer::new(data))
}

/// Read the header of a container back
///
/// # Errors
///
/// Returns `SpeechError::Container` if the bytes are not a readable WAV file.
pub fn read_info(container: &[u8]) -> Result<ContainerInfo, SpeechError> {
    let mut reader = WavReader::new(Cursor::new(container))?;
    let spec = reader.spec();
    let frame_count = reader.duration();
    let sample_width = spec.bits_per_sample / 8;

    let byte_length = reader
        .samples::<i16>()
        .try_fold(0usize, |len, sample| {
            sample.map(|_| len + usize::from(sample_width))
        })?;

    Ok(ContainerInfo {
        channels: spec.channels,
        sample_width,
        sample_rate: spec.sample_rate,
        frame_count,
        byte_length,
    })
}
