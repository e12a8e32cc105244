//! Opus packet decoding
//!
//! Clients stream 16 kHz mono Opus at 60 ms per packet. Each packet decodes
//! into one 960-sample frame. A packet that fails to decode is logged and
//! skipped so one corrupt packet never costs the whole utterance.

use std::collections::HashMap;
use std::sync::Arc;

use audiopus::coder::Decoder as OpusDecoder;
use audiopus::packet::Packet;
use audiopus::{Channels, MutSignals, SampleRate};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::SpeechError;
use crate::types::{FRAME_SAMPLES, PcmBuffer};

/// Decodes one compressed packet into PCM samples
///
/// Implementations are stateful; one instance must only ever see packets
/// from a single session.
pub trait FrameDecoder: Send {
    /// Decode `packet` into `output`, returning the number of samples written
    ///
    /// # Errors
    ///
    /// Returns an error if the packet is corrupt or does not fit `output`.
    fn decode_frame(&mut self, packet: &[u8], output: &mut [i16]) -> Result<usize, SpeechError>;
}

/// Opus decoder configured for 16 kHz mono
pub struct OpusFrameDecoder {
    decoder: OpusDecoder,
}

impl std::fmt::Debug for OpusFrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpusFrameDecoder").finish_non_exhaustive()
    }
}

impl OpusFrameDecoder {
    /// Create a new decoder
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Codec` if libopus rejects the configuration.
    pub fn new() -> Result<Self, SpeechError> {
        let decoder = OpusDecoder::new(SampleRate::Hz16000, Channels::Mono)?;
        debug!("Created Opus decoder (16kHz mono)");
        Ok(Self { decoder })
    }
}

impl FrameDecoder for OpusFrameDecoder {
    fn decode_frame(&mut self, packet: &[u8], output: &mut [i16]) -> Result<usize, SpeechError> {
        let packet = Packet::try_from(packet)?;
        let output = MutSignals::try_from(output)?;
        let samples = self.decoder.decode(Some(packet), output, false)?;
        Ok(samples)
    }
}

/// Decodes a packet sequence into a [`PcmBuffer`]
#[derive(Debug)]
pub struct PacketDecoder<D = OpusFrameDecoder> {
    inner: D,
    scratch: Vec<i16>,
}

impl PacketDecoder<OpusFrameDecoder> {
    /// Create a packet decoder backed by Opus
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Codec` if the Opus decoder cannot be created.
    pub fn opus() -> Result<Self, SpeechError> {
        Ok(Self::with_decoder(OpusFrameDecoder::new()?))
    }
}

impl<D: FrameDecoder> PacketDecoder<D> {
    /// Wrap an arbitrary frame decoder
    pub fn with_decoder(inner: D) -> Self {
        Self {
            inner,
            scratch: vec![0; FRAME_SAMPLES],
        }
    }

    /// Decode every packet in order, skipping the ones that fail
    ///
    /// The result holds exactly one frame per successfully decoded packet.
    pub fn decode<P: AsRef<[u8]>>(&mut self, packets: &[P]) -> PcmBuffer {
        let pcm = packets
            .iter()
            .enumerate()
            .fold(PcmBuffer::new(), |mut pcm, (index, packet)| {
                match self.decode_one(index, packet.as_ref()) {
                    Ok(samples) => pcm.push_frame(&self.scratch[..samples]),
                    Err(e) => {
                        warn!(index, packet_size = packet.as_ref().len(), "Skipping packet: {e}");
                    },
                }
                pcm
            });

        debug!(
            packets = packets.len(),
            frames = pcm.frame_blocks(),
            samples = pcm.len(),
            "Decoded packet sequence"
        );

        pcm
    }

    fn decode_one(&mut self, index: usize, packet: &[u8]) -> Result<usize, SpeechError> {
        let samples = self
            .inner
            .decode_frame(packet, &mut self.scratch)
            .map_err(|e| SpeechError::PacketDecode {
                index,
                reason: e.to_string(),
            })?;
        trace!("Decoded {} bytes -> {} samples", packet.len(), samples);
        Ok(samples)
    }
}

type SharedDecoder<D> = Arc<Mutex<PacketDecoder<D>>>;

/// One decoder per caller session
///
/// Each decoder sits behind its own lock: calls for the same session are
/// serialized, calls for different sessions run independently. Decoding is
/// synchronous so no lock is held across an `.await`.
pub struct SessionDecoders<D = OpusFrameDecoder> {
    sessions: Mutex<HashMap<String, SharedDecoder<D>>>,
    factory: fn() -> Result<D, SpeechError>,
}

impl<D> std::fmt::Debug for SessionDecoders<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionDecoders")
            .field("sessions", &self.sessions.lock().len())
            .finish_non_exhaustive()
    }
}

impl SessionDecoders<OpusFrameDecoder> {
    /// Registry creating Opus decoders on demand
    #[must_use]
    pub fn opus() -> Self {
        Self::with_factory(OpusFrameDecoder::new)
    }
}

impl Default for SessionDecoders<OpusFrameDecoder> {
    fn default() -> Self {
        Self::opus()
    }
}

impl<D: FrameDecoder> SessionDecoders<D> {
    /// Registry creating decoders with `factory`
    #[must_use]
    pub fn with_factory(factory: fn() -> Result<D, SpeechError>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            factory,
        }
    }

    /// Decode `packets` with the decoder belonging to `session_id`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Codec` if a new decoder had to be created and
    /// creation failed. Individual packet failures are not errors.
    pub fn decode<P: AsRef<[u8]>>(
        &self,
        session_id: &str,
        packets: &[P],
    ) -> Result<PcmBuffer, SpeechError> {
        let decoder = self.decoder_for(session_id)?;
        let mut decoder = decoder.lock();
        Ok(decoder.decode(packets))
    }

    /// Release the decoder of a finished session
    ///
    /// Returns `true` if the session had a decoder.
    pub fn end_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.lock().remove(session_id).is_some();
        if removed {
            debug!(session_id, "Released session decoder");
        }
        removed
    }

    /// Number of sessions currently holding a decoder
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    fn decoder_for(&self, session_id: &str) -> Result<SharedDecoder<D>, SpeechError> {
        let mut sessions = self.sessions.lock();
        if let Some(decoder) = sessions.get(session_id) {
            return Ok(Arc::clone(decoder));
        }

        let decoder = Arc::new(Mutex::new(PacketDecoder::with_decoder((self.factory)()?)));
        sessions.insert(session_id.to_string(), Arc::clone(&decoder));
        debug!(session_id, "Created session decoder");
        Ok(decoder)
    }
}
