//! Control messages from a non-real-time thread to the audio thread.
//!
//! Messages travel over a bounded `crossbeam` channel. The control side uses
//! `try_send` and gets the message back when the channel is full; the audio
//! side drains with `try_recv` at the start of each block, so neither side
//! ever blocks and no message is applied mid-block.
//!
//! The JSON form is internally tagged:
//!
//! ```json
//! {"type": "note_on", "note": 69}
//! {"type": "note_off"}
//! {"type": "set_param", "index": 2, "value": 0.5}
//! ```

use crate::engine::SynthEngine;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use serde::{Deserialize, Serialize};

/// Default queue depth for [`control_channel`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Highest valid MIDI note number.
pub const MAX_NOTE: u8 = 127;

/// A single control event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Start a note.
    NoteOn {
        /// MIDI note number, `0..=127`.
        note: u8,
    },
    /// Release the current note.
    NoteOff,
    /// Replace a stored parameter value.
    SetParam {
        /// Index into the engine's parameter descriptors.
        index: usize,
        /// New value.
        value: f64,
    },
}

impl ControlMessage {
    /// Apply this message to `engine`.
    pub fn apply<E: SynthEngine + ?Sized>(self, engine: &mut E) {
        match self {
            ControlMessage::NoteOn { note } => engine.note_on(note),
            ControlMessage::NoteOff => engine.note_off(),
            ControlMessage::SetParam { index, value } => engine.set_param(index, value),
        }
    }

    fn validate(self) -> Result<Self, ControlError> {
        match self {
            ControlMessage::NoteOn { note } if note > MAX_NOTE => {
                Err(ControlError::InvalidNote(note))
            }
            ControlMessage::SetParam { value, .. } if !value.is_finite() => {
                Err(ControlError::NonFiniteValue)
            }
            msg => Ok(msg),
        }
    }
}

/// Why a message could not be queued.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The queue is full; the message is returned.
    Full(ControlMessage),
    /// The audio side has been dropped.
    Disconnected(ControlMessage),
    /// Note number above 127.
    InvalidNote(u8),
    /// `SetParam` with a NaN or infinite value.
    NonFiniteValue,
}

impl core::fmt::Display for ControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControlError::Full(msg) => write!(f, "control queue full, dropped {msg:?}"),
            ControlError::Disconnected(msg) => {
                write!(f, "audio side disconnected, dropped {msg:?}")
            }
            ControlError::InvalidNote(note) => {
                write!(f, "note {note} out of range (0..={MAX_NOTE})")
            }
            ControlError::NonFiniteValue => write!(f, "parameter value is not finite"),
        }
    }
}

impl std::error::Error for ControlError {}

/// Create a bounded control channel holding up to `capacity` messages.
pub fn control_channel(capacity: usize) -> (ControlSender, ControlReceiver) {
    let (tx, rx) = bounded(capacity);
    (ControlSender { tx }, ControlReceiver { rx })
}

/// Control-thread end of the channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: Sender<ControlMessage>,
}

impl ControlSender {
    /// Queue `msg` without blocking.
    pub fn send(&self, msg: ControlMessage) -> Result<(), ControlError> {
        let msg = msg.validate()?;
        self.tx.try_send(msg).map_err(|e| match e {
            TrySendError::Full(msg) => ControlError::Full(msg),
            TrySendError::Disconnected(msg) => ControlError::Disconnected(msg),
        })
    }

    /// Queue a note-on.
    pub fn note_on(&self, note: u8) -> Result<(), ControlError> {
        self.send(ControlMessage::NoteOn { note })
    }

    /// Queue a note-off.
    pub fn note_off(&self) -> Result<(), ControlError> {
        self.send(ControlMessage::NoteOff)
    }

    /// Queue a parameter change.
    pub fn set_param(&self, index: usize, value: f64) -> Result<(), ControlError> {
        self.send(ControlMessage::SetParam { index, value })
    }

    /// Number of messages waiting.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Audio-thread end of the channel.
#[derive(Debug)]
pub struct ControlReceiver {
    rx: Receiver<ControlMessage>,
}

impl ControlReceiver {
    /// Take the next message, if any.
    #[inline]
    pub fn try_recv(&self) -> Option<ControlMessage> {
        self.rx.try_recv().ok()
    }

    /// Apply every queued message to `engine` in production order.
    ///
    /// Returns the number of messages applied.
    pub fn drain_into<E: SynthEngine + ?Sized>(&self, engine: &mut E) -> usize {
        let mut applied = 0;
        while let Ok(msg) = self.rx.try_recv() {
            msg.apply(engine);
            applied += 1;
        }
        applied
    }

    /// Number of messages waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
