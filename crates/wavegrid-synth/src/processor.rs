//! Audio-thread block processor with one-shot engine installation.
//!
//! Table-driven engines are not ready until their table has been loaded off
//! the audio thread. The control side builds the engine and hands it over
//! through a single-slot channel; until it arrives the processor renders
//! silence and leaves queued control messages untouched, so a note-on sent
//! during loading still sounds once the engine is in place.
//!
//! ```rust
//! use wavegrid_core::ParamBlock;
//! use wavegrid_synth::{Engine, FmEngine, processor};
//!
//! let (mut handle, mut audio) = processor::<Engine>(64);
//! handle.sender().note_on(57).unwrap();
//!
//! let mut block = [0.0f32; 128];
//! audio.process(&ParamBlock::empty(), &mut block); // not ready: silence
//! assert!(block.iter().all(|&s| s == 0.0));
//!
//! handle.install(FmEngine::new(48000.0).into()).unwrap();
//! audio.process(&ParamBlock::empty(), &mut block);
//! assert!(audio.is_ready());
//! ```

use crate::control::{ControlReceiver, ControlSender, control_channel};
use crate::engine::{Engine, SynthEngine};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// Why an engine could not be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    /// An engine was already handed over.
    AlreadyInstalled,
    /// The audio side has been dropped.
    Disconnected,
}

impl core::fmt::Display for InstallError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InstallError::AlreadyInstalled => write!(f, "an engine is already installed"),
            InstallError::Disconnected => write!(f, "audio processor was dropped"),
        }
    }
}

impl std::error::Error for InstallError {}

/// Create a connected control handle and audio-thread processor.
///
/// `control_capacity` bounds the control message queue.
pub fn processor<E: SynthEngine>(
    control_capacity: usize,
) -> (ProcessorHandle<E>, BlockProcessor<E>) {
    let (install_tx, install_rx) = bounded(1);
    let (control_tx, control_rx) = control_channel(control_capacity);
    (
        ProcessorHandle {
            install_tx,
            control: control_tx,
            installed: false,
        },
        BlockProcessor {
            engine: None,
            install_rx,
            control: control_rx,
        },
    )
}

/// Control-thread side: installs the engine once and sends control messages.
#[derive(Debug)]
pub struct ProcessorHandle<E = Engine> {
    install_tx: Sender<E>,
    control: ControlSender,
    installed: bool,
}

impl<E> ProcessorHandle<E> {
    /// Hand `engine` to the audio thread. Only the first call succeeds.
    pub fn install(&mut self, engine: E) -> Result<(), InstallError> {
        if self.installed {
            return Err(InstallError::AlreadyInstalled);
        }
        match self.install_tx.try_send(engine) {
            Ok(()) => {
                self.installed = true;
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(InstallError::AlreadyInstalled),
            Err(TrySendError::Disconnected(_)) => Err(InstallError::Disconnected),
        }
    }

    /// Whether [`install`](Self::install) has succeeded.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Sender for control messages.
    pub fn sender(&self) -> &ControlSender {
        &self.control
    }
}

/// Audio-thread side: renders one block per call.
#[derive(Debug)]
pub struct BlockProcessor<E = Engine> {
    engine: Option<E>,
    install_rx: Receiver<E>,
    control: ControlReceiver,
}

impl<E: SynthEngine> BlockProcessor<E> {
    /// Render the next block.
    ///
    /// Picks up a pending engine installation, applies queued control
    /// messages, then lets the engine fill `output`. Renders silence while no
    /// engine is installed.
    pub fn process(&mut self, params: &wavegrid_core::ParamBlock<'_>, output: &mut [f32]) {
        if self.engine.is_none() {
            self.engine = self.install_rx.try_recv().ok();
        }
        let Some(engine) = self.engine.as_mut() else {
            output.fill(0.0);
            return;
        };
        self.control.drain_into(engine);
        engine.process(params, output);
    }

    /// Whether an engine has been installed and observed.
    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    /// The installed engine.
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Mutable access to the installed engine.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::additive::AdditiveEngine;
    use crate::fm::FmEngine;
    use wavegrid_core::ParamBlock;

    #[test]
    fn silent_until_installed_then_plays_queued_note() {
        let (mut handle, mut audio) = processor::<Engine>(8);
        handle.sender().note_on(69).unwrap();

        let mut block = [1.0f32; 64];
        audio.process(&ParamBlock::empty(), &mut block);
        assert!(!audio.is_ready());
        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(handle.sender().len(), 1);

        handle.install(AdditiveEngine::new(48000.0).into()).unwrap();
        audio.process(&ParamBlock::empty(), &mut block);
        assert!(audio.is_ready());
        assert!(block.iter().any(|&s| s != 0.0));
        assert!(handle.sender().is_empty());
    }

    #[test]
    fn second_install_is_rejected() {
        let (mut handle, _audio) = processor::<Engine>(8);
        handle.install(FmEngine::new(48000.0).into()).unwrap();
        assert!(handle.is_installed());
        assert_eq!(
            handle.install(FmEngine::new(48000.0).into()),
            Err(InstallError::AlreadyInstalled)
        );
    }

    #[test]
    fn install_after_audio_dropped() {
        let (mut handle, audio) = processor::<FmEngine>(8);
        drop(audio);
        assert_eq!(
            handle.install(FmEngine::new(48000.0)),
            Err(InstallError::Disconnected)
        );
    }

    #[test]
    fn messages_apply_at_block_start() {
        let (mut handle, mut audio) = processor::<AdditiveEngine>(8);
        handle.install(AdditiveEngine::new(48000.0)).unwrap();

        let mut block = [0.0f32; 32];
        audio.process(&ParamBlock::empty(), &mut block);
        assert!(block.iter().all(|&s| s == 0.0));

        handle.sender().note_on(60).unwrap();
        audio.process(&ParamBlock::empty(), &mut block);
        assert!(audio.engine().is_some_and(SynthEngine::is_active));

        handle.sender().note_off().unwrap();
        audio.process(&ParamBlock::empty(), &mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }
}
