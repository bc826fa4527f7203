//! Offline patch rendering.

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use wavegrid_config::{NoteEvent, Patch};
use wavegrid_core::ParamBlock;
use wavegrid_io::{TableLoader, WavSpec, read_wav, spawn_table_loader, write_wav};
use wavegrid_synth::control::DEFAULT_CAPACITY;
use wavegrid_synth::{Convolver, Engine, ExperimentChain, processor};

#[derive(Args)]
pub struct RenderArgs {
    /// Patch file (TOML)
    #[arg(value_name = "PATCH")]
    patch: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Play this MIDI note instead of the patch's note sequence
    #[arg(long)]
    note: Option<u8>,

    /// Length of --note in seconds
    #[arg(long, default_value = "1.0")]
    duration: f64,

    /// Output bit depth: 16, 24 or 32 (float)
    #[arg(long, default_value = "32", value_parser = parse_bit_depth)]
    bit_depth: u16,

    /// Hide the progress bar
    #[arg(long, short)]
    quiet: bool,
}

fn parse_bit_depth(s: &str) -> Result<u16, String> {
    match s {
        "16" => Ok(16),
        "24" => Ok(24),
        "32" => Ok(32),
        _ => Err(format!("unsupported bit depth '{s}' (expected 16, 24 or 32)")),
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let mut patch = Patch::load(&args.patch)
        .with_context(|| format!("loading patch {}", args.patch.display()))?;
    if let Some(note) = args.note {
        patch.notes = vec![NoteEvent::new(note, 0.0, args.duration)];
    }
    let kind = patch.validate()?;

    // The table loads in the background while the post chain is built.
    let loader = match &patch.table {
        Some(path) if kind.needs_table() => Some(spawn_table_loader(path)?),
        _ => None,
    };

    let sample_rate = f64::from(patch.sample_rate);
    let mut chain = match &patch.experiment {
        Some(experiment) => {
            let reverb = experiment
                .impulse_response
                .as_deref()
                .map(|path| load_reverb(path, patch.sample_rate, patch.block_size))
                .transpose()?;
            let mut chain = ExperimentChain::new(sample_rate, reverb);
            let [x, y] = experiment.pad;
            let targets = chain.set_pad(x, y);
            tracing::info!(
                x,
                y,
                mod_freq_hz = targets.mod_freq_hz(),
                cutoff_hz = targets.cutoff_hz(),
                reverb = chain.has_reverb(),
                "experiment chain enabled"
            );
            Some(chain)
        }
        None => None,
    };

    let events = patch.control_events();
    // Room for every event, so any number of notes may share a start sample.
    let (mut handle, mut audio) = processor::<Engine>(events.len().max(DEFAULT_CAPACITY));
    let table = loader.map(TableLoader::join).transpose()?;
    let engine = patch.build_engine(table)?;
    handle.install(engine)?;
    tracing::info!(engine = %kind, sample_rate = patch.sample_rate, "engine installed");

    let total = (patch.duration_secs() * sample_rate).ceil() as usize;
    let mut pending = events.iter().peekable();
    let mut output = vec![0.0f32; total];
    let pb = progress_bar(total as u64, args.quiet)?;

    // Blocks are split at event times so notes start on their exact sample.
    let mut pos = 0;
    while pos < total {
        while let Some((_, msg)) = pending.next_if(|(at, _)| *at as usize <= pos) {
            handle.sender().send(*msg)?;
        }
        let mut end = (pos + patch.block_size).min(total);
        if let Some((at, _)) = pending.peek() {
            end = end.min(*at as usize);
        }

        let chunk = &mut output[pos..end];
        audio.process(&ParamBlock::empty(), chunk);
        if let Some(chain) = chain.as_mut() {
            chain.process(chunk);
        }
        pb.inc((end - pos) as u64);
        pos = end;
    }
    pb.finish_and_clear();

    let peak = output.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 1.0 {
        tracing::warn!(peak, "output exceeds full scale");
    }

    write_wav(
        &args.output,
        &output,
        WavSpec {
            channels: 1,
            sample_rate: patch.sample_rate,
            bits_per_sample: args.bit_depth,
        },
    )
    .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Rendered {} ({:.2}s, {} notes, peak {:.1} dBFS) to {}",
        kind,
        total as f64 / sample_rate,
        patch.notes.len(),
        20.0 * peak.max(1e-10).log10(),
        args.output.display()
    );
    Ok(())
}

fn load_reverb(path: &Path, sample_rate: u32, block_size: usize) -> anyhow::Result<Convolver> {
    let (ir, spec) = read_wav(path)
        .with_context(|| format!("loading impulse response {}", path.display()))?;
    if spec.sample_rate != sample_rate {
        tracing::warn!(
            ir_rate = spec.sample_rate,
            sample_rate,
            "impulse response sample rate differs from patch"
        );
    }
    let convolver = Convolver::normalized(&ir, block_size);
    tracing::info!(
        path = %path.display(),
        taps = ir.len(),
        partitions = convolver.partition_count(),
        "loaded impulse response"
    );
    Ok(convolver)
}

fn progress_bar(len: u64, quiet: bool) -> anyhow::Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}
