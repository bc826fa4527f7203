//! Demo lookup table generation command.

use anyhow::Context;
use clap::{Args, ValueEnum};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::PathBuf;
use wavegrid_core::{LookupTable, lerp};
use wavegrid_io::{write_json_table, write_npy};

/// Table layouts the generator can write.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum TableKind {
    /// Waveshaper transfer curves: input x drive x fold
    #[default]
    Shaper,
    /// Wavetable cycles: phase x saw blend x square drive
    Wavetable,
}

#[derive(Args)]
pub struct MakeTableArgs {
    /// Output file (.npy or .json)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Table layout
    #[arg(long, value_enum, default_value_t = TableKind::Shaper)]
    kind: TableKind,

    /// Points along axis 0 (input or phase)
    #[arg(long, default_value = "256")]
    size: usize,

    /// Points along axis 1 (x)
    #[arg(long, default_value = "16")]
    x_steps: usize,

    /// Points along axis 2 (y)
    #[arg(long, default_value = "16")]
    y_steps: usize,

    /// Largest drive amount reached at x = 1
    #[arg(long, default_value = "8.0")]
    max_drive: f64,
}

/// Normalised grid position of index `i` on an axis of `n` points.
fn unit(i: usize, n: usize) -> f64 {
    if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 }
}

/// Saturating transfer curves blended into a sine wavefolder.
///
/// Axis 0 spans inputs `-1..=1`, axis 1 raises the drive from 1 to
/// `max_drive`, axis 2 crossfades from `tanh` to folding.
fn shaper_value(input: f64, x: f64, y: f64, max_drive: f64) -> f64 {
    let drive = 1.0 + x * (max_drive - 1.0);
    let saturated = (drive * input).tanh() / drive.tanh();
    let folded = (FRAC_PI_2 * drive * input).sin();
    lerp(saturated, folded, y)
}

/// One cycle morphing sine to saw along x, then squared up by drive along y.
fn wavetable_value(phase: f64, x: f64, y: f64, max_drive: f64) -> f64 {
    let sine = (TAU * phase).sin();
    let saw = 2.0 * phase - 1.0;
    let blend = lerp(sine, saw, x);
    let drive = 1.0 + y * (max_drive - 1.0);
    (drive * blend).tanh() / drive.tanh()
}

pub fn run(args: MakeTableArgs) -> anyhow::Result<()> {
    if args.size == 0 || args.x_steps == 0 || args.y_steps == 0 {
        anyhow::bail!("table dimensions must be at least 1");
    }
    if !(args.max_drive.is_finite() && args.max_drive >= 1.0) {
        anyhow::bail!("--max-drive must be a finite value >= 1");
    }

    let shape = [args.size, args.x_steps, args.y_steps];
    let table = LookupTable::from_fn(shape, |i0, i1, i2| {
        let x = unit(i1, args.x_steps);
        let y = unit(i2, args.y_steps);
        let value = match args.kind {
            TableKind::Shaper => {
                shaper_value(unit(i0, args.size) * 2.0 - 1.0, x, y, args.max_drive)
            }
            // Axis 0 covers [0, 1) so the last point is not a repeat of the first.
            TableKind::Wavetable => {
                wavetable_value(i0 as f64 / args.size as f64, x, y, args.max_drive)
            }
        };
        value as f32
    })?;

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let written = match ext.as_deref() {
        Some("json") => write_json_table(&args.output, &table),
        _ => write_npy(&args.output, &table),
    };
    written.with_context(|| format!("writing {}", args.output.display()))?;

    tracing::info!(kind = ?args.kind, ?shape, "generated table");
    println!(
        "Wrote {:?} table {} x {} x {} to {}",
        args.kind,
        shape[0],
        shape[1],
        shape[2],
        args.output.display()
    );
    Ok(())
}
