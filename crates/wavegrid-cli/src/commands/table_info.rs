//! Lookup table inspection command.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use wavegrid_io::load_table;

#[derive(Args)]
pub struct TableInfoArgs {
    /// Table file (.npy or .json)
    #[arg(value_name = "TABLE")]
    table: PathBuf,
}

pub fn run(args: TableInfoArgs) -> anyhow::Result<()> {
    let table = load_table(&args.table)
        .with_context(|| format!("loading table {}", args.table.display()))?;

    let finite: Vec<f32> = table
        .data()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let non_finite = table.len() - finite.len();
    let min = finite.iter().copied().fold(f32::INFINITY, f32::min);
    let max = finite.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = if finite.is_empty() {
        0.0
    } else {
        finite.iter().map(|&v| f64::from(v)).sum::<f64>() / finite.len() as f64
    };

    let [a, b, c] = table.shape();
    println!("Table: {}", args.table.display());
    println!("  Shape:      {a} x {b} x {c}");
    println!("  Values:     {}", table.len());
    if finite.is_empty() {
        println!("  Range:      (no finite values)");
    } else {
        println!("  Range:      {min:.6} .. {max:.6}");
        println!("  Mean:       {mean:.6}");
    }
    if non_finite > 0 {
        println!("  Non-finite: {non_finite} (rendered as silence)");
    }
    Ok(())
}
