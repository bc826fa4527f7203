//! Engine and parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings

use clap::Args;
use wavegrid_synth::EngineKind;

#[derive(Args)]
pub struct ParamsArgs {
    /// Engine to describe; lists all engines when omitted
    #[arg(value_name = "ENGINE")]
    engine: Option<String>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let Some(name) = args.engine else {
        println!("Available Engines:");
        println!();
        for kind in EngineKind::ALL {
            let table = if kind.needs_table() {
                "needs table"
            } else {
                ""
            };
            println!(
                "  {:16}  {:3} params  {}",
                kind.name(),
                kind.parameter_descriptors().len(),
                table
            );
        }
        println!();
        println!("Run 'wavegrid params <ENGINE>' for parameter details.");
        return Ok(());
    };

    let kind = EngineKind::from_name(&name)
        .ok_or_else(|| anyhow::anyhow!("Unknown engine: {}", name))?;

    println!("{}", kind.name());
    println!("{}", "=".repeat(kind.name().len()));
    println!();
    println!("Parameters:");
    println!();
    println!("  {:>5}  {:24}  {:>12}", "Index", "Name", "Default");
    println!("  {:>5}  {:24}  {:>12}", "-----", "----", "-------");
    for (index, param) in kind.parameter_descriptors().iter().enumerate() {
        println!(
            "  {:>5}  {:24}  {:>12.6}",
            index, param.name, param.default_value
        );
    }
    Ok(())
}
