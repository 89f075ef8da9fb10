//! Decompose command implementation.

use anyhow::Result;
use console::style;

use super::common::{load_circuit, write_output};

/// Execute the decompose command.
pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    let circuit = load_circuit(input)?;
    let flat = circuit.save(true)?;
    write_output(output, &flat.to_json()?)?;

    if let Some(path) = output {
        println!(
            "{} Decomposed {} → {} ({} gates, {} columns)",
            style("✓").green().bold(),
            style(input).green(),
            style(path).green(),
            circuit.num_gates(true)?,
            flat.num_cols()
        );
    }
    Ok(())
}
