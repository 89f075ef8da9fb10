//! Run command implementation.

use anyhow::Result;
use console::style;
use tracing::info;

use qugrid_sim::{RunObserver, Simulator, SimulatorConfig};

use super::common::{bitstring, load_circuit, parse_initial_values};

/// Options of the run command.
#[derive(Debug, Default)]
pub struct RunOptions<'a> {
    /// Initial wire values as a bitstring.
    pub initial: Option<&'a str>,
    /// Print every basis state, not only possible ones.
    pub all_states: bool,
    /// Force a fresh collapse instead of the cached one.
    pub force: bool,
}

/// Logs column progress at `info`.
struct ProgressLog {
    num_cols: usize,
}

impl RunObserver for ProgressLog {
    fn on_column(&mut self, column: usize) {
        info!("Column {}/{} done", column + 1, self.num_cols);
    }
}

/// Execute the run command.
pub fn execute(input: &str, config: SimulatorConfig, options: &RunOptions<'_>) -> Result<()> {
    println!(
        "{} Running {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let circuit = load_circuit(input)?;
    println!(
        "  Loaded: {} qubits, {} columns, {} gates",
        circuit.num_qubits(),
        circuit.num_cols(),
        circuit.num_gates(true)?
    );

    let initial = match options.initial {
        Some(bits) => parse_initial_values(bits)?,
        None => Vec::new(),
    };
    if initial.len() > circuit.num_qubits() {
        anyhow::bail!(
            "Initial values cover {} wires but circuit has {} qubits",
            initial.len(),
            circuit.num_qubits()
        );
    }

    let mut sim = Simulator::new(config);
    let mut progress = ProgressLog {
        num_cols: circuit.num_cols(),
    };
    let stats = sim.run(&circuit, &initial, &mut progress)?;

    println!(
        "\n{} Executed {} of {} gates ({} skipped) in {:?}",
        style("✓").green().bold(),
        stats.executed,
        stats.gates,
        stats.skipped,
        stats.duration
    );

    println!("\n{}", style("State:").bold());
    for line in sim.state_as_string(!options.all_states)?.lines() {
        println!("  {line}");
    }

    println!("\n{}", style("Probabilities:").bold());
    for (wire, p) in sim.probabilities()?.iter().enumerate() {
        let bar_len = (p * 25.0).round() as usize;
        println!(
            "  q{:<3} {:>8.5} {}",
            wire,
            p,
            style("█".repeat(bar_len)).green()
        );
    }

    let outcome = sim.measure_all(options.force)?;
    println!(
        "\n{} {}",
        style("Measured:").bold(),
        style(bitstring(&outcome)).cyan()
    );

    if !sim.registers().is_empty() {
        println!("\n{}", style("Registers:").bold());
        for (name, bits) in sim.registers().iter() {
            println!(
                "  {} = {} ({})",
                style(name).yellow(),
                sim.creg_value(name)?,
                bitstring(bits)
            );
        }
    }

    Ok(())
}
