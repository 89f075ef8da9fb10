//! Circuit execution on a sparse state.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;
use tracing::{debug, instrument, warn};

use qugrid_ir::{
    BitIndex, Circuit, ClassicalRegisters, CregTarget, GateOptions, MEASURE, format_complex, gate,
    round_to,
};

use crate::config::SimulatorConfig;
use crate::error::{SimError, SimResult};
use crate::state::{MAX_STATE_QUBITS, SparseState};

/// Callbacks fired while [`Simulator::run`] walks the grid.
///
/// Both methods default to no-ops; `()` ignores every event.
pub trait RunObserver {
    /// A connector-0 cell was visited, whether or not it executed.
    /// `count` is the running number of visited gates, starting at 1.
    fn on_gate(&mut self, _column: usize, _wire: usize, _count: usize) {}

    /// Every gate of `column` was visited.
    fn on_column(&mut self, _column: usize) {}
}

impl RunObserver for () {}

/// Statistics of the last [`Simulator::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Gates visited.
    pub gates: usize,
    /// Gates applied.
    pub executed: usize,
    /// Conditional gates whose condition did not hold.
    pub skipped: usize,
    /// Wall time of the run.
    pub duration: Duration,
}

/// Sparse state-vector simulator.
///
/// The simulator owns its state and a copy of the circuit's classical
/// registers. It starts uninitialized; [`init_state`](Self::init_state)
/// or [`run`](Self::run) create `|0...0⟩`.
///
/// Measurement is a strongest-outcome view: [`measure_all`](Self::measure_all)
/// picks the most probable basis state and does not collapse the
/// amplitudes.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    state: Option<SparseState>,
    registers: ClassicalRegisters,
    /// Cached outcome of `measure_all`, one bit per wire.
    collapsed: Vec<bool>,
    /// Cached marginal probabilities, one per wire.
    probabilities: Vec<f64>,
    rng: StdRng,
    stats: RunStats,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl Simulator {
    /// Create an uninitialized simulator.
    pub fn new(config: SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            state: None,
            registers: ClassicalRegisters::new(),
            collapsed: Vec::new(),
            probabilities: Vec::new(),
            rng,
            stats: RunStats::default(),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Number of simulated qubits, zero when uninitialized.
    pub fn num_qubits(&self) -> usize {
        self.state.as_ref().map_or(0, SparseState::num_qubits)
    }

    /// Number of basis states, `2^num_qubits`.
    pub fn num_amplitudes(&self) -> u64 {
        1u64 << self.num_qubits()
    }

    /// The current state, if initialized.
    pub fn state(&self) -> Option<&SparseState> {
        self.state.as_ref()
    }

    /// Amplitude of basis state `index`.
    pub fn amplitude(&self, index: u64) -> SimResult<Complex64> {
        Ok(self.require_state()?.amplitude(index))
    }

    /// Classical registers as written by measurements.
    pub fn registers(&self) -> &ClassicalRegisters {
        &self.registers
    }

    /// Mutable access to the classical registers.
    pub fn registers_mut(&mut self) -> &mut ClassicalRegisters {
        &mut self.registers
    }

    /// Unsigned value of register `name`.
    pub fn creg_value(&self, name: &str) -> SimResult<u64> {
        Ok(self.registers.value(name)?)
    }

    /// Statistics of the last run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    // =========================================================================
    // State lifecycle
    // =========================================================================

    /// Start from `|0...0⟩` on `num_qubits` wires with zeroed registers.
    pub fn init_state(&mut self, num_qubits: usize) -> SimResult<()> {
        let max = self.config.max_qubits.min(MAX_STATE_QUBITS);
        if num_qubits > max {
            return Err(SimError::TooManyQubits {
                requested: num_qubits,
                max,
            });
        }
        self.state = Some(SparseState::new(num_qubits));
        self.registers.reset();
        self.invalidate();
        Ok(())
    }

    /// Return to `|0...0⟩` at the current width with zeroed registers.
    pub fn reset_state(&mut self) -> SimResult<()> {
        let num_qubits = self.require_state()?.num_qubits();
        self.init_state(num_qubits)
    }

    fn require_state(&self) -> SimResult<&SparseState> {
        self.state.as_ref().ok_or(SimError::NotInitialized)
    }

    fn invalidate(&mut self) {
        self.collapsed.clear();
        self.probabilities.clear();
    }

    // =========================================================================
    // Gate application
    // =========================================================================

    /// Apply one gate.
    ///
    /// `measure` writes the wire's collapsed bit into `options.creg` and
    /// fails without one. Unknown gate names are logged and skipped.
    pub fn apply_gate(
        &mut self,
        name: &str,
        wires: &[usize],
        options: &GateOptions,
    ) -> SimResult<()> {
        let num_qubits = self.require_state()?.num_qubits();
        let mut seen = FxHashSet::default();
        for &wire in wires {
            if wire >= num_qubits {
                return Err(SimError::QubitOutOfRange {
                    gate_name: name.to_string(),
                    wire,
                    num_qubits,
                });
            }
            if !seen.insert(wire) {
                return Err(qugrid_ir::IrError::DuplicateQubit {
                    wire,
                    gate_name: Some(name.to_string()),
                }
                .into());
            }
        }

        if name == MEASURE {
            let wire = wires.first().copied().unwrap_or_default();
            let destination = options
                .creg
                .as_ref()
                .ok_or(SimError::MeasureWithoutDestination { wire })?;
            self.measure(wire, Some(destination))?;
            return Ok(());
        }

        let Some(primitive) = gate::lookup(name) else {
            warn!("Unknown gate \"{}\"", name);
            return Ok(());
        };

        let matrix = primitive.matrix(&options.params)?;
        let expected = 1usize << wires.len();
        if matrix.dim() != expected {
            return Err(SimError::MatrixSizeMismatch {
                gate_name: name.to_string(),
                dim: matrix.dim(),
                expected,
                wires: wires.len(),
            });
        }

        self.invalidate();
        let threshold = self.config.prune_threshold;
        if let Some(state) = self.state.as_mut() {
            state.apply_transform(&matrix, wires, threshold);
        }
        Ok(())
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run `circuit` from `|0...0⟩`.
    ///
    /// Wires whose entry in `initial_values` is `true` are flipped first.
    /// The circuit is decomposed once, then cells are visited column by
    /// column, wire by wire. A conditional gate executes only when its
    /// register's value equals the condition literal.
    #[instrument(skip(self, circuit, initial_values, observer))]
    pub fn run(
        &mut self,
        circuit: &Circuit,
        initial_values: &[bool],
        observer: &mut impl RunObserver,
    ) -> SimResult<RunStats> {
        let start = Instant::now();

        self.registers = circuit.cregs().clone();
        self.init_state(circuit.num_qubits())?;

        debug!(
            "Running circuit: {} qubits, {} columns",
            circuit.num_qubits(),
            circuit.num_cols()
        );

        for (wire, _) in initial_values
            .iter()
            .enumerate()
            .take(circuit.num_qubits())
            .filter(|(_, v)| **v)
        {
            self.apply_gate("x", &[wire], &GateOptions::default())?;
        }

        let decomposed = circuit.decomposed()?;
        let mut stats = RunStats::default();

        for column in 0..decomposed.num_cols() {
            for wire in 0..decomposed.num_qubits() {
                let Some(cell) = decomposed.cell(column, wire) else {
                    continue;
                };
                if cell.connector != 0 {
                    continue;
                }
                let Some(instance) = decomposed.gate_at(column, wire) else {
                    continue;
                };
                stats.gates += 1;

                let execute = match &instance.options.condition {
                    Some(condition) => self.registers.value(&condition.register)? == condition.value,
                    None => true,
                };

                if execute {
                    self.apply_gate(&instance.name, &instance.wires, &instance.options)?;
                    stats.executed += 1;
                } else {
                    stats.skipped += 1;
                }

                observer.on_gate(column, wire, stats.gates);
            }
            observer.on_column(column);
        }

        stats.duration = start.elapsed();
        debug!(
            "Simulation completed in {:?}: {} gates, {} skipped",
            stats.duration, stats.gates, stats.skipped
        );
        self.stats = stats.clone();
        Ok(stats)
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// The most probable basis state, one bit per wire.
    ///
    /// Probabilities are rounded to `probability_decimals` first; exact
    /// ties are broken by a fair coin. The result is cached until the next
    /// gate unless `force` is set.
    pub fn measure_all(&mut self, force: bool) -> SimResult<Vec<bool>> {
        let num_qubits = self.require_state()?.num_qubits();
        if !force && self.collapsed.len() == num_qubits {
            return Ok(self.collapsed.clone());
        }

        let decimals = self.config.probability_decimals;
        let entries = self.require_state()?.sorted();
        let mut best: Option<u64> = None;
        let mut max_chance = 0.0;
        for (index, amplitude) in entries {
            let chance = round_to(amplitude.norm_sqr(), decimals);
            if chance > max_chance
                || (chance == max_chance && (best.is_none() || self.rng.gen_bool(0.5)))
            {
                max_chance = chance;
                best = Some(index);
            }
        }

        let index = best.unwrap_or(0);
        self.collapsed = (0..num_qubits)
            .map(|wire| index & (1u64 << (num_qubits - 1 - wire)) != 0)
            .collect();
        Ok(self.collapsed.clone())
    }

    /// Collapsed bit of `wire`, written to `destination` when given.
    pub fn measure(&mut self, wire: usize, destination: Option<&CregTarget>) -> SimResult<bool> {
        let num_qubits = self.require_state()?.num_qubits();
        if wire >= num_qubits {
            return Err(SimError::QubitOutOfRange {
                gate_name: MEASURE.to_string(),
                wire,
                num_qubits,
            });
        }
        if self.collapsed.len() != num_qubits {
            self.measure_all(false)?;
        }

        let value = self.collapsed[wire];
        if let Some(target) = destination {
            self.registers.set_bit(&target.name, &target.bit, value)?;
            debug!("Measured wire {} into {}[{}]: {}", wire, target.name, target.bit, value);
        }
        Ok(value)
    }

    /// Marginal probability of `|1⟩` per wire, rounded.
    pub fn probabilities(&mut self) -> SimResult<Vec<f64>> {
        let state = self.require_state()?;
        let num_qubits = state.num_qubits();
        if self.probabilities.len() == num_qubits && num_qubits > 0 {
            return Ok(self.probabilities.clone());
        }

        let mut probabilities = vec![0.0; num_qubits];
        for (index, amplitude) in state.iter() {
            for (wire, p) in probabilities.iter_mut().enumerate() {
                if index & state.wire_bit(wire) != 0 {
                    *p += amplitude.norm_sqr();
                }
            }
        }
        let decimals = self.config.probability_decimals;
        for p in &mut probabilities {
            *p = round_to(*p, decimals);
        }

        self.probabilities = probabilities;
        Ok(self.probabilities.clone())
    }

    /// Marginal probability of `|1⟩` on `wire`.
    pub fn probability(&mut self, wire: usize) -> SimResult<f64> {
        let probabilities = self.probabilities()?;
        probabilities
            .get(wire)
            .copied()
            .ok_or(SimError::QubitOutOfRange {
                gate_name: MEASURE.to_string(),
                wire,
                num_qubits: probabilities.len(),
            })
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// One line per basis state: `±re±imi|bits⟩\tpct%`.
    ///
    /// With `only_possible`, states whose rounded percentage is zero are
    /// omitted.
    pub fn state_as_string(&self, only_possible: bool) -> SimResult<String> {
        let mut out = String::new();
        self.write_state(&mut out, only_possible)?;
        Ok(out)
    }

    /// Print [`state_as_string`](Self::state_as_string) to stdout.
    pub fn print(&self, only_possible: bool) -> SimResult<()> {
        println!("{}", self.state_as_string(only_possible)?);
        Ok(())
    }

    /// Write the state dump into `out`.
    pub fn write_state(&self, out: &mut String, only_possible: bool) -> SimResult<()> {
        let state = self.require_state()?;
        let width = state.num_qubits();

        let entries: Vec<(u64, Complex64)> = if only_possible {
            state.sorted()
        } else {
            (0..self.num_amplitudes())
                .map(|i| (i, state.amplitude(i)))
                .collect()
        };

        let mut count = 0;
        for (index, amplitude) in entries {
            let percent = round_to(amplitude.norm_sqr() * 100.0, 2);
            if only_possible && percent == 0.0 {
                continue;
            }
            if count > 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "{}|{:0width$b}⟩\t{}%",
                format_complex(amplitude),
                index,
                percent,
                width = width
            );
            count += 1;
        }
        Ok(())
    }

    /// Compare against a dense list of expected amplitudes.
    ///
    /// Both sides are rounded to `decimals` places. A list shorter than the
    /// state compares its prefix only. Every mismatch is logged.
    pub fn matches_state(&self, expected: &[Complex64], decimals: u32) -> SimResult<bool> {
        let state = self.require_state()?;
        let size = self.num_amplitudes();
        if expected.len() as u64 > size {
            return Err(SimError::StateSizeMismatch {
                expected: usize::try_from(size).unwrap_or(usize::MAX),
                got: expected.len(),
            });
        }
        if (expected.len() as u64) < size {
            warn!(
                "Expected state is incomplete: {} of {} amplitudes",
                expected.len(),
                size
            );
        }

        let round = |c: Complex64| Complex64::new(round_to(c.re, decimals), round_to(c.im, decimals));
        let mut matches = true;
        for (index, want) in (0u64..).zip(expected.iter().copied()) {
            let got = state.amplitude(index);
            if round(want) != round(got) {
                warn!(
                    "State mismatch at |{:0width$b}⟩: expected {}, got {}",
                    index,
                    format_complex(want),
                    format_complex(got),
                    width = state.num_qubits()
                );
                matches = false;
            }
        }
        Ok(matches)
    }

    /// Set one classical bit, growing the register as needed.
    pub fn set_creg_bit(&mut self, name: &str, bit: impl Into<BitIndex>, value: bool) -> SimResult<()> {
        Ok(self.registers.set_bit(name, &bit.into(), value)?)
    }
}
