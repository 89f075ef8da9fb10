//! qugrid Sparse State-Vector Simulator
//!
//! This crate executes [`qugrid_ir::Circuit`]s on a sparse state vector:
//! only populated basis states are stored, keyed by their index, so
//! circuits that keep most amplitudes at zero stay cheap well beyond the
//! width a dense vector could hold.
//!
//! # Features
//!
//! - **Sparse Storage**: `FxHashMap<u64, Complex64>` plus a population mask
//! - **Catalog Gates**: every primitive from `qugrid-ir`, parameters included
//! - **Conditional Execution**: gates gated on classical register values
//! - **Strongest-Outcome Measurement**: deterministic up to exact ties
//!
//! # Performance
//!
//! Applying a `k`-qubit gate visits at most `2^(n-k)` bases times the
//! non-zero entries of its matrix, and only bases whose untouched bits
//! are populated somewhere in the state.
//!
//! | Populated amplitudes | Memory |
//! |----------------------|--------|
//! | 1 000 | ~32 KB |
//! | 100 000 | ~3 MB |
//! | 2^20 | ~32 MB |
//!
//! # Example
//!
//! ```rust
//! use qugrid_ir::Circuit;
//! use qugrid_sim::{Simulator, SimulatorConfig};
//!
//! let mut circuit = Circuit::new(2);
//! circuit.x(0).unwrap().cx(0, 1).unwrap();
//!
//! let mut sim = Simulator::new(SimulatorConfig::default().with_seed(1));
//! sim.run(&circuit, &[], &mut ()).unwrap();
//!
//! assert_eq!(sim.measure_all(false).unwrap(), vec![true, true]);
//! assert_eq!(sim.state_as_string(true).unwrap(), " 1.00000000+0.00000000i|11⟩\t100%");
//! ```

pub mod config;
pub mod error;
pub mod simulator;
pub mod state;

pub use config::SimulatorConfig;
pub use error::{SimError, SimResult};
pub use simulator::{RunObserver, RunStats, Simulator};
pub use state::SparseState;
