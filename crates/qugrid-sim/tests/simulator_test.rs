//! End-to-end tests for circuit simulation.

use num_complex::Complex64;
use qugrid_ir::{Circuit, GateOptions, ParamBindings};
use qugrid_sim::{SimError, Simulator, SimulatorConfig};

fn approx_eq(a: Complex64, b: Complex64) -> bool {
    (a - b).norm() < 1e-10
}

fn simulator() -> Simulator {
    Simulator::new(SimulatorConfig::default().with_seed(7))
}

fn one() -> Complex64 {
    Complex64::new(1.0, 0.0)
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

#[test]
fn x_twice_is_identity() {
    let mut circuit = Circuit::new(1);
    circuit.x(0).unwrap().x(0).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert!(approx_eq(sim.amplitude(0).unwrap(), one()));
    assert!(approx_eq(sim.amplitude(1).unwrap(), Complex64::new(0.0, 0.0)));
}

#[test]
fn h_twice_is_identity() {
    let mut circuit = Circuit::new(1);
    circuit.h(0).unwrap().h(0).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert!(approx_eq(sim.amplitude(0).unwrap(), one()));
    // Pruning is opt-in: the cancelled amplitude stays populated.
    assert_eq!(sim.state().unwrap().len(), 2);
    assert!(approx_eq(sim.amplitude(1).unwrap(), Complex64::new(0.0, 0.0)));
}

#[test]
fn prune_threshold_drops_cancelled_amplitude() {
    let mut circuit = Circuit::new(1);
    circuit.h(0).unwrap().h(0).unwrap();
    let mut sim = Simulator::new(SimulatorConfig::default().with_prune_threshold(1e-12));
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert!(approx_eq(sim.amplitude(0).unwrap(), one()));
    assert_eq!(sim.state().unwrap().len(), 1);
}

#[test]
fn x_then_cx_yields_eleven() {
    let mut circuit = Circuit::new(2);
    circuit.x(0).unwrap().cx(0, 1).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert!(approx_eq(sim.amplitude(0b11).unwrap(), one()));
    assert_eq!(sim.state().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Probabilities
// ---------------------------------------------------------------------------

#[test]
fn ghz_probabilities() {
    let circuit = Circuit::ghz(4).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert_eq!(sim.probabilities().unwrap(), vec![0.5; 4]);
    assert!((sim.state().unwrap().total_probability() - 1.0).abs() < 1e-10);
    assert_eq!(sim.state().unwrap().len(), 2);
}

#[test]
fn wide_ghz_runs_with_default_config() {
    let circuit = Circuit::ghz(30).unwrap();
    let mut sim = Simulator::default();
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert_eq!(sim.state().unwrap().len(), 2);
    assert_eq!(sim.probabilities().unwrap(), vec![0.5; 30]);
}

#[test]
fn qft_of_zero_is_uniform() {
    let circuit = Circuit::qft(3).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    let expected = vec![Complex64::new(1.0 / 8f64.sqrt(), 0.0); 8];
    assert!(sim.matches_state(&expected, 5).unwrap());
}

#[test]
fn probability_of_single_wire() {
    let mut circuit = Circuit::new(2);
    circuit.x(1).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert_eq!(sim.probability(0).unwrap(), 0.0);
    assert_eq!(sim.probability(1).unwrap(), 1.0);
    assert!(matches!(
        sim.probability(2),
        Err(SimError::QubitOutOfRange { wire: 2, .. })
    ));
}

// ---------------------------------------------------------------------------
// Classical control
// ---------------------------------------------------------------------------

#[test]
fn measured_bit_drives_conditional_gate() {
    let mut circuit = Circuit::new(2);
    circuit
        .x(0)
        .unwrap()
        .measure(0, "c", 0)
        .unwrap()
        .conditional("x", &[1], "c", 1)
        .unwrap();

    let mut sim = simulator();
    let stats = sim.run(&circuit, &[], &mut ()).unwrap();

    assert_eq!(sim.creg_value("c").unwrap(), 1);
    assert!(approx_eq(sim.amplitude(0b11).unwrap(), one()));
    assert_eq!(stats.gates, 3);
    assert_eq!(stats.executed, 3);
    assert_eq!(stats.skipped, 0);
}

#[test]
fn false_condition_skips_gate() {
    let mut circuit = Circuit::new(2);
    circuit
        .measure(0, "c", 0)
        .unwrap()
        .conditional("x", &[1], "c", 1)
        .unwrap();

    let mut sim = simulator();
    let stats = sim.run(&circuit, &[], &mut ()).unwrap();

    assert_eq!(sim.creg_value("c").unwrap(), 0);
    assert!(approx_eq(sim.amplitude(0).unwrap(), one()));
    assert_eq!(stats.skipped, 1);
}

#[test]
fn registers_are_zeroed_between_runs() {
    let mut circuit = Circuit::new(1);
    circuit.measure(0, "c", 0).unwrap();

    let mut sim = simulator();
    sim.run(&circuit, &[true], &mut ()).unwrap();
    assert_eq!(sim.creg_value("c").unwrap(), 1);
    sim.run(&circuit, &[], &mut ()).unwrap();
    assert_eq!(sim.creg_value("c").unwrap(), 0);
}

#[test]
fn conditional_custom_gate_body_is_gated() {
    let mut body = Circuit::new(2);
    body.x(0).unwrap().x(1).unwrap();

    let mut circuit = Circuit::new(2);
    circuit.register_gate("flip_both", body.save(false).unwrap());
    circuit.measure(0, "c", 0).unwrap();
    circuit.conditional("flip_both", &[0, 1], "c", 1).unwrap();

    let mut sim = simulator();
    let stats = sim.run(&circuit, &[], &mut ()).unwrap();
    assert_eq!(stats.skipped, 2);
    assert!(approx_eq(sim.amplitude(0).unwrap(), one()));
}

// ---------------------------------------------------------------------------
// Parameters and custom gates
// ---------------------------------------------------------------------------

#[test]
fn parametric_custom_gate() {
    let mut body = Circuit::new(1);
    body.set_params(["theta"]);
    body.append("rx", &[0], ParamBindings::named([("theta", "theta")]))
        .unwrap();

    let mut circuit = Circuit::new(1);
    circuit.register_gate("turn", body.save(false).unwrap());
    let options = GateOptions::with_params(ParamBindings::named([("theta", "pi")]));
    circuit.add_gate("turn", None, &[0], options).unwrap();

    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    // rx(pi)|0⟩ = -i|1⟩
    assert!(approx_eq(sim.amplitude(1).unwrap(), Complex64::new(0.0, -1.0)));
    assert_eq!(sim.measure_all(false).unwrap(), vec![true]);
}

#[test]
fn unbound_parameter_aborts_run() {
    let mut circuit = Circuit::new(1);
    circuit.append("rx", &[0], ParamBindings::default()).unwrap();
    let mut sim = simulator();
    assert!(matches!(
        sim.run(&circuit, &[], &mut ()),
        Err(SimError::Ir(_))
    ));
}

#[test]
fn too_wide_circuit_is_rejected() {
    let circuit = Circuit::new(10);
    let mut sim = Simulator::new(SimulatorConfig::default().with_max_qubits(8));
    assert!(matches!(
        sim.run(&circuit, &[], &mut ()),
        Err(SimError::TooManyQubits { requested: 10, max: 8 })
    ));
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

#[test]
fn measure_all_is_stable_without_force() {
    let circuit = Circuit::ghz(3).unwrap();
    let mut sim = Simulator::default();
    sim.run(&circuit, &[], &mut ()).unwrap();
    let first = sim.measure_all(false).unwrap();
    assert!(first == vec![false; 3] || first == vec![true; 3]);
    for _ in 0..20 {
        assert_eq!(sim.measure_all(false).unwrap(), first);
    }
}

#[test]
fn forced_measure_all_stays_on_strongest_outcomes() {
    let circuit = Circuit::ghz(3).unwrap();
    let mut sim = simulator();
    sim.run(&circuit, &[], &mut ()).unwrap();
    for _ in 0..20 {
        let outcome = sim.measure_all(true).unwrap();
        assert!(outcome == vec![false; 3] || outcome == vec![true; 3]);
    }
}
