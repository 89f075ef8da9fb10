//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use qugrid_ir::{Circuit, CircuitSnapshot};
use qugrid_sim::SimulatorConfig;

/// Load a circuit from a JSON snapshot file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let source = read_file(path)?;
    let snapshot = CircuitSnapshot::from_json(&source)
        .map_err(|e| anyhow::anyhow!("Parse error in {path}: {e}"))?;
    Circuit::from_snapshot(snapshot).with_context(|| format!("Invalid circuit in {path}"))
}

/// Load simulator settings from a YAML or JSON file, or use the defaults.
pub fn load_config(path: Option<&str>) -> Result<SimulatorConfig> {
    let Some(path) = path else {
        return Ok(SimulatorConfig::default());
    };
    let source = read_file(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON config: {path}")),
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML config: {path}")),
    }
}

/// Parse initial wire values given as a bitstring, wire 0 first.
pub fn parse_initial_values(bits: &str) -> Result<Vec<bool>> {
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => anyhow::bail!("Invalid initial value '{other}': expected 0 or 1"),
        })
        .collect()
}

/// Render bits as `0`/`1`, first bit first.
pub fn bitstring(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))
        }
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

fn read_file(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_initial_values() {
        assert_eq!(parse_initial_values("101").unwrap(), vec![true, false, true]);
        assert!(parse_initial_values("").unwrap().is_empty());
        assert!(parse_initial_values("1x").is_err());
    }

    #[test]
    fn test_bitstring() {
        assert_eq!(bitstring(&[true, false, true, true]), "1011");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_circuit("/nonexistent/circuit.json").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_load_circuit_roundtrip() {
        let mut circuit = Circuit::new(2);
        circuit.h(0).unwrap().cx(0, 1).unwrap();
        let json = circuit.save(false).unwrap().to_json().unwrap();
        let file = temp_file(".json", &json);

        let loaded = load_circuit(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.num_qubits(), 2);
        assert_eq!(loaded.num_cols(), 2);
    }

    #[test]
    fn test_load_yaml_config() {
        let file = temp_file(".yaml", "max_qubits: 12\nseed: 3\n");
        let config = load_config(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.max_qubits, 12);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.probability_decimals, 5);
    }

    #[test]
    fn test_load_json_config() {
        let file = temp_file(".json", r#"{"prune_threshold": 1e-9}"#);
        let config = load_config(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.prune_threshold, 1e-9);
    }

    #[test]
    fn test_default_config() {
        assert_eq!(load_config(None).unwrap(), SimulatorConfig::default());
    }
}
