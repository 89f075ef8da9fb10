//! Gates command implementation.

use console::style;

use qugrid_ir::gate;

/// Execute the gates command.
pub fn execute(verbose: bool) {
    println!("{} Primitive gates:\n", style("qugrid").cyan().bold());

    for entry in gate::catalog() {
        let params = if entry.params.is_empty() {
            String::new()
        } else {
            format!("({})", entry.params.join(", "))
        };
        println!(
            "  {:<10} {} qubit{} {}",
            style(format!("{}{}", entry.name, params)).bold(),
            entry.num_qubits(),
            if entry.num_qubits() == 1 { " " } else { "s" },
            entry.description
        );
        if verbose {
            for row in &entry.template {
                let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                println!("      [{}]", cells.join(", "));
            }
        }
    }

    println!(
        "\n  {:<10} 1 qubit  {}",
        style(gate::MEASURE).bold(),
        "Measure into a classical register bit"
    );
}
