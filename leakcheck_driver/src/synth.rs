//! The `-p` CLI path: shells out to an external `yosys` to flatten a Verilog
//! design to JSON and writes an all-`unimportant` label template.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::Value;

use crate::error::{DriverError, Result};

/// Runs `yosys` to synthesize `verilog` down to a flat JSON netlist rooted at
/// `top_module`, writing `<verilog-stem>.json` next to the source file, then
/// writes `<verilog-stem>.txt`: one `unimportant` line per port bit in the
/// produced netlist, ready for the user to edit into a real labeling.
///
/// # Errors
/// Returns [`DriverError::YosysNotFound`] if `yosys` isn't on `PATH`,
/// [`DriverError::Io`] on file access failure, and
/// [`DriverError::Misuse`] if the yosys process exits non-zero.
pub fn synthesize(verilog: &Path, top_module: &str) -> Result<(PathBuf, PathBuf)> {
    let yosys = which::which("yosys").map_err(|e| DriverError::YosysNotFound(e.to_string()))?;

    let json_path = verilog.with_extension("json");
    let label_path = verilog.with_extension("txt");

    let mut cmd = std::process::Command::new(&yosys);
    cmd.arg("-p")
        .arg(format!("read_verilog {}", verilog.display()))
        .arg("-p")
        .arg(format!("hierarchy -top {top_module}"))
        .arg("-p")
        .arg("proc; flatten; opt_clean")
        .arg("-p")
        .arg(format!("write_json {}", json_path.display()));
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).stdin(Stdio::null());

    let mut child = cmd.spawn()?;
    let status = child.wait()?;
    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        return Err(DriverError::Misuse(format!("yosys exited with {status}: {stderr}")));
    }

    write_label_template(&json_path, &label_path)?;
    Ok((json_path, label_path))
}

fn write_label_template(json_path: &Path, label_path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(json_path)?;
    let doc: Value = serde_json::from_str(&json).map_err(|e| DriverError::Misuse(e.to_string()))?;
    let top = doc["top_module"].as_str().unwrap_or_default();
    let ports = &doc["modules"][top]["ports"];

    // The trailing token of each generated line must be the raw netlist bit
    // id, not a per-port positional offset: that id is exactly what the
    // netlist loader uses to name the corresponding port cell, so
    // it is what later ties a label-file line back to a graph node.
    let mut out = String::new();
    if let Some(map) = ports.as_object() {
        for (name, port) in map {
            if let Some(bits) = port["bits"].as_array() {
                for bit in bits {
                    let bit_id = match bit {
                        Value::Number(n) => n.to_string(),
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    out.push_str(&format!("{name}_{bit_id}: unimportant\n"));
                }
            }
        }
    }
    std::fs::write(label_path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_template_covers_every_port_bit_as_unimportant() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("design.json");
        let label_path = dir.path().join("design.txt");
        std::fs::write(
            &json_path,
            r#"{
                "top_module": "top",
                "modules": {
                    "top": {
                        "ports": {
                            "a": {"direction": "input", "bits": [2, 3]},
                            "y": {"direction": "output", "bits": [4]}
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        write_label_template(&json_path, &label_path).unwrap();
        let text = std::fs::read_to_string(&label_path).unwrap();
        assert!(text.contains("a_2: unimportant\n"));
        assert!(text.contains("a_3: unimportant\n"));
        assert!(text.contains("y_4: unimportant\n"));
    }
}
