//! JSON model dump for a SAT verdict.

use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SmtError};

/// Writes `{name: bool, ...}` for every activation variable in the
/// satisfying model, mirroring the original tool's `dumps(model)` call.
pub fn write(path: &Path, model: &[(String, bool)]) -> Result<()> {
    let object: serde_json::Map<String, Value> =
        model.iter().map(|(name, active)| (name.clone(), Value::Bool(*active))).collect();
    let json = serde_json::to_string_pretty(&Value::Object(object))
        .map_err(|e| SmtError::from_solver(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| SmtError::from_solver(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = vec![("activation_a_1".to_string(), true), ("activation_b_2".to_string(), false)];

        write(&path, &model).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["activation_a_1"], Value::Bool(true));
        assert_eq!(parsed["activation_b_2"], Value::Bool(false));
    }
}
