//! Parses the label file format: one line per input bit, `<port>_<bit>:
//! <kind> [<group>]`.

use indexmap::IndexMap;

use leakcheck_common::LeakCheckError;

/// The declared role of one input bit, as written in the label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// A fresh random mask.
    Mask,
    /// A secret value, not part of a share group.
    Secret,
    /// A don't-care bit, dropped by the normalizer.
    Unimportant,
    /// One bit of a named share group; shares jointly reconstruct a secret
    /// via XOR.
    Share(String),
}

/// One parsed line of a label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelEntry {
    /// The raw bit id, taken from the tail of `var` after its last `_`
    /// (matches the netlist loader's port-cell naming).
    pub bit: String,
    /// The full left-hand-side text (`"a_0"`), kept for pretty-printing
    /// (`helpers.py::get_pretty_labeling`).
    pub signal: String,
    /// The declared role.
    pub kind: LabelKind,
}

/// Parses a whole label file into its entries, in file order.
///
/// # Errors
/// Returns [`LeakCheckError::MalformedLabelLine`] if a non-blank line isn't
/// `<var>: <kind>`, and [`LeakCheckError::MissingShareGroup`] if a `share`
/// line omits its group identifier.
pub fn parse_label_file(text: &str) -> Result<Vec<LabelEntry>, LeakCheckError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(i + 1, line))
        .collect()
}

fn parse_line(line_no: usize, line: &str) -> Result<LabelEntry, LeakCheckError> {
    let (var, val) = line.split_once(':').ok_or_else(|| LeakCheckError::MalformedLabelLine {
        line: line_no,
        text: line.to_string(),
    })?;
    let var = var.trim();
    let bit = var.rsplit('_').next().unwrap_or(var).to_string();

    let mut tokens = val.split_whitespace();
    let kind_token = tokens.next().ok_or_else(|| LeakCheckError::MalformedLabelLine {
        line: line_no,
        text: line.to_string(),
    })?;
    let kind = match kind_token {
        "mask" => LabelKind::Mask,
        "secret" => LabelKind::Secret,
        "unimportant" => LabelKind::Unimportant,
        "share" => {
            let group = tokens
                .next()
                .ok_or(LeakCheckError::MissingShareGroup { line: line_no })?;
            LabelKind::Share(group.to_string())
        }
        other => {
            return Err(LeakCheckError::MalformedLabelLine {
                line: line_no,
                text: format!("unknown label kind {other:?} in {line:?}"),
            })
        }
    };

    Ok(LabelEntry {
        bit,
        signal: var.to_string(),
        kind,
    })
}

/// Groups `share` entries by their group identifier, preserving the order in
/// which each group was first seen (`helpers.py::get_shares`). Used by the
/// Independence Checker to build its per-share-group probe partition.
#[must_use]
pub fn shares(entries: &[LabelEntry]) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for entry in entries {
        if let LabelKind::Share(group) = &entry.kind {
            groups.entry(group.clone()).or_default().push(entry.bit.clone());
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind() {
        let entries = parse_label_file(
            "a_0: mask\nb_1: secret\nc_2: unimportant\nk_3: share g1\nk_4: share g1\n",
        )
        .unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].kind, LabelKind::Mask);
        assert_eq!(entries[3].kind, LabelKind::Share("g1".to_string()));
        assert_eq!(entries[3].bit, "3");
    }

    #[test]
    fn missing_share_group_is_an_error() {
        let err = parse_label_file("a_0: share\n").unwrap_err();
        assert!(matches!(err, LeakCheckError::MissingShareGroup { line: 1 }));
    }

    #[test]
    fn shares_groups_bits_in_first_seen_order() {
        let entries = parse_label_file("x_1: share g2\nx_2: share g1\nx_3: share g2\n").unwrap();
        let groups = shares(&entries);
        let ids: Vec<&String> = groups.keys().collect();
        assert_eq!(ids, vec!["g2", "g1"]);
        assert_eq!(groups["g2"], vec!["1".to_string(), "3".to_string()]);
    }
}
