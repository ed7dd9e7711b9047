//! Builds labelings from parsed label-file entries.

use indexmap::{IndexMap, IndexSet};

use leakcheck_common::Label;

use crate::parser::{shares, LabelEntry, LabelKind};

/// A complete assignment of symbolic labels to input bits, keyed by the raw
/// bit id (the same string the netlist loader uses to name port cells).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labeling(IndexMap<String, Vec<Label>>);

impl Labeling {
    /// Returns the labels assigned to one bit, if any.
    #[must_use]
    pub fn get(&self, bit: &str) -> Option<&[Label]> {
        self.0.get(bit).map(Vec::as_slice)
    }

    /// Iterates over every `(bit, labels)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Label>)> {
        self.0.iter()
    }

    /// Every label this labeling assigns, across all bits — the raw material
    /// for [`leakcheck_common::variable_universe`].
    #[must_use]
    pub fn all_labels(&self) -> Vec<Label> {
        self.0.values().flatten().copied().collect()
    }

    /// Splits this labeling into one labeling per distinct secret, each
    /// retaining every mask/don't-care label but erasing every *other*
    /// secret's contribution from bits that mention it
    /// (`helpers.py::split_labeling`).
    #[must_use]
    pub fn by_secret(&self) -> Vec<Self> {
        let mut secrets: IndexSet<u32> = IndexSet::new();
        for labels in self.0.values() {
            for l in labels {
                if let Label::Secret(k) = l {
                    secrets.insert(*k);
                }
            }
        }
        secrets
            .into_iter()
            .map(|target| {
                let filtered = self
                    .0
                    .iter()
                    .map(|(bit, labels)| {
                        let kept: Vec<Label> = labels
                            .iter()
                            .copied()
                            .filter(|l| !matches!(l, Label::Secret(k) if *k != target))
                            .collect();
                        (bit.clone(), kept)
                    })
                    .collect();
                Self(filtered)
            })
            .collect()
    }

    /// Renders a human-readable report, one `signal: s_1+m_2` line per bit,
    /// in the order the label file declared them
    /// (`helpers.py::get_pretty_labeling`).
    #[must_use]
    pub fn render(&self, entries: &[LabelEntry]) -> String {
        let mut out = String::new();
        for entry in entries {
            if let Some(labels) = self.get(&entry.bit) {
                let joined = labels.iter().map(ToString::to_string).collect::<Vec<_>>().join("+");
                out.push_str(&format!("{}: {joined}\n", entry.signal));
            }
        }
        out
    }
}

struct OrdinaryCounters {
    mask: u32,
    secret: u32,
    unimportant: u32,
}

fn ordinary_labels(entries: &[LabelEntry]) -> (IndexMap<String, Vec<Label>>, OrdinaryCounters) {
    let mut labels = IndexMap::new();
    let mut counters = OrdinaryCounters { mask: 1, secret: 1, unimportant: 1 };
    for entry in entries {
        match &entry.kind {
            LabelKind::Mask => {
                labels.insert(entry.bit.clone(), vec![Label::Mask(counters.mask)]);
                counters.mask += 1;
            }
            LabelKind::Secret => {
                labels.insert(entry.bit.clone(), vec![Label::Secret(counters.secret)]);
                counters.secret += 1;
            }
            LabelKind::Unimportant => {
                labels.insert(entry.bit.clone(), vec![Label::DontCare(counters.unimportant)]);
                counters.unimportant += 1;
            }
            LabelKind::Share(_) => {}
        }
    }
    (labels, counters)
}

/// Builds the single canonical labeling: every share group gets one fresh
/// secret plus `n - 1` fresh masks.
#[must_use]
pub fn generate_single(entries: &[LabelEntry]) -> Labeling {
    let (mut labels, mut counters) = ordinary_labels(entries);
    for (_, bits) in shares(entries) {
        let n = bits.len();
        let start = counters.mask;
        labels.insert(
            bits[0].clone(),
            std::iter::once(Label::Secret(counters.secret))
                .chain((0..n as u32 - 1).map(|i| Label::Mask(start + i)))
                .collect(),
        );
        for (offset, bit) in bits[1..].iter().enumerate() {
            labels.insert(bit.clone(), vec![Label::Mask(start + offset as u32)]);
        }
        counters.mask = start + n as u32 - 1;
        counters.secret += 1;
    }
    Labeling(labels)
}

/// Builds the optimized labeling family: one variant per share group, each
/// tagging exactly that group with its secret and leaving every other group
/// as a pure mask sum. Each variant is an
/// independently-materialized map, never a shared buffer mutated in place.
#[must_use]
pub fn generate_optimized(entries: &[LabelEntry]) -> Vec<Labeling> {
    let (ordinary, mut counters) = ordinary_labels(entries);
    let groups = shares(entries);
    let mut handled: IndexSet<String> = IndexSet::new();
    let mut family = Vec::with_capacity(groups.len());

    for round in 1..=groups.len() {
        let mut tmp = ordinary.clone();
        let mut tagged_this_round = false;
        for (group_id, bits) in &groups {
            let n = bits.len();
            let start = counters.mask;
            let masks = (0..n as u32 - 1).map(|i| Label::Mask(start + i));
            if !tagged_this_round && !handled.contains(group_id) {
                tmp.insert(
                    bits[0].clone(),
                    std::iter::once(Label::Secret(round as u32)).chain(masks).collect(),
                );
                handled.insert(group_id.clone());
                tagged_this_round = true;
            } else {
                tmp.insert(bits[0].clone(), masks.collect());
            }
            for (offset, bit) in bits[1..].iter().enumerate() {
                tmp.insert(bit.clone(), vec![Label::Mask(start + offset as u32)]);
            }
            counters.mask = start + n as u32 - 1;
        }
        family.push(Labeling(tmp));
    }
    family
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_label_file;

    #[test]
    fn single_labeling_shares_the_same_masks_between_first_and_remaining_bits() {
        let entries = parse_label_file("k_1: share g\nk_2: share g\nk_3: share g\n").unwrap();
        let labeling = generate_single(&entries);
        let first = labeling.get("1").unwrap();
        assert_eq!(first[0], Label::Secret(1));
        let masks_in_first: Vec<Label> = first[1..].to_vec();
        let b = labeling.get("2").unwrap()[0];
        let c = labeling.get("3").unwrap()[0];
        assert!(masks_in_first.contains(&b));
        assert!(masks_in_first.contains(&c));
    }

    #[test]
    fn optimized_family_has_one_variant_per_share_group() {
        let entries =
            parse_label_file("k_1: share g1\nk_2: share g1\nj_3: share g2\nj_4: share g2\n").unwrap();
        let family = generate_optimized(&entries);
        assert_eq!(family.len(), 2);
        // Exactly one secret-tagged bit per variant.
        for labeling in &family {
            let secret_count = labeling
                .all_labels()
                .iter()
                .filter(|l| matches!(l, Label::Secret(_)))
                .count();
            assert_eq!(secret_count, 1);
        }
    }

    #[test]
    fn by_secret_erases_other_secrets_but_keeps_masks() {
        let entries = parse_label_file("a_1: secret\nb_2: secret\nc_3: mask\n").unwrap();
        let labeling = generate_single(&entries);
        let split = labeling.by_secret();
        assert_eq!(split.len(), 2);
        for part in &split {
            assert_eq!(part.get("3").unwrap().len(), 1);
        }
        assert_eq!(split[0].get("2").unwrap().len(), 0);
        assert_eq!(split[1].get("1").unwrap().len(), 0);
    }
}
