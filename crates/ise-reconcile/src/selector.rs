//! # Method Selector
//!
//! Picks one lookup strategy from an ordered list. Each strategy comes with a
//! presence vector: one flag per field it needs, `true` when the field was
//! supplied. The first strategy whose vector is all `true` wins; an empty
//! vector is vacuously satisfied, which is how a catch-all strategy with no
//! required fields acts as the last resort.

use crate::kind::Lookup;
use crate::state::IdentityKey;

/// Index of the first fully satisfied presence vector, if any.
pub fn select(vectors: &[Vec<bool>]) -> Option<usize> {
    vectors.iter().position(|v| v.iter().all(|present| *present))
}

/// Presence vector of each strategy against the supplied key.
pub fn presence_vectors(strategies: &[Lookup], key: &IdentityKey) -> Vec<Vec<bool>> {
    strategies
        .iter()
        .map(|s| s.required_fields().iter().map(|f| key.contains(f)).collect())
        .collect()
}

/// Chooses the lookup to run for `key`.
///
/// Returns `None` when no strategy can be satisfied; the caller reports that
/// as an ambiguous identity instead of scanning with an empty key.
pub fn pick(strategies: &[Lookup], key: &IdentityKey) -> Option<Lookup> {
    select(&presence_vectors(strategies, key)).map(|i| strategies[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn key(pairs: &[(&str, &str)]) -> IdentityKey {
        IdentityKey::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn first_satisfied_vector_wins() {
        assert_eq!(select(&[vec![false], vec![true], vec![true, true]]), Some(1));
        assert_eq!(select(&[vec![true, false], vec![false]]), None);
        assert_eq!(select(&[]), None);
    }

    #[test]
    fn empty_vector_is_vacuously_satisfied() {
        assert_eq!(select(&[vec![false], vec![]]), Some(1));
    }

    #[test]
    fn id_beats_name_when_both_present() {
        let strategies = [Lookup::ById, Lookup::ByName];
        let both = key(&[("id", "abc"), ("name", "profileA")]);
        assert_eq!(pick(&strategies, &both), Some(Lookup::ById));
        let name_only = key(&[("name", "profileA")]);
        assert_eq!(pick(&strategies, &name_only), Some(Lookup::ByName));
    }

    #[test]
    fn compound_key_needs_every_field() {
        const FIELDS: &[&str] = &["dictionary_name", "name"];
        let strategies = [Lookup::ByKeys(FIELDS)];
        assert_eq!(pick(&strategies, &key(&[("name", "Framed-IP")])), None);
        assert_eq!(
            pick(
                &strategies,
                &key(&[("dictionary_name", "Radius"), ("name", "Framed-IP")])
            ),
            Some(Lookup::ByKeys(FIELDS))
        );
    }

    #[test]
    fn nothing_supplied_is_ambiguous() {
        let strategies = [Lookup::ById, Lookup::Scan { fields: &["name"] }];
        assert_eq!(pick(&strategies, &IdentityKey::default()), None);
    }
}
