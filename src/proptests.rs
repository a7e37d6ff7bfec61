use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

type Model = BTreeMap<Name, Vec<Value>>;

#[derive(Clone, Debug)]
enum Op {
    Add(Name, Vec<Value>),
    Set(Name, Vec<Value>),
    Remove(Name, Option<Vec<Value>>),
    Get(Name),
    Lpm(Name),
    IsEntry(Name),
    Compact,
}

fn name_strategy() -> impl Strategy<Value = Name> + Clone {
    // A tiny alphabet so that names collide and share prefixes often. The
    // odd components exercise escaping in the text trie.
    let component = prop_oneof![
        Just(&b"a"[..]),
        Just(&b"b"[..]),
        Just(&b"c"[..]),
        Just(&b"x/y"[..]),
        Just(&b"%41"[..]),
        Just(&b"\x00\xff"[..]),
    ];
    prop::collection::vec(component, 0..=4).prop_map(|components| Name::from_components(components))
}

fn values_strategy() -> impl Strategy<Value = Vec<Value>> + Clone {
    let value = prop_oneof![Just("AS1"), Just("AS2"), Just("AS3")].prop_map(Value::from);
    prop::collection::vec(value, 0..=3)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let name = name_strategy();
    let values = values_strategy();
    let op = prop_oneof![
        30 => (name.clone(), values.clone()).prop_map(|(n, v)| Op::Add(n, v)),
        8 => (name.clone(), values.clone()).prop_map(|(n, v)| Op::Set(n, v)),
        15 => (name.clone(), prop::option::of(values)).prop_map(|(n, v)| Op::Remove(n, v)),
        15 => name.clone().prop_map(Op::Get),
        15 => name.clone().prop_map(Op::Lpm),
        10 => name.clone().prop_map(Op::IsEntry),
        2 => Just(Op::Compact),
    ];
    prop::collection::vec(op, 0..=300)
}

fn dedup(values: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for v in values {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    out
}

fn model_remove(m: &mut Model, name: &Name, targets: Option<&[Value]>) -> EchtResult<Option<Vec<Value>>> {
    let Some(stored) = m.get_mut(name) else {
        return Ok(None);
    };
    match targets {
        None => stored.clear(),
        Some(targets) => {
            if let Some(missing) = targets.iter().find(|v| !stored.contains(v)) {
                return Err(EchtError::ValueNotPresent {
                    name: name.clone(),
                    value: missing.clone(),
                });
            }
            stored.retain(|v| !targets.contains(v));
        }
    }
    Ok(Some(stored.clone()))
}

fn model_lpm(m: &Model, name: &Name) -> Option<(Name, Vec<Value>)> {
    (1..=name.len()).rev().find_map(|len| {
        let prefix = name.prefix(len);
        let values = m.get(&prefix).filter(|v| !v.is_empty())?;
        Some((prefix, values.clone()))
    })
}

/// A trie drops an emptied entry unless something live sits below it.
fn model_compact(m: &mut Model) {
    let live: Vec<Name> = m
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(n, _)| n.clone())
        .collect();
    m.retain(|name, values| !values.is_empty() || live.iter().any(|l| name.is_prefix_of(l)));
}

fn run(kind: BackendKind, ops: &[Op]) -> Result<(), TestCaseError> {
    let mut b = kind.build(&Config::default());
    let mut m = Model::new();

    for op in ops {
        match op {
            Op::Add(name, values) => {
                b.add(name, values);
                if !name.is_empty() {
                    let stored = m.entry(name.clone()).or_default();
                    let merged: Vec<Value> = stored.iter().chain(values.iter()).cloned().collect();
                    *stored = dedup(&merged);
                }
            }
            Op::Set(name, values) => {
                b.set(name, values);
                if !name.is_empty() {
                    m.insert(name.clone(), dedup(values));
                }
            }
            Op::Remove(name, targets) => {
                let removal = match targets {
                    Some(values) => Removal::Values(values),
                    None => Removal::All,
                };
                let got = b
                    .remove(name, removal)
                    .map(|rest| rest.map(|v| v.as_slice().to_vec()));
                let expected = model_remove(&mut m, name, targets.as_deref());
                prop_assert_eq!(got, expected);
            }
            Op::Get(name) => {
                let got = b.get(name).map(|v| v.as_slice().to_vec());
                prop_assert_eq!(got, m.get(name).cloned());
            }
            Op::Lpm(name) => {
                let got = b
                    .longest_prefix_match(name)
                    .map(|hit| (hit.prefix, hit.values.as_slice().to_vec()));
                prop_assert_eq!(got, model_lpm(&m, name));
            }
            Op::IsEntry(name) => {
                prop_assert_eq!(b.is_entry(name), m.contains_key(name));
            }
            Op::Compact => {
                if b.compact().is_ok() {
                    model_compact(&mut m);
                }
            }
        }

        prop_assert_eq!(b.len(), m.len());
    }

    let got: Model = b
        .entries()
        .map(|(n, v)| (n, v.as_slice().to_vec()))
        .collect();
    prop_assert_eq!(got, m);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_named(ops in ops_strategy()) {
        run(BackendKind::Named, &ops)?;
    }

    #[test]
    fn prop_equivalence_text(ops in ops_strategy()) {
        run(BackendKind::Text, &ops)?;
    }

    #[test]
    fn prop_equivalence_dictionary(ops in ops_strategy()) {
        run(BackendKind::Dictionary, &ops)?;
    }

    #[test]
    fn prop_name_text_roundtrip(name in name_strategy()) {
        let text = name.to_string();
        prop_assert_eq!(Name::parse(&text)?, name);
    }

    #[test]
    fn prop_approximate_size_matches_encoding(ops in ops_strategy()) {
        let mut named = NamedTrie::new();
        let mut text = TextTrie::new();
        let mut dict = Dictionary::new();
        for op in &ops {
            if let Op::Add(name, values) | Op::Set(name, values) = op {
                named.add(name, values);
                text.add(name, values);
                dict.add(name, values);
            }
        }
        prop_assert_eq!(named.approximate_size(), named.to_canonical_bytes().len());
        prop_assert_eq!(text.approximate_size(), text.to_canonical_bytes().len());
        prop_assert_eq!(dict.approximate_size(), dict.to_canonical_bytes().len());
        prop_assert_eq!(named.stats(), text.stats());
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_set() -> Vec<(Name, Vec<Value>)> {
    ["/a", "/b", "/a/a", "/a/b", "/b/a/c", "/c"]
        .iter()
        .enumerate()
        .map(|(i, uri)| {
            let name = Name::parse(uri).unwrap();
            (name, vec![Value::from(format!("AS{i}"))])
        })
        .collect()
}

#[test]
fn exhaustive_insert_order_small_set() {
    let entries = small_set();

    let mut reference = NamedTrie::new();
    let mut reference_text = TextTrie::new();
    let mut reference_dict = Dictionary::new();
    for (name, values) in &entries {
        reference.add(name, values);
        reference_text.add(name, values);
        reference_dict.add(name, values);
    }
    let expected = reference.to_canonical_bytes();
    let expected_text = reference_text.to_canonical_bytes();
    let expected_dict = reference_dict.to_canonical_bytes();

    for_each_permutation(&entries, |perm| {
        let mut t = NamedTrie::new();
        let mut tt = TextTrie::new();
        let mut d = Dictionary::new();
        for (name, values) in &perm {
            t.add(name, values);
            tt.add(name, values);
            d.add(name, values);
        }

        assert_eq!(t.to_canonical_bytes(), expected);
        assert_eq!(tt.to_canonical_bytes(), expected_text);
        assert_eq!(d.to_canonical_bytes(), expected_dict);
        assert_eq!(t.stats().total_nodes, reference.stats().total_nodes);
        assert_eq!(t.depth(), 3);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let entries = small_set();

    // Insert in a fixed order, then clear in all permutations.
    let mut base = NamedTrie::new();
    for (name, values) in &entries {
        base.add(name, values);
    }
    let empty = NamedTrie::new().to_canonical_bytes();

    for_each_permutation(&entries, |perm| {
        let mut t = base.clone();
        for (name, values) in &perm {
            let rest = t.remove(name, Removal::Values(values)).unwrap();
            assert_eq!(rest.map(ValueSet::len), Some(0));
            assert!(t.is_entry(name));
            assert_eq!(t.len(), entries.len());
        }
        for (name, _) in &entries {
            assert!(t.longest_prefix_match(name).is_none());
        }

        assert_eq!(t.compact(), base.node_count());
        assert_eq!(t.len(), 0);
        assert_eq!(t.to_canonical_bytes(), empty);
        assert_eq!(t.stats(), base.stats());
    });
}
