use catsync_diff::{
    build_enum_values_update_actions, reconcile, CollectionActions, DiffError, DiffResult,
    EnumValueAction, NoopObserver, RecordingObserver,
};
use catsync_types::PlainEnumValue;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Minimal collection: items are `(key, id, label)` triples.
#[derive(Debug, Clone, PartialEq)]
struct Item {
    key: Option<String>,
    id: String,
    label: String,
}

fn item(key: &str, label: &str) -> Item {
    Item {
        key: Some(key.to_string()),
        id: format!("id-{key}"),
        label: label.to_string(),
    }
}

fn keyless(id: &str) -> Item {
    Item {
        key: None,
        id: id.to_string(),
        label: String::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Remove(String),
    Relabel(String, String),
    Reorder(Vec<String>),
    Add(String, usize),
}

struct Items;

impl CollectionActions for Items {
    type Old = Item;
    type New = Item;
    type Action = Action;

    fn container(&self) -> String {
        "items".to_string()
    }

    fn old_key<'a>(&self, item: &'a Item) -> Option<&'a str> {
        item.key.as_deref()
    }

    fn new_key<'a>(&self, draft: &'a Item) -> Option<&'a str> {
        draft.key.as_deref()
    }

    fn order_id(&self, item: &Item) -> String {
        item.id.clone()
    }

    fn remove(&self, key: &str) -> Action {
        Action::Remove(key.to_string())
    }

    fn modify(&self, old: &Item, new: &Item) -> DiffResult<Vec<Action>> {
        if new.label == "!" {
            return Err(DiffError::BlankCustomTypeId {
                target: format!("item {}", old.id),
            });
        }
        Ok(if old.label == new.label {
            vec![]
        } else {
            vec![Action::Relabel(old.id.clone(), new.label.clone())]
        })
    }

    fn reorder(&self, order: Vec<String>) -> Action {
        Action::Reorder(order)
    }

    fn add(&self, draft: &Item, position: usize) -> Action {
        Action::Add(draft.key.clone().unwrap_or_default(), position)
    }
}

fn run(old: &[Item], new: &[Item]) -> DiffResult<Vec<Action>> {
    reconcile(&Items, old, Some(new), &NoopObserver)
}

// ── Basic reconciliation ────────────────────────────────────────

#[test]
fn identical_lists_yield_nothing() {
    let list = vec![item("a", "A"), item("b", "B")];
    assert_eq!(run(&list, &list).unwrap(), vec![]);
}

#[test]
fn removals_modifications_reorder_then_additions() {
    let old = vec![item("a", "A"), item("b", "B"), item("c", "C")];
    let new = vec![item("d", "D"), item("c", "C2"), item("a", "A")];

    assert_eq!(
        run(&old, &new).unwrap(),
        vec![
            Action::Remove("b".into()),
            Action::Relabel("id-c".into(), "C2".into()),
            Action::Reorder(vec!["id-c".into(), "id-a".into()]),
            Action::Add("d".into(), 0),
        ]
    );
}

#[test]
fn rotation_produces_exactly_one_reorder() {
    let old = vec![item("a", ""), item("b", ""), item("c", "")];
    let new = vec![item("c", ""), item("a", ""), item("b", "")];

    assert_eq!(
        run(&old, &new).unwrap(),
        vec![Action::Reorder(vec![
            "id-c".into(),
            "id-a".into(),
            "id-b".into()
        ])]
    );
}

#[test]
fn additions_keep_draft_order_and_positions() {
    let old = vec![item("b", "")];
    let new = vec![item("a", ""), item("b", ""), item("c", "")];

    assert_eq!(
        run(&old, &new).unwrap(),
        vec![Action::Add("a".into(), 0), Action::Add("c".into(), 2)]
    );
}

#[test]
fn absent_new_list_removes_everything() {
    let old = vec![item("a", ""), item("b", "")];

    let actions = reconcile(&Items, &old, None, &NoopObserver).unwrap();

    assert_eq!(
        actions,
        vec![Action::Remove("a".into()), Action::Remove("b".into())]
    );
}

#[test]
fn empty_new_list_removes_everything() {
    let old = vec![item("a", "")];
    assert_eq!(run(&old, &[]).unwrap(), vec![Action::Remove("a".into())]);
}

// ── Malformed input ─────────────────────────────────────────────

#[test]
fn duplicate_draft_keys_fail_without_partial_result() {
    let old = vec![item("gone", "")];
    let new = vec![item("a", ""), item("a", "other")];

    let err = run(&old, &new).unwrap_err();

    assert_eq!(
        err,
        DiffError::DuplicateKey {
            container: "items".into(),
            key: "a".into()
        }
    );
}

#[test]
fn keyless_draft_fails() {
    let new = vec![item("a", ""), keyless("x")];

    assert_eq!(
        run(&[], &new).unwrap_err(),
        DiffError::MissingDraftKey {
            container: "items".into(),
            position: 1
        }
    );
}

#[test]
fn keyless_old_items_are_skipped_with_warning() {
    let observer = RecordingObserver::new();
    let old = vec![keyless("orphan"), item("a", "")];
    let new = vec![item("a", "")];

    let actions = reconcile(&Items, &old, Some(&new), &observer).unwrap();

    assert_eq!(actions, vec![]);
    assert_eq!(observer.warnings().len(), 1);
    assert!(observer.warnings()[0].contains("position 0"));
}

#[test]
fn failed_item_modification_drops_only_that_item() {
    let observer = RecordingObserver::new();
    let old = vec![item("a", "A"), item("b", "B")];
    let new = vec![item("a", "!"), item("b", "B2")];

    let actions = reconcile(&Items, &old, Some(&new), &observer).unwrap();

    assert_eq!(actions, vec![Action::Relabel("id-b".into(), "B2".into())]);
    assert_eq!(observer.errors().len(), 1);
}

// ── Properties ──────────────────────────────────────────────────

fn apply(mut list: Vec<PlainEnumValue>, actions: &[EnumValueAction<PlainEnumValue>]) -> Vec<PlainEnumValue> {
    for action in actions {
        match action {
            EnumValueAction::RemoveEnumValues { keys, .. } => {
                list.retain(|v| !keys.contains(&v.key));
            }
            EnumValueAction::ChangeEnumValueLabel { value, .. } => {
                for v in list.iter_mut().filter(|v| v.key == value.key) {
                    v.label = value.label.clone();
                }
            }
            EnumValueAction::ChangeEnumValueOrder { keys, .. } => {
                list.sort_by_key(|v| keys.iter().position(|k| *k == v.key));
            }
            EnumValueAction::AddEnumValue {
                value, position, ..
            } => list.insert(*position, value.clone()),
        }
    }
    list
}

fn arb_values() -> impl Strategy<Value = Vec<PlainEnumValue>> {
    prop::collection::btree_map("[a-h]", "[xy]", 0..8)
        .prop_map(|m| m.into_iter().map(|(k, l)| PlainEnumValue::new(k, l)).collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn second_pass_converges(old in arb_values(), new in arb_values()) {
        let first = build_enum_values_update_actions("size", &old, Some(&new), &NoopObserver).unwrap();
        let applied = apply(old, &first);
        prop_assert_eq!(&applied, &new);

        let second = build_enum_values_update_actions("size", &applied, Some(&new), &NoopObserver).unwrap();
        prop_assert!(second.is_empty());
    }

    #[test]
    fn at_most_one_reorder(old in arb_values(), new in arb_values()) {
        let actions = build_enum_values_update_actions("size", &old, Some(&new), &NoopObserver).unwrap();
        let reorders = actions
            .iter()
            .filter(|a| matches!(a, EnumValueAction::ChangeEnumValueOrder { .. }))
            .count();
        prop_assert!(reorders <= 1);
    }
}
