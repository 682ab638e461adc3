//! Tests for EditSession: structural edits with undo/redo

use rstest::{fixture, rstest};

use rstree::application::{EditSession, NEW_ITEM_LABEL};
use rstree::domain::{ItemId, TreeItem, TreeStore};
use rstree::util::testing;

fn int(n: i64) -> ItemId {
    ItemId::Int(n)
}

fn labels(session: &EditSession) -> Vec<String> {
    session
        .store()
        .iter()
        .map(|item| item.label.clone())
        .collect()
}

#[fixture]
fn session() -> EditSession {
    testing::init_test_setup();
    EditSession::new(
        TreeStore::new(vec![
            TreeItem::new(1, None, "Root"),
            TreeItem::new(2, Some(int(1)), "Child"),
            TreeItem::new(3, Some(int(2)), "Grandchild"),
        ]),
        0,
    )
}

#[rstest]
fn given_fresh_session_when_checking_history_then_nothing_to_undo(mut session: EditSession) {
    assert!(!session.can_undo());
    assert!(!session.can_redo());
    assert!(!session.undo());
    assert!(!session.redo());
}

#[rstest]
fn given_parent_when_adding_child_then_new_item_is_expanded_under_parent(
    mut session: EditSession,
) {
    let id = session.add_child(Some(int(2)));

    assert_eq!(id, int(4));
    let item = session.store().get_item(&id).unwrap();
    assert_eq!(item.label, NEW_ITEM_LABEL);
    assert_eq!(item.parent, Some(int(2)));
    assert!(session.store().get_item(&int(2)).unwrap().is_expanded());
    assert!(session.can_undo());
}

#[rstest]
fn given_added_child_when_undoing_then_previous_state_returns(mut session: EditSession) {
    let before = session.store().get_snapshot();
    let id = session.add_child(Some(int(1)));

    assert!(session.undo());

    assert!(session.store().get_item(&id).is_none());
    assert_eq!(session.store().get_snapshot(), before);
    assert!(session.can_redo());
}

#[rstest]
fn given_undone_edit_when_redoing_then_edit_is_reapplied(mut session: EditSession) {
    let id = session.add_child(None);
    let after = session.store().get_snapshot();
    session.undo();

    assert!(session.redo());

    assert!(session.store().get_item(&id).is_some());
    assert_eq!(session.store().get_snapshot(), after);
    assert!(!session.can_redo());
}

#[rstest]
fn given_undone_edit_when_making_new_edit_then_redo_is_cleared(mut session: EditSession) {
    session.add_child(None);
    session.undo();
    assert!(session.can_redo());

    session.rename(&int(1), "Renamed");

    assert!(!session.can_redo());
    assert!(!session.redo());
}

#[rstest]
fn given_subtree_when_removing_then_undo_restores_all_of_it(mut session: EditSession) {
    assert!(session.remove(&int(2)));
    assert_eq!(labels(&session), vec!["Root"]);

    session.undo();

    assert_eq!(labels(&session), vec!["Root", "Child", "Grandchild"]);
}

#[rstest]
fn given_unknown_id_when_removing_then_history_is_untouched(mut session: EditSession) {
    assert!(!session.remove(&int(99)));
    assert!(!session.can_undo());
}

#[rstest]
#[case("")]
#[case("   ")]
fn given_blank_label_when_renaming_then_nothing_changes(
    mut session: EditSession,
    #[case] label: &str,
) {
    assert!(!session.rename(&int(3), label));

    assert_eq!(session.store().get_item(&int(3)).unwrap().label, "Grandchild");
    assert!(!session.can_undo());
}

#[rstest]
fn given_label_when_renaming_then_label_is_trimmed_and_undoable(mut session: EditSession) {
    assert!(session.rename(&int(3), "  Leaf  "));
    assert_eq!(session.store().get_item(&int(3)).unwrap().label, "Leaf");

    session.undo();
    assert_eq!(session.store().get_item(&int(3)).unwrap().label, "Grandchild");
}

#[rstest]
fn given_item_when_toggling_then_history_is_not_recorded(mut session: EditSession) {
    assert!(session.toggle_expanded(&int(1)));

    assert!(session.store().get_item(&int(1)).unwrap().is_expanded());
    assert!(!session.can_undo());
}

#[rstest]
fn given_several_edits_when_undoing_all_then_original_returns(mut session: EditSession) {
    let original = session.store().get_snapshot();

    session.add_child(Some(int(3)));
    session.rename(&int(1), "Top");
    session.remove(&int(2));
    session.update(TreeItem::new(1, None, "Top again").with_field("color", "blue"));
    assert_eq!(session.undo_depth(), 4);

    while session.undo() {}

    assert_eq!(session.store().get_snapshot(), original);
}

#[rstest]
fn given_unknown_id_when_updating_then_history_is_untouched(mut session: EditSession) {
    assert!(!session.update(TreeItem::new(42, None, "ghost")));
    assert!(!session.can_undo());
    assert_eq!(session.store().len(), 3);
}

#[test]
fn given_empty_store_when_adding_root_then_first_id_is_one() {
    let mut session = EditSession::new(TreeStore::empty(), 10);

    assert_eq!(session.add_child(None), int(1));
    assert_eq!(session.into_store().roots().len(), 1);
}

#[test]
fn given_max_integer_id_when_adding_child_then_smallest_free_id_is_used() {
    let store = TreeStore::new(vec![
        TreeItem::new(i64::MAX, None, "max"),
        TreeItem::new(1, None, "one"),
        TreeItem::new(3, None, "three"),
    ]);
    let mut session = EditSession::new(store, 0);

    let id = session.add_child(Some(int(i64::MAX)));

    assert_eq!(id, int(2));
    assert_eq!(session.store().len(), 4);
    assert_eq!(session.store().get_item(&id).unwrap().parent, Some(int(i64::MAX)));
}
