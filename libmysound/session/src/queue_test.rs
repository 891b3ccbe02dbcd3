use pretty_assertions::assert_eq;
use rstest::*;

use super::*;

fn items(ids: &[&str]) -> Vec<QueueItem> {
    ids.iter()
        .map(|id| QueueItem::new(*id, *id, "", None, format!("http://host/api/stream/{id}")))
        .collect()
}

#[rstest(
    len,
    index,
    expected,
    case(1, 0, true),
    case(2, 0, true),
    case(2, 1, true),
    case(3, 0, false),
    case(3, 1, true),
    case(10, 7, false),
    case(10, 8, true),
    case(10, 9, true)
)]
fn test_in_tail_window(len: usize, index: usize, expected: bool) {
    let ids: Vec<String> = (0..len).map(|i| i.to_string()).collect();
    let mut queue = PlaybackQueue::default();
    queue.replace(
        items(&ids.iter().map(|s| s.as_str()).collect::<Vec<_>>()),
        0,
        None,
    );

    assert_eq!(expected, queue.in_tail_window(index, 2));
}

#[rstest(
    start_index,
    expected,
    case(0, Some(0)),
    case(2, Some(2)),
    case(3, Some(2)),
    case(100, Some(2))
)]
fn test_replace_clamps_start(start_index: usize, expected: Option<usize>) {
    let mut queue = PlaybackQueue::default();
    assert_eq!(
        expected,
        queue.replace(items(&["a", "b", "c"]), start_index, Some("7".to_owned()))
    );
    assert_eq!(Some("7"), queue.active_collection_id());
}

#[test]
fn test_replace_with_empty() {
    let mut queue = PlaybackQueue::default();
    queue.replace(items(&["a"]), 0, None);

    assert_eq!(None, queue.replace(vec![], 0, None));
    assert_eq!(None, queue.current());
    assert!(!queue.has_next());
}

#[test]
fn test_sync_timeline_replaces_mirror() {
    let mut queue = PlaybackQueue::default();
    queue.replace(items(&["a", "b"]), 1, Some("7".to_owned()));

    queue.sync_timeline(items(&["x", "y", "z"]), Some(2));

    assert_eq!(vec!["x", "y", "z"], queue.ids());
    assert_eq!(Some("z"), queue.current().map(|i| i.id()));
    assert_eq!(Some("7"), queue.active_collection_id());

    queue.sync_timeline(items(&["x"]), Some(5));
    assert_eq!(Some(0), queue.current_index());
}

#[test]
fn test_append_keeps_order() {
    let mut queue = PlaybackQueue::default();
    queue.replace(items(&["a", "b"]), 1, None);
    assert!(!queue.has_next());

    queue.append(items(&["c", "d"]));

    assert_eq!(vec!["a", "b", "c", "d"], queue.ids());
    assert_eq!(Some(1), queue.current_index());
    assert!(queue.has_next());
}
