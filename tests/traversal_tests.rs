//! Integration tests for traversal across linked blocks.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use linkquill::document::node::{Link, Node};
use linkquill::document::path::Path;
use linkquill::selector::{Selector, SelectorSpecBuilder};
use linkquill::store::MemoryStore;
use linkquill::traversal::{traverse, Progress, TraversalConfig, TraversalError};

/// The linked blocks used across these tests.
struct Fixtures {
    store: MemoryStore,
    leaf_alpha_lnk: Link,
    leaf_beta_lnk: Link,
    middle_map: Node,
    middle_map_lnk: Link,
    middle_list: Node,
    middle_list_lnk: Link,
    root: Node,
}

fn map(entries: Vec<(&str, Node)>) -> Node {
    Node::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<IndexMap<_, _>>(),
    )
}

fn fixtures() -> Fixtures {
    let store = MemoryStore::new();
    let leaf_alpha_lnk = store.put_node(&Node::from("alpha")).unwrap();
    let leaf_beta_lnk = store.put_node(&Node::from("beta")).unwrap();
    let middle_map = map(vec![
        ("foo", Node::Bool(true)),
        ("bar", Node::Bool(false)),
        (
            "nested",
            map(vec![
                ("alink", Node::Link(leaf_alpha_lnk.clone())),
                ("nonlink", Node::from("zoo")),
            ]),
        ),
    ]);
    let middle_map_lnk = store.put_node(&middle_map).unwrap();
    let middle_list = Node::List(vec![
        Node::Link(leaf_alpha_lnk.clone()),
        Node::Link(leaf_alpha_lnk.clone()),
        Node::Link(leaf_beta_lnk.clone()),
        Node::Link(leaf_alpha_lnk.clone()),
    ]);
    let middle_list_lnk = store.put_node(&middle_list).unwrap();
    let root = map(vec![
        ("plain", Node::from("olde string")),
        ("linkedString", Node::Link(leaf_alpha_lnk.clone())),
        ("linkedMap", Node::Link(middle_map_lnk.clone())),
        ("linkedList", Node::Link(middle_list_lnk.clone())),
    ]);
    Fixtures {
        store,
        leaf_alpha_lnk,
        leaf_beta_lnk,
        middle_map,
        middle_map_lnk,
        middle_list,
        middle_list_lnk,
        root,
    }
}

fn visits_as_strings(visits: &[(Path, Node)]) -> Vec<(String, Node)> {
    visits
        .iter()
        .map(|(path, node)| (path.to_string(), node.clone()))
        .collect()
}

/// A loader over `store` that counts every load.
fn counting_config(store: &MemoryStore, loads: &Arc<AtomicUsize>) -> TraversalConfig {
    let store = store.clone();
    let loads = Arc::clone(loads);
    TraversalConfig::new().with_loader_fn(move |link, _ctx| {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(store.get(link)?)))
    })
}

fn recursive_everything(depth: usize) -> Selector {
    let ssb = SelectorSpecBuilder;
    ssb.explore_recursive(
        depth,
        ssb.explore_union([ssb.matcher(), ssb.explore_all(ssb.explore_recursive_edge())]),
    )
    .selector()
    .unwrap()
}

#[test]
fn test_matcher_visits_only_the_root() {
    let f = fixtures();
    let mut visits = Vec::new();
    traverse(&f.middle_map, &Selector::Matcher, |progress, node| {
        visits.push((progress.path.to_string(), node.clone()));
        Ok::<(), TraversalError>(())
    })
    .unwrap();
    assert_eq!(visits, vec![(String::new(), f.middle_map.clone())]);
}

#[test]
fn test_matcher_on_scalar() {
    let config = TraversalConfig::default();
    let visits = Progress::new(&config)
        .collect(&Node::from("x"), &Selector::Matcher)
        .unwrap();
    assert_eq!(visits, vec![(Path::root(), Node::from("x"))]);
}

#[test]
fn test_fields_visit_in_declared_order() {
    let f = fixtures();
    let ssb = SelectorSpecBuilder;
    let selector = ssb
        .explore_fields(|fields| {
            fields.insert("bar", ssb.matcher());
            fields.insert("foo", ssb.matcher());
        })
        .selector()
        .unwrap();
    let config = TraversalConfig::default();
    let visits = Progress::new(&config).collect(&f.middle_map, &selector).unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![
            ("bar".to_string(), Node::Bool(false)),
            ("foo".to_string(), Node::Bool(true)),
        ]
    );
}

#[test]
fn test_nested_fields() {
    let f = fixtures();
    let ssb = SelectorSpecBuilder;
    let selector = ssb
        .explore_fields(|fields| {
            fields.insert("foo", ssb.matcher());
            fields.insert(
                "nested",
                ssb.explore_fields(|fields| {
                    fields.insert("nonlink", ssb.matcher());
                }),
            );
        })
        .selector()
        .unwrap();
    let config = TraversalConfig::default();
    let visits = Progress::new(&config).collect(&f.middle_map, &selector).unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![
            ("foo".to_string(), Node::Bool(true)),
            ("nested/nonlink".to_string(), Node::from("zoo")),
        ]
    );
}

#[test]
fn test_recursive_union_crosses_links() {
    let f = fixtures();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let visits = Progress::new(&config)
        .collect(&f.middle_map, &recursive_everything(3))
        .unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![
            (String::new(), f.middle_map.clone()),
            ("foo".to_string(), Node::Bool(true)),
            ("bar".to_string(), Node::Bool(false)),
            (
                "nested".to_string(),
                map(vec![
                    ("alink", Node::Link(f.leaf_alpha_lnk.clone())),
                    ("nonlink", Node::from("zoo")),
                ])
            ),
            ("nested/alink".to_string(), Node::from("alpha")),
            ("nested/nonlink".to_string(), Node::from("zoo")),
        ]
    );
}

#[test]
fn test_range_over_linked_list() {
    let f = fixtures();
    let ssb = SelectorSpecBuilder;
    let selector = ssb.explore_range(0, 3, ssb.matcher()).selector().unwrap();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let visits = Progress::new(&config).collect(&f.middle_list, &selector).unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![
            ("0".to_string(), Node::from("alpha")),
            ("1".to_string(), Node::from("alpha")),
            ("2".to_string(), Node::from("beta")),
        ]
    );
}

#[test]
fn test_range_past_end_prunes_silently() {
    let f = fixtures();
    let ssb = SelectorSpecBuilder;
    let selector = ssb.explore_range(2, 10, ssb.matcher()).selector().unwrap();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let visits = Progress::new(&config).collect(&f.middle_list, &selector).unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![
            ("2".to_string(), Node::from("beta")),
            ("3".to_string(), Node::from("alpha")),
        ]
    );
}

fn multi_layer_selector() -> Selector {
    let ssb = SelectorSpecBuilder;
    ssb.explore_fields(|fields| {
        fields.insert("linkedList", ssb.explore_all(ssb.matcher()));
        fields.insert(
            "linkedMap",
            ssb.explore_recursive(
                3,
                ssb.explore_fields(|fields| {
                    fields.insert("foo", ssb.matcher());
                    fields.insert("nonlink", ssb.matcher());
                    fields.insert("alink", ssb.matcher());
                    fields.insert("nested", ssb.explore_recursive_edge());
                }),
            ),
        );
    })
    .selector()
    .unwrap()
}

#[test]
fn test_multiple_layers_of_links() {
    let f = fixtures();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let visits = Progress::new(&config)
        .collect(&f.root, &multi_layer_selector())
        .unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![
            ("linkedList/0".to_string(), Node::from("alpha")),
            ("linkedList/1".to_string(), Node::from("alpha")),
            ("linkedList/2".to_string(), Node::from("beta")),
            ("linkedList/3".to_string(), Node::from("alpha")),
            ("linkedMap/foo".to_string(), Node::Bool(true)),
            ("linkedMap/nested/nonlink".to_string(), Node::from("zoo")),
            ("linkedMap/nested/alink".to_string(), Node::from("alpha")),
        ]
    );
}

#[test]
fn test_link_cache_loads_each_block_once() {
    let f = fixtures();
    let loads = Arc::new(AtomicUsize::new(0));
    let config = counting_config(&f.store, &loads);
    Progress::new(&config)
        .collect(&f.root, &multi_layer_selector())
        .unwrap();
    // middleList, middleMap, leafAlpha and leafBeta.
    assert_eq!(loads.load(Ordering::SeqCst), 4);
}

#[test]
fn test_without_cache_every_reached_link_loads() {
    let f = fixtures();
    let loads = Arc::new(AtomicUsize::new(0));
    let config = counting_config(&f.store, &loads).with_cache_links(false);
    let visits = Progress::new(&config)
        .collect(&f.root, &multi_layer_selector())
        .unwrap();
    assert_eq!(visits.len(), 7);
    // Two middle blocks, four list entries and one nested alink.
    assert_eq!(loads.load(Ordering::SeqCst), 7);
}

#[test]
fn test_unselected_links_are_never_loaded() {
    let f = fixtures();
    let loads = Arc::new(AtomicUsize::new(0));
    let config = counting_config(&f.store, &loads);
    let ssb = SelectorSpecBuilder;
    let selector = ssb
        .explore_fields(|fields| {
            fields.insert("plain", ssb.matcher());
        })
        .selector()
        .unwrap();
    let visits = Progress::new(&config).collect(&f.root, &selector).unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![("plain".to_string(), Node::from("olde string"))]
    );
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[test]
fn test_last_block_tracks_most_recent_link() {
    let f = fixtures();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let mut seen = Vec::new();
    Progress::new(&config)
        .traverse(&f.root, &multi_layer_selector(), |progress, _node| {
            let last = progress.last_block.clone().map(|b| (b.path.to_string(), b.link));
            seen.push((progress.path.to_string(), last));
            Ok::<(), TraversalError>(())
        })
        .unwrap();

    assert_eq!(
        seen[0],
        (
            "linkedList/0".to_string(),
            Some(("linkedList/0".to_string(), f.leaf_alpha_lnk.clone()))
        )
    );
    assert_eq!(
        seen[2],
        (
            "linkedList/2".to_string(),
            Some(("linkedList/2".to_string(), f.leaf_beta_lnk.clone()))
        )
    );
    assert_eq!(
        seen[4],
        (
            "linkedMap/foo".to_string(),
            Some(("linkedMap".to_string(), f.middle_map_lnk.clone()))
        )
    );
    assert_eq!(
        seen[5],
        (
            "linkedMap/nested/nonlink".to_string(),
            Some(("linkedMap".to_string(), f.middle_map_lnk.clone()))
        )
    );
}

#[test]
fn test_loader_sees_path_of_link() {
    let f = fixtures();
    let paths = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorded = Arc::clone(&paths);
    let store = f.store.clone();
    let config = TraversalConfig::new().with_loader_fn(move |link, ctx| {
        recorded
            .lock()
            .unwrap()
            .push((ctx.path.to_string(), ctx.last_block.map(|b| b.link.clone())));
        Ok(Box::new(Cursor::new(store.get(link)?)))
    });
    let ssb = SelectorSpecBuilder;
    let selector = ssb
        .explore_fields(|fields| {
            fields.insert("linkedList", ssb.explore_index(2, ssb.matcher()));
        })
        .selector()
        .unwrap();
    let visits = Progress::new(&config).collect(&f.root, &selector).unwrap();
    assert_eq!(
        visits_as_strings(&visits),
        vec![("linkedList/2".to_string(), Node::from("beta"))]
    );
    assert_eq!(
        *paths.lock().unwrap(),
        vec![
            ("linkedList".to_string(), None),
            ("linkedList/2".to_string(), Some(f.middle_list_lnk.clone())),
        ]
    );
}

#[test]
fn test_loader_error_stops_traversal() {
    let f = fixtures();
    let config = TraversalConfig::new()
        .with_loader_fn(|_link, _ctx| Err("storage offline".into()));
    let err = Progress::new(&config)
        .collect(&f.root, &multi_layer_selector())
        .unwrap_err();
    match err {
        TraversalError::Load { link, path, source } => {
            assert_eq!(link, f.middle_list_lnk);
            assert_eq!(path.to_string(), "linkedList");
            assert_eq!(source.to_string(), "storage offline");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_undecodable_block_is_reported() {
    let f = fixtures();
    let garbage = f.store.put(b"{not json".to_vec());
    let root = map(vec![("broken", Node::Link(garbage.clone()))]);
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let err = Progress::new(&config)
        .collect(&root, &recursive_everything(1))
        .unwrap_err();
    assert!(matches!(err, TraversalError::Decode { ref link, .. } if *link == garbage));
}

#[test]
fn test_visitor_error_stops_traversal() {
    #[derive(Debug)]
    enum VisitError {
        Enough,
        Traversal(TraversalError),
    }

    impl From<TraversalError> for VisitError {
        fn from(err: TraversalError) -> Self {
            VisitError::Traversal(err)
        }
    }

    let f = fixtures();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let mut count = 0;
    let result = Progress::new(&config).traverse(
        &f.root,
        &multi_layer_selector(),
        |_progress, _node| {
            count += 1;
            if count == 2 {
                Err(VisitError::Enough)
            } else {
                Ok(())
            }
        },
    );
    assert!(matches!(result, Err(VisitError::Enough)));
    assert_eq!(count, 2);
}

#[test]
fn test_repeated_traversal_is_deterministic() {
    let f = fixtures();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let selector = recursive_everything(5);
    let first = Progress::new(&config).collect(&f.root, &selector).unwrap();
    let second = Progress::new(&config).collect(&f.root, &selector).unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_depth_limits_unrolling() {
    // Every level is {"child": <next level>}, five levels deep.
    let mut node = Node::from("bottom");
    for _ in 0..5 {
        node = map(vec![("child", node)]);
    }
    let config = TraversalConfig::default();

    let depths = |depth: usize| -> Vec<String> {
        Progress::new(&config)
            .collect(&node, &recursive_everything(depth))
            .unwrap()
            .into_iter()
            .map(|(path, _)| path.to_string())
            .collect()
    };

    assert_eq!(depths(0), vec!["".to_string()]);
    assert_eq!(
        depths(2),
        vec![
            "".to_string(),
            "child".to_string(),
            "child/child".to_string(),
        ]
    );
    assert_eq!(depths(10).len(), 6);
}

#[test]
fn test_edge_without_recursion_prunes() {
    let f = fixtures();
    let ssb = SelectorSpecBuilder;
    let selector = ssb
        .explore_all(ssb.explore_recursive_edge())
        .selector()
        .unwrap();
    let config = TraversalConfig::default();
    let visits = Progress::new(&config).collect(&f.middle_map, &selector).unwrap();
    assert!(visits.is_empty());
}

#[test]
fn test_focus_follows_links() {
    let f = fixtures();
    let config = TraversalConfig::new().with_loader(f.store.clone());
    let progress = Progress::new(&config);
    assert_eq!(
        progress
            .focus(&f.root, &Path::parse("linkedMap/nested/alink"))
            .unwrap(),
        Node::from("alpha")
    );
    assert_eq!(
        progress.focus(&f.root, &Path::parse("linkedList/2")).unwrap(),
        Node::from("beta")
    );
    assert!(matches!(
        progress.focus(&f.root, &Path::parse("linkedMap/missing")),
        Err(TraversalError::PathNotFound { .. })
    ));
}
