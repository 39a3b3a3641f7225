#![forbid(unsafe_code)]

use ct_core::ContentStatus;
use ct_storage::{CreateContentRequest, MaterializeOptions, RootRef, SqliteStore, StoreConfig};
use rusqlite::{Connection, params};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const WRITERS: usize = 4;
const REPLIES_PER_WRITER: usize = 25;

fn config_for(dir: &std::path::Path) -> StoreConfig {
    StoreConfig {
        busy_timeout_ms: 30_000,
        ..StoreConfig::for_dir(dir)
    }
}

#[test]
fn concurrent_replies_under_one_ancestor_are_all_counted() {
    let dir = tempfile::tempdir().unwrap();
    let (root_id, shared_id) = {
        let mut store = SqliteStore::open_with_config(config_for(dir.path())).unwrap();
        let root = store
            .create(CreateContentRequest::post("host", "Busy thread", "root"))
            .unwrap();
        let shared = store
            .create(CreateContentRequest::reply("host", root.id.as_str(), "shared"))
            .unwrap();
        (root.id.into_string(), shared.id.into_string())
    };

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let config = config_for(dir.path());
            let parent = shared_id.clone();
            thread::spawn(move || {
                let mut store = SqliteStore::open_with_config(config).unwrap();
                for i in 0..REPLIES_PER_WRITER {
                    store
                        .create(CreateContentRequest::reply(
                            format!("writer-{writer}"),
                            parent.as_str(),
                            format!("reply {i}"),
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = SqliteStore::open_with_config(config_for(dir.path())).unwrap();
    let total = (WRITERS * REPLIES_PER_WRITER) as u64;
    assert_eq!(store.get(&shared_id).unwrap().children_deep_count, total);
    assert_eq!(store.get(&root_id).unwrap().children_deep_count, total + 1);
    assert!(store.verify_deep_counts(&root_id).unwrap().is_empty());
}

#[test]
fn concurrent_deletes_and_replies_keep_counts_exact() {
    let dir = tempfile::tempdir().unwrap();
    let (root_id, branches) = {
        let mut store = SqliteStore::open_with_config(config_for(dir.path())).unwrap();
        let root = store
            .create(CreateContentRequest::post("host", "Mixed traffic", "root"))
            .unwrap();
        let mut branches = Vec::new();
        for b in 0..WRITERS {
            let branch = store
                .create(CreateContentRequest::reply(
                    "host",
                    root.id.as_str(),
                    format!("branch {b}"),
                ))
                .unwrap();
            branches.push(branch.id.into_string());
        }
        (root.id.into_string(), branches)
    };

    // Each writer grows its own branch and deletes every other reply it made.
    let handles: Vec<_> = branches
        .iter()
        .cloned()
        .map(|branch| {
            let config = config_for(dir.path());
            thread::spawn(move || {
                let mut store = SqliteStore::open_with_config(config).unwrap();
                for i in 0..REPLIES_PER_WRITER {
                    let reply = store
                        .create(CreateContentRequest::reply(
                            "guest",
                            branch.as_str(),
                            format!("r{i}"),
                        ))
                        .unwrap();
                    if i % 2 == 0 {
                        store
                            .update_status(reply.id.as_str(), ContentStatus::Deleted)
                            .unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = SqliteStore::open_with_config(config_for(dir.path())).unwrap();
    let kept_per_branch = (REPLIES_PER_WRITER / 2) as u64;
    for branch in &branches {
        assert_eq!(store.get(branch).unwrap().children_deep_count, kept_per_branch);
    }
    assert_eq!(
        store.get(&root_id).unwrap().children_deep_count,
        WRITERS as u64 * (kept_per_branch + 1)
    );
    assert!(store.verify_deep_counts(&root_id).unwrap().is_empty());

    let rendered = store
        .materialize(&RootRef::Id(root_id.clone()), &MaterializeOptions::default())
        .unwrap();
    assert_eq!(rendered.placeholder_count, 0);
    assert_eq!(
        rendered.visible_count as u64,
        1 + WRITERS as u64 * (kept_per_branch + 1)
    );
}

fn counts_on(conn: &Connection, ids: &[String]) -> Vec<i64> {
    ids.iter()
        .map(|id| {
            conn.query_row(
                "SELECT children_deep_count FROM contents WHERE id=?1",
                params![id],
                |row| row.get(0),
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn open_reader_keeps_its_snapshot_of_ancestor_counts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let mut writer = SqliteStore::open_with_config(config.clone()).unwrap();
    let root = writer
        .create(CreateContentRequest::post("host", "Snapshot", "root"))
        .unwrap();
    let mut ids = vec![root.id.as_str().to_string()];
    for depth in 0..5 {
        let parent = ids.last().unwrap().clone();
        let node = writer
            .create(CreateContentRequest::reply("guest", parent, format!("d{depth}")))
            .unwrap();
        ids.push(node.id.into_string());
    }

    let reader = Connection::open(config.db_path()).unwrap();
    reader.busy_timeout(config.busy_timeout()).unwrap();
    reader.execute_batch("BEGIN").unwrap();
    let before = counts_on(&reader, &ids);
    assert_eq!(before, vec![5, 4, 3, 2, 1, 0]);

    writer
        .create(CreateContentRequest::reply("guest", ids[5].as_str(), "leaf"))
        .unwrap();
    writer
        .update_status(ids[3].as_str(), ContentStatus::Deleted)
        .unwrap();
    assert!(writer.verify_deep_counts(&ids[0]).unwrap().is_empty());

    // Both writes committed; the open read transaction still sees neither.
    assert_eq!(counts_on(&reader, &ids), before);
    let status: String = reader
        .query_row(
            "SELECT status FROM contents WHERE id=?1",
            params![ids[3]],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(status, "published");
    let rows: i64 = reader
        .query_row(
            "SELECT COUNT(*) FROM contents WHERE root_id=?1",
            params![ids[0]],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 6);

    reader.execute_batch("COMMIT").unwrap();
    assert_eq!(counts_on(&reader, &ids), vec![5, 4, 3, 3, 2, 1]);
}

#[test]
fn materialize_never_observes_a_partial_counter_chain() {
    let dir = tempfile::tempdir().unwrap();
    let (root_id, branch_id) = {
        let mut store = SqliteStore::open_with_config(config_for(dir.path())).unwrap();
        let root = store
            .create(CreateContentRequest::post("host", "Racing", "root"))
            .unwrap();
        let branch = store
            .create(CreateContentRequest::reply("host", root.id.as_str(), "branch"))
            .unwrap();
        (root.id.into_string(), branch.id.into_string())
    };
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let config = config_for(dir.path());
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut store = SqliteStore::open_with_config(config).unwrap();
            for i in 0..REPLIES_PER_WRITER {
                let reply = store
                    .create(CreateContentRequest::reply(
                        "guest",
                        branch_id.as_str(),
                        format!("r{i}"),
                    ))
                    .unwrap();
                store
                    .create(CreateContentRequest::reply(
                        "guest",
                        reply.id.as_str(),
                        format!("nested {i}"),
                    ))
                    .unwrap();
                if i % 2 == 0 {
                    store
                        .update_status(reply.id.as_str(), ContentStatus::Deleted)
                        .unwrap();
                }
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let reader = {
        let config = config_for(dir.path());
        let done = Arc::clone(&done);
        let root_ref = RootRef::Id(root_id.clone());
        thread::spawn(move || {
            let store = SqliteStore::open_with_config(config).unwrap();
            let mut renders = 0;
            loop {
                let finished = done.load(Ordering::SeqCst);
                let tree = store
                    .materialize(&root_ref, &MaterializeOptions::default())
                    .unwrap();
                // Within one snapshot every published descendant is rendered,
                // so the root's stored count must match what was rendered.
                let published = tree
                    .walk()
                    .iter()
                    .skip(1)
                    .filter(|node| node.status == ContentStatus::Published)
                    .count();
                assert_eq!(published as u64, tree.root().children_deep_count);
                renders += 1;
                if finished {
                    break;
                }
            }
            renders
        })
    };

    writer.join().unwrap();
    let renders = reader.join().unwrap();
    assert!(renders >= 1);

    let store = SqliteStore::open_with_config(config_for(dir.path())).unwrap();
    let kept = (REPLIES_PER_WRITER / 2) as u64;
    assert_eq!(
        store.get(&root_id).unwrap().children_deep_count,
        1 + kept + REPLIES_PER_WRITER as u64
    );
    assert!(store.verify_deep_counts(&root_id).unwrap().is_empty());
}
