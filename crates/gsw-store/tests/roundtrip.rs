use gsw_model::{diff, migration, Cluster, CycleMode, Snapshot, WorkerGroup, CURRENT_SCHEMA_VERSION};
use gsw_store::{load, save, try_load, SnapshotStore};
use gsw_test_utils::{create_cluster_with_groups, observation_of, temp_snapshot_path};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn arb_group() -> impl Strategy<Value = WorkerGroup> {
    (
        "[a-z]{1,6}",
        0..10i32,
        0..20i32,
        "[a-z]{0,8}",
        "[0-9.]{0,6}",
        prop_oneof![Just(String::new()), "1\\.[0-9]{2}"],
    )
        .prop_map(|(name, min, max, image, version, cp)| {
            WorkerGroup::new(name, min, max)
                .with_image(image, version)
                .with_version(cp)
        })
}

fn arb_cluster() -> impl Strategy<Value = Cluster> {
    (
        "[a-z]{1,4}/[a-z]{1,6}",
        "1\\.[0-9]{2}\\.[0-9]",
        prop::collection::vec(arb_group(), 0..4),
        "[a-z-]{0,6}",
        prop_oneof![Just(String::new()), Just("Succeeded".to_string()), Just("Error".to_string())],
    )
        .prop_map(|(name, version, groups, seed, state)| {
            groups.into_iter().fold(
                Cluster::new(name, version).with_seed(seed).with_state(state),
                Cluster::with_group,
            )
        })
}

proptest! {
    #[test]
    fn save_then_load_is_identity(clusters in prop::collection::vec(arb_cluster(), 0..6)) {
        let (_dir, path) = temp_snapshot_path();
        let snapshot = Snapshot::from_clusters(clusters);

        save(&path, &snapshot).unwrap();
        prop_assert_eq!(try_load(&path).unwrap(), Some(snapshot));
    }
}

#[test]
fn legacy_flat_file_triggers_single_migration() {
    let (_dir, path) = temp_snapshot_path();
    std::fs::write(
        &path,
        r#"{"garden-dev/alpha": {"name": "garden-dev/alpha", "minimum": 2, "maximum": 5,
            "imagename": "gardenlinux", "imageversion": "934.7.0", "apiversion": "1.24.8"}}"#,
    )
    .unwrap();

    let store = SnapshotStore::new(&path);
    let previous = store.load();
    assert_eq!(
        migration::evaluate(&previous),
        CycleMode::Migration { legacy_clusters: 1 }
    );

    let observation = observation_of([create_cluster_with_groups(
        "garden-dev/alpha",
        "1.30.2",
        &[("pool-a", 2, 5)],
    )]);
    let next = diff(&previous, &observation).next;
    store.save(&next).unwrap();

    let reloaded = store.load();
    assert_eq!(reloaded.schema_version(), CURRENT_SCHEMA_VERSION);
    assert_eq!(migration::evaluate(&reloaded), CycleMode::Normal);
    assert_eq!(reloaded, next);
}

#[test]
fn versioned_file_with_groupless_cluster_loads_normal() {
    let (_dir, path) = temp_snapshot_path();
    let snapshot = Snapshot::from_clusters([Cluster::new("garden-dev/empty", "1.30.2")]);
    save(&path, &snapshot).unwrap();

    assert_eq!(migration::evaluate(&load(&path)), CycleMode::Normal);
}

#[cfg(unix)]
#[test]
fn snapshot_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = temp_snapshot_path();
    save(&path, &Snapshot::empty()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
