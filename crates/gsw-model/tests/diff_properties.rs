use gsw_model::{diff, ChangeEvent, Cluster, Observation, Snapshot, WorkerGroup};
use proptest::collection::btree_map;
use proptest::prelude::*;

fn group_strategy() -> impl Strategy<Value = (i32, i32, &'static str, &'static str, &'static str)> {
    (
        0..3i32,
        3..5i32,
        prop_oneof![Just("gardenlinux"), Just("ubuntu")],
        prop_oneof![Just("1.0"), Just("2.0")],
        prop_oneof![Just(""), Just("1.30")],
    )
}

fn cluster_strategy() -> impl Strategy<Value = (String, Vec<(String, WorkerGroup)>)> {
    (
        prop_oneof![Just("1.29".to_string()), Just("1.30".to_string())],
        btree_map(
            prop_oneof![Just("g1"), Just("g2"), Just("g3")],
            group_strategy(),
            0..3,
        ),
    )
        .prop_map(|(version, groups)| {
            let groups = groups
                .into_iter()
                .map(|(name, (min, max, image, image_version, group_version))| {
                    (
                        name.to_string(),
                        WorkerGroup::new(name, min, max)
                            .with_image(image, image_version)
                            .with_version(group_version),
                    )
                })
                .collect();
            (version, groups)
        })
}

fn clusters_strategy() -> impl Strategy<Value = Vec<Cluster>> {
    btree_map(
        prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")],
        cluster_strategy(),
        0..4,
    )
    .prop_map(|clusters| {
        clusters
            .into_iter()
            .map(|(name, (version, groups))| {
                groups
                    .into_iter()
                    .fold(Cluster::new(name, version), |c, (_, g)| c.with_group(g))
            })
            .collect()
    })
}

fn count(events: &[ChangeEvent], kind: &str) -> usize {
    events.iter().filter(|e| e.kind() == kind).count()
}

proptest! {
    #[test]
    fn prop_diff_is_deterministic(previous in clusters_strategy(), current in clusters_strategy()) {
        let snapshot = Snapshot::from_clusters(previous);
        let observation: Observation = current.into_iter().collect();

        let first = diff(&snapshot, &observation);
        let second = diff(&snapshot, &observation);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_diff_against_self_is_empty(clusters in clusters_strategy()) {
        let snapshot = Snapshot::from_clusters(clusters.clone());
        let observation: Observation = clusters.into_iter().collect();

        prop_assert!(diff(&snapshot, &observation).is_empty());
    }

    #[test]
    fn prop_next_snapshot_is_observation(previous in clusters_strategy(), current in clusters_strategy()) {
        let observation: Observation = current.into_iter().collect();
        let result = diff(&Snapshot::from_clusters(previous), &observation);

        prop_assert_eq!(result.next, observation.to_snapshot());
    }

    #[test]
    fn prop_events_match_field_differences(previous in clusters_strategy(), current in clusters_strategy()) {
        let snapshot = Snapshot::from_clusters(previous);
        let observation: Observation = current.into_iter().collect();
        let events = diff(&snapshot, &observation).events;

        let mut expected = [0usize; 8];
        for name in observation.names() {
            let Some(old) = snapshot.get(name) else {
                expected[0] += 1;
                continue;
            };
            let new = observation.get(name).unwrap();
            expected[2] += usize::from(old.control_plane_version != new.control_plane_version);
            for (group, after) in &new.worker_groups {
                match old.group(group) {
                    None => expected[3] += 1,
                    Some(before) => {
                        expected[5] += usize::from(before.size() != after.size());
                        expected[6] += usize::from(before.image() != after.image());
                        expected[7] += usize::from(before.control_plane_version != after.control_plane_version);
                    }
                }
            }
            expected[4] += old.worker_groups.keys().filter(|g| new.group(g).is_none()).count();
        }
        expected[1] = snapshot.names().filter(|n| observation.get(n).is_none()).count();

        let kinds = [
            "cluster_added",
            "cluster_removed",
            "cluster_version_changed",
            "worker_group_added",
            "worker_group_removed",
            "worker_group_size_changed",
            "worker_group_image_changed",
            "worker_group_version_changed",
        ];
        for (kind, want) in kinds.iter().zip(expected) {
            prop_assert_eq!(count(&events, kind), want, "kind {}", kind);
        }
    }

    #[test]
    fn prop_removals_come_last(previous in clusters_strategy(), current in clusters_strategy()) {
        let snapshot = Snapshot::from_clusters(previous);
        let observation: Observation = current.into_iter().collect();
        let events = diff(&snapshot, &observation).events;

        let first_removal = events
            .iter()
            .position(|e| matches!(e, ChangeEvent::ClusterRemoved { .. }))
            .unwrap_or(events.len());
        prop_assert!(events[first_removal..]
            .iter()
            .all(|e| matches!(e, ChangeEvent::ClusterRemoved { .. })),
            "removals must come after all other events");
    }

    #[test]
    fn prop_added_and_removed_clusters_have_no_group_events(
        previous in clusters_strategy(),
        current in clusters_strategy(),
    ) {
        let snapshot = Snapshot::from_clusters(previous);
        let observation: Observation = current.into_iter().collect();

        for event in diff(&snapshot, &observation).events {
            let cluster = event.cluster().to_string();
            let added = snapshot.get(&cluster).is_none();
            let removed = observation.get(&cluster).is_none();
            if added {
                prop_assert!(matches!(event, ChangeEvent::ClusterAdded { .. }), "expected ClusterAdded, got {:?}", event);
            }
            if removed {
                prop_assert!(matches!(event, ChangeEvent::ClusterRemoved { .. }), "expected ClusterRemoved, got {:?}", event);
            }
        }
    }
}

#[test]
fn removed_clusters_are_reported_last() {
    let snapshot = Snapshot::from_clusters([
        Cluster::new("a", "1.29"),
        Cluster::new("c", "1.29"),
    ]);
    let observation: Observation = [Cluster::new("b", "1.30"), Cluster::new("c", "1.30")]
        .into_iter()
        .collect();

    let order: Vec<_> = diff(&snapshot, &observation)
        .events
        .iter()
        .map(|e| (e.cluster().to_string(), e.kind()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("b".to_string(), "cluster_added"),
            ("c".to_string(), "cluster_version_changed"),
            ("a".to_string(), "cluster_removed"),
        ]
    );
}
