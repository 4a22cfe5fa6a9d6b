//! Zone-partitioned set difference.

use std::hash::Hash;

use neg_types::{EndpointSet, ZoneEndpointMap};

/// Determines what endpoints need to be added and removed per zone to move
/// `current` to `target`.
///
/// Generic over the element type, so the same algorithm serves both the
/// encoded string-key flavor and the typed [`neg_types::NetworkEndpoint`]
/// flavor. A zone missing on one side is treated as an empty set; zones
/// whose diff is empty are left out of the result entirely.
pub fn calculate_difference<T: Eq + Hash + Clone>(
    target: &ZoneEndpointMap<T>,
    current: &ZoneEndpointMap<T>,
) -> (ZoneEndpointMap<T>, ZoneEndpointMap<T>) {
    let empty = EndpointSet::new();
    let mut add_set = ZoneEndpointMap::new();
    let mut remove_set = ZoneEndpointMap::new();

    for (zone, endpoints) in target {
        let diff = endpoints.difference(current.get(zone).unwrap_or(&empty));
        if !diff.is_empty() {
            add_set.insert(zone.clone(), diff);
        }
    }

    for (zone, endpoints) in current {
        let diff = endpoints.difference(target.get(zone).unwrap_or(&empty));
        if !diff.is_empty() {
            remove_set.insert(zone.clone(), diff);
        }
    }

    (add_set, remove_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neg_types::NetworkEndpoint;

    fn zone_map(entries: &[(&str, &[&str])]) -> ZoneEndpointMap<String> {
        entries
            .iter()
            .map(|(zone, items)| {
                (
                    (*zone).to_string(),
                    items.iter().map(|s| (*s).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_add_and_remove_across_zones() {
        // desired: {a: {e1, e3}}; actual: {a: {e1}, b: {e2}}
        let target = zone_map(&[("a", &["e1", "e3"])]);
        let current = zone_map(&[("a", &["e1"]), ("b", &["e2"])]);

        let (add, remove) = calculate_difference(&target, &current);

        assert_eq!(add, zone_map(&[("a", &["e3"])]));
        assert_eq!(remove, zone_map(&[("b", &["e2"])]));
    }

    #[test]
    fn test_in_sync_produces_empty_results() {
        let target = zone_map(&[("a", &["e1"]), ("b", &["e2"])]);
        let (add, remove) = calculate_difference(&target, &target.clone());
        assert!(add.is_empty());
        assert!(remove.is_empty());
    }

    #[test]
    fn test_add_and_remove_are_disjoint_and_reconstruct_target() {
        let target = zone_map(&[("a", &["e1", "e2"]), ("b", &["e4"]), ("c", &["e5"])]);
        let current = zone_map(&[("a", &["e2", "e3"]), ("b", &["e4"]), ("d", &["e6"])]);
        let (add, remove) = calculate_difference(&target, &current);

        let empty = EndpointSet::new();
        for zone in ["a", "b", "c", "d"] {
            let added = add.get(zone).unwrap_or(&empty);
            let removed = remove.get(zone).unwrap_or(&empty);
            for item in added.iter() {
                assert!(!removed.contains(item), "add/remove overlap in {zone}");
            }

            // target[zone] == (current[zone] + add[zone]) - remove[zone]
            let mut reconstructed = current.get(zone).unwrap_or(&empty).clone();
            reconstructed.extend(added.iter().cloned());
            let reconstructed = reconstructed.difference(removed);
            assert_eq!(&reconstructed, target.get(zone).unwrap_or(&empty), "zone {zone}");
        }
    }

    #[test]
    fn test_typed_endpoint_flavor() {
        let endpoint = |ip: &str| NetworkEndpoint {
            ip: ip.to_string(),
            port: "80".to_string(),
            node: "n1".to_string(),
        };
        let mut target = ZoneEndpointMap::new();
        target.insert(
            "zone-a".to_string(),
            [endpoint("10.0.0.1"), endpoint("10.0.0.2")].into_iter().collect(),
        );
        let mut current = ZoneEndpointMap::new();
        current.insert("zone-a".to_string(), [endpoint("10.0.0.2")].into_iter().collect());

        let (add, remove) = calculate_difference(&target, &current);
        assert!(add["zone-a"].contains(&endpoint("10.0.0.1")));
        assert_eq!(add["zone-a"].len(), 1);
        assert!(remove.is_empty());
    }
}
