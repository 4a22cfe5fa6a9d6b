//! Resource-id-aware equality for GCE resource URLs.
//!
//! The API reports networks and subnetworks in several spellings: a full
//! URL (`https://www.googleapis.com/compute/v1/projects/p/global/networks/net`),
//! a partial path (`projects/p/global/networks/net`) or a bare short name
//! (`net`). Configuration comparison has to treat these as the same
//! resource.

/// Final path segment of a resource reference (the resource name).
fn resource_name(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

/// Collection segment preceding the name (e.g. `networks`), when present.
fn resource_type(id: &str) -> Option<&str> {
    let mut segments = id.trim_end_matches('/').rsplit('/');
    segments.next()?;
    segments.next()
}

/// Compares two resource references, tolerating short-name vs full-URL
/// forms. Names must match; collection types must match when both sides
/// carry one.
pub fn equal_resource_ids(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return a == b;
    }
    if resource_name(a) != resource_name(b) {
        return false;
    }
    match (resource_type(a), resource_type(b)) {
        (Some(ta), Some(tb)) => ta == tb,
        _ => true,
    }
}
