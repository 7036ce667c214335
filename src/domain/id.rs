use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique identifier such as `post-42`.
///
/// Ids are not derived from content: parsing the same document twice yields
/// different ids, so records must be compared by content, never by id.
pub fn unique_id(prefix: &str) -> String {
    let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", prefix, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = unique_id("post");
        let b = unique_id("post");
        assert_ne!(a, b);
        assert!(a.starts_with("post-"));
    }

    #[test]
    fn test_prefix_is_kept() {
        assert!(unique_id("feed").starts_with("feed-"));
    }
}
