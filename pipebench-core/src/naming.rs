//! Benchmark Naming
//!
//! Dotted hierarchical names of the form
//! `<ClassName>.<MethodName>[.<sub-benchmark>...][.run_k_of_n]`.
//!
//! Labels are expected to be alphanumeric/underscore but nothing here
//! enforces it; callers own the charset.

/// Separator between name segments
pub const SEPARATOR: char = '.';

/// Append `name` to `prefix` with a dot, or return `name` when `prefix` is empty.
pub fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{name}")
    }
}

/// Like [`qualify`], treating an absent prefix as empty.
pub fn qualify_opt(prefix: Option<&str>, name: &str) -> String {
    qualify(prefix.unwrap_or_default(), name)
}

/// Join scope labels into a single dotted segment.
pub fn join_scope<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

/// Disambiguating label for replica `k` of `n` (1-indexed).
pub fn replica_label(k: u32, n: u32) -> String {
    format!("run_{k}_of_{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_without_prefix() {
        assert_eq!(qualify("", "test"), "test");
        assert_eq!(qualify_opt(None, "test"), "test");
        assert_eq!(qualify_opt(Some(""), "test"), "test");
    }

    #[test]
    fn test_qualify_with_prefix() {
        assert_eq!(qualify("foo", "test"), "foo.test");
        assert_eq!(qualify_opt(Some("foo.bar"), "test"), "foo.bar.test");
    }

    #[test]
    fn test_join_scope() {
        assert_eq!(join_scope::<&str>(&[]), "");
        assert_eq!(join_scope(&["one", "two"]), "one.two");
    }

    #[test]
    fn test_replica_label() {
        assert_eq!(replica_label(2, 3), "run_2_of_3");
    }
}
