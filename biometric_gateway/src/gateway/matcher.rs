use std::fmt;
use std::sync::Arc;

/// Injected predicate deciding which request paths a gateway stage applies to
#[derive(Clone)]
pub struct PathMatcher {
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
    description: String,
}

impl PathMatcher {
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }

    /// Matches each prefix itself and anything below it, on segment boundaries:
    /// `/api` matches `/api` and `/api/users` but not `/apiary`.
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| normalize_prefix(p.as_ref()))
            .collect();
        let description = prefixes.join(",");

        Self::new(description, move |path| {
            prefixes.iter().any(|prefix| path_has_prefix(path, prefix))
        })
    }

    pub fn all() -> Self {
        Self::new("*", |_| true)
    }

    pub fn none() -> Self {
        Self::new("", |_| false)
    }

    pub fn matches(&self, path: &str) -> bool {
        (self.predicate)(path)
    }
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathMatcher")
            .field(&self.description)
            .finish()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim();
    if trimmed == "/" {
        return trimmed.to_string();
    }
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn path_has_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
