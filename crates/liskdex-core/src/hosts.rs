//! Ordered primary/fallback host bookkeeping with sticky promotion.

/// Tracks which host a client currently prefers.
///
/// The preferred host starts as the configured primary. When a fallback
/// serves a request after the preferred host failed, the fallback is
/// promoted: it becomes the active host and the previously preferred host
/// moves to the tail of the fallback list, where it is retried last.
///
/// Hosts are compared by exact string equality — callers must supply
/// canonical host strings (no trailing-slash or scheme normalization is
/// performed here).
#[derive(Debug, Clone)]
pub struct HostSet {
    primary: String,
    fallbacks: Vec<String>,
    active: Option<String>,
}

impl HostSet {
    /// Build a host set from the configured primary and ordered fallbacks.
    pub fn new(primary: impl Into<String>, fallbacks: Vec<String>) -> Self {
        Self {
            primary: primary.into(),
            fallbacks,
            active: None,
        }
    }

    /// The host to try first: the active host if one was promoted, else
    /// the configured primary.
    pub fn preferred(&self) -> &str {
        self.active.as_deref().unwrap_or(&self.primary)
    }

    /// Fallback hosts in try-order.
    pub fn fallbacks(&self) -> &[String] {
        &self.fallbacks
    }

    /// Returns `true` if at least one fallback is configured.
    pub fn has_fallbacks(&self) -> bool {
        !self.fallbacks.is_empty()
    }

    /// Make `host` the active host.
    ///
    /// No-op when `host` is already preferred. Otherwise every fallback
    /// entry equal to `host` is dropped and the previously preferred host
    /// is appended to the tail, so the active host never appears among
    /// the fallbacks.
    pub fn promote(&mut self, host: &str) {
        if host == self.preferred() {
            return;
        }
        let previous = self.preferred().to_string();
        self.fallbacks.retain(|f| f != host);
        self.fallbacks.push(previous);
        self.active = Some(host.to_string());
        tracing::info!(host, "promoted fallback to active host");
    }
}
