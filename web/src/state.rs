//! Application state for Axum handlers.

use slug_registry::RedirectResolver;
use std::sync::Arc;

/// State shared across all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Slug lookup used by the redirect route
    pub resolver: Arc<RedirectResolver>,
}

impl AppState {
    /// Create state around a resolver
    #[must_use]
    pub const fn new(resolver: Arc<RedirectResolver>) -> Self {
        Self { resolver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone_and_send() {
        fn assert_state<T: Clone + Send + Sync + 'static>() {}
        assert_state::<AppState>();
    }
}
