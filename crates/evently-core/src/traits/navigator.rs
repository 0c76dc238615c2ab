//! Navigation side effects.

/// Receives the redirect-to-login side effect when a session ends
/// underneath an API call.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// A navigator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}
