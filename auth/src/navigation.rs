/// Sink for the login-redirect side effect.
///
/// When a refresh cycle fails terminally the request client notifies the UI
/// layer through this trait instead of touching any browser global, so the
/// core stays portable and testable.
pub trait NavigationNotifier: Send + Sync {
    fn redirect_to_login(&self);
}

/// Notifier for headless use. Terminal auth failures still surface to the
/// caller as errors; there is just no surface to navigate.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNavigator;

impl NavigationNotifier for NoopNavigator {
    fn redirect_to_login(&self) {}
}
