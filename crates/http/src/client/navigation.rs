//! Forced navigation back to sign-in

/// Performs the full navigation to the sign-in entry point after the session
/// could not be recovered
pub trait SignInNavigator: Send + Sync {
    fn navigate_to_sign_in(&self, path: &str);
}

/// Native default: there is no page to leave, so the redirect is only logged
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl SignInNavigator for LogNavigator {
    fn navigate_to_sign_in(&self, path: &str) {
        warn!(path, "session ended, sign in again to continue");
    }
}
