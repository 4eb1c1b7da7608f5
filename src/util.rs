//! Utility functions and helpers.

/// Logs a recurring condition at `warn` the first time it is seen and at
/// `debug` afterwards, until [`WarnOnce::clear`] is called.
///
/// Keeps a misconfigured 10-second loop from flooding the log:
/// ```ignore
/// if let Err(e) = notifier.ready().await {
///     self.channel_warning.warn(format_args!("channel unavailable: {}", e));
///     return;
/// }
/// if self.channel_warning.is_active() {
///     tracing::info!("channel available again");
///     self.channel_warning.clear();
/// }
/// ```
#[derive(Debug, Default)]
pub struct WarnOnce {
    warned: bool,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `message`; returns true if it went out at `warn` level
    pub fn warn(&mut self, message: std::fmt::Arguments<'_>) -> bool {
        if self.warned {
            tracing::debug!("{}", message);
            false
        } else {
            tracing::warn!("{}", message);
            self.warned = true;
            true
        }
    }

    /// The condition went away; warn again if it comes back
    pub fn clear(&mut self) {
        self.warned = false;
    }

    /// True while the condition has been reported and not yet cleared
    pub fn is_active(&self) -> bool {
        self.warned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_only_first_time() {
        let mut once = WarnOnce::new();
        assert!(once.warn(format_args!("first")));
        assert!(!once.warn(format_args!("second")));
        assert!(once.is_active());
    }

    #[test]
    fn clear_rearms_warning() {
        let mut once = WarnOnce::new();
        once.warn(format_args!("down"));
        once.clear();
        assert!(!once.is_active());
        assert!(once.warn(format_args!("down again")));
    }
}
