//! Per-request mode resolution.

use crate::config::AppConfig;
use crate::domain::Mode;

/// Decides which source answers a request.
///
/// The default is fixed at startup; each request may override it. Nothing
/// here depends on earlier requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeResolver {
    default: Mode,
}

impl ModeResolver {
    #[must_use]
    pub fn new(default: Mode) -> Self {
        Self { default }
    }

    /// Assisted by default only with a credential and without `force_mock`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let default = if config.has_credential() && !config.force_mock {
            Mode::Assisted
        } else {
            Mode::Mock
        };
        Self::new(default)
    }

    #[must_use]
    pub fn default_mode(&self) -> Mode {
        self.default
    }

    /// Resolve the mode for one request.
    ///
    /// `mock_override` is the client's explicit signal: `Some(true)` asks for
    /// mock, `Some(false)` asks for assisted. Either wins over the default.
    #[must_use]
    pub fn resolve(&self, mock_override: Option<bool>) -> Mode {
        match mock_override {
            Some(true) => Mode::Mock,
            Some(false) => Mode::Assisted,
            None => self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn config(key: Option<&str>, force_mock: bool) -> AppConfig {
        AppConfig {
            openai_api_key: key.map(|k| Zeroizing::new(k.to_string())),
            force_mock,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_from_config() {
        assert_eq!(
            ModeResolver::from_config(&config(Some("sk-x"), false)).default_mode(),
            Mode::Assisted
        );
        assert_eq!(
            ModeResolver::from_config(&config(Some("sk-x"), true)).default_mode(),
            Mode::Mock
        );
        assert_eq!(
            ModeResolver::from_config(&config(None, false)).default_mode(),
            Mode::Mock
        );
        assert_eq!(
            ModeResolver::from_config(&config(None, true)).default_mode(),
            Mode::Mock
        );
    }

    #[test]
    fn test_override_takes_precedence() {
        let mock_default = ModeResolver::new(Mode::Mock);
        assert_eq!(mock_default.resolve(Some(false)), Mode::Assisted);
        assert_eq!(mock_default.resolve(Some(true)), Mode::Mock);
        assert_eq!(mock_default.resolve(None), Mode::Mock);

        let assisted_default = ModeResolver::new(Mode::Assisted);
        assert_eq!(assisted_default.resolve(Some(true)), Mode::Mock);
        assert_eq!(assisted_default.resolve(None), Mode::Assisted);
    }

    #[test]
    fn test_resolution_is_stateless() {
        let resolver = ModeResolver::new(Mode::Mock);
        assert_eq!(resolver.resolve(Some(false)), Mode::Assisted);
        assert_eq!(resolver.resolve(None), Mode::Mock);
        assert_eq!(resolver.default_mode(), Mode::Mock);
    }
}
