use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Label prepended to the domain to form the validation owner name
pub const CHALLENGE_LABEL: &str = "_acme-challenge";

/// Default directory holding `<domain>.zone` files
pub const DEFAULT_ZONE_DIR: &str = "/etc/bind/zones";

/// Hook operation requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Publish the challenge TXT record
    Auth,
    /// Remove the challenge TXT record
    Cleanup,
}

#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Directory holding the zone files
    pub zone_dir: PathBuf,

    /// Target domain, wildcard prefix already stripped
    pub domain: String,

    /// Challenge token to publish (required for auth, unused for cleanup)
    pub validation_token: Option<String>,

    /// Drop-and-append the record instead of updating it in place
    pub force_register: bool,

    /// Pause after a successful save so a watcher-driven reload can run
    /// before the caller moves on to the next record
    pub settle_delay: Duration,

    /// Shell command to reload the DNS server after save (None = rely on
    /// an external file watcher)
    pub reload_command: Option<String>,
}

impl HookConfig {
    /// Build the configuration for `action` from the certbot hook
    /// environment. Returns Err if required variables are missing or any
    /// override is invalid.
    pub fn from_env(action: HookAction) -> Result<Self, ConfigError> {
        let raw_domain = std::env::var("CERTBOT_DOMAIN")
            .map_err(|_| ConfigError::MissingVar("CERTBOT_DOMAIN"))?;
        let domain = strip_wildcard(&raw_domain).to_string();
        if domain.is_empty() {
            return Err(ConfigError::InvalidDomain(raw_domain));
        }

        // Cleanup runs without a token; certbot still exports the variable
        // for cleanup hooks, so take it when present and non-empty
        let validation_token = match action {
            HookAction::Auth => Some(
                std::env::var("CERTBOT_VALIDATION")
                    .map_err(|_| ConfigError::MissingVar("CERTBOT_VALIDATION"))?,
            ),
            HookAction::Cleanup => std::env::var("CERTBOT_VALIDATION")
                .ok()
                .filter(|t| !t.is_empty()),
        };

        let mut config = Self {
            zone_dir: PathBuf::from(DEFAULT_ZONE_DIR),
            domain,
            validation_token,
            force_register: true,
            settle_delay: default_settle_delay(action),
            reload_command: None,
        };

        if let Ok(zone_dir) = std::env::var("ZONEHOOK_ZONE_DIR") {
            if !zone_dir.is_empty() {
                config.zone_dir = PathBuf::from(zone_dir);
            }
        }

        if let Ok(force) = std::env::var("ZONEHOOK_FORCE_REGISTER") {
            config.force_register = parse_bool(&force, true);
        }

        if let Ok(delay) = std::env::var("ZONEHOOK_SETTLE_DELAY") {
            let secs = delay
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDelay(delay))?;
            config.settle_delay = Duration::from_secs(secs);
        }

        if let Ok(command) = std::env::var("ZONEHOOK_RELOAD_COMMAND") {
            if !command.is_empty() {
                config.reload_command = Some(command);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Owner name of the challenge TXT record
    pub fn validation_domain(&self) -> String {
        format!("{}.{}", CHALLENGE_LABEL, self.domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.is_empty() || self.domain.starts_with('.') {
            return Err(ConfigError::InvalidDomain(self.domain.clone()));
        }

        if let Some(token) = &self.validation_token {
            if token.is_empty() {
                return Err(ConfigError::EmptyToken);
            }
        }

        // A settle delay longer than this means a stuck hook, not propagation
        if self.settle_delay > Duration::from_secs(300) {
            return Err(ConfigError::InvalidDelay(
                "Settle delay too large (max 300 seconds)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Strip the wildcard prefix certbot passes for `*.domain` certificates.
/// The challenge record for a wildcard lives at the bare domain.
pub fn strip_wildcard(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Default post-save pause per operation. Publishing is picked up by the
/// local server before certbot polls, so auth does not wait; cleanup waits
/// briefly so back-to-back removals in a multi-domain run each get their
/// own reload.
fn default_settle_delay(action: HookAction) -> Duration {
    match action {
        HookAction::Auth => Duration::from_secs(0),
        HookAction::Cleanup => Duration::from_secs(5),
    }
}

/// Parse a boolean from a string, with a default value for invalid input
fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
