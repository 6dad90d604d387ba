//! Connection settings from flags and the environment

use crate::cli::ConnectionArgs;
use tca_client::ClientConfig;
use thiserror::Error;

pub const ENV_URL: &str = "TCA_URL";
pub const ENV_USERNAME: &str = "TCA_USERNAME";
pub const ENV_PASSWORD: &str = "TCA_PASSWORD";
pub const ENV_INSECURE: &str = "TCA_INSECURE";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Clone)]
pub struct Settings {
    pub url: String,
    pub username: String,
    password: String,
    pub insecure: bool,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Settings {
    /// Flags win over the environment; `env` looks a variable up by name
    pub fn resolve(args: &ConnectionArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let pick = |flag: &Option<String>, var: &str, name: &str| {
            let given = |v: &String| !v.trim().is_empty();
            flag.clone()
                .filter(given)
                .or_else(|| env(var).filter(given))
                .ok_or_else(|| CliError::InvalidConfig(format!("{} is required (--{} or {})", name, name, var)))
        };

        Ok(Self {
            url: pick(&args.url, ENV_URL, "url")?,
            username: pick(&args.username, ENV_USERNAME, "username")?,
            password: pick(&args.password, ENV_PASSWORD, "password")?,
            insecure: args.insecure || env(ENV_INSECURE).is_some_and(|v| truthy(&v)),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.url, &self.username, &self.password).allow_self_signed(self.insecure)
    }
}
