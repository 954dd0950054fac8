//! Client configuration.
//!
//! Every setting can come from a flag, the environment, or a `.env` file
//! in the working directory (loaded at startup).
//!
//! | Flag        | Environment       | Default                     |
//! |-------------|-------------------|-----------------------------|
//! | `--api-url` | `ENROL_API_URL`   | `http://localhost:8000/api` |
//! | `--token`   | `ENROL_API_TOKEN` | none                        |

use clap::Args;
use enrol_core::Endpoints;

/// Backend base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Connection settings for the school backend.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Backend API base URL
    #[arg(long, env = "ENROL_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "ENROL_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
}

impl Settings {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.api_url.trim())
    }

    /// The token, if one is set and non-blank.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, None)
    }
}
