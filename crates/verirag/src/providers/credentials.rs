//! API key resolution

use std::fmt;

use crate::error::{Error, Result};

/// An API key that is resolved when a call is about to be made
///
/// An explicit key wins; otherwise the named environment variable is read.
#[derive(Clone)]
pub struct ApiCredential {
    explicit: Option<String>,
    env_var: String,
}

impl ApiCredential {
    pub fn new(explicit: Option<String>, env_var: impl Into<String>) -> Self {
        Self {
            explicit: explicit.filter(|key| !key.trim().is_empty()),
            env_var: env_var.into(),
        }
    }

    /// Read the key from `env_var` at call time
    pub fn from_env(env_var: impl Into<String>) -> Self {
        Self::new(None, env_var)
    }

    /// Use a fixed key
    pub fn explicit(key: impl Into<String>) -> Self {
        Self::new(Some(key.into()), String::new())
    }

    /// Return the key or a configuration error; never touches the network
    pub fn resolve(&self) -> Result<String> {
        if let Some(key) = &self.explicit {
            return Ok(key.clone());
        }

        match std::env::var(&self.env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::configuration(format!("{} is missing", self.env_var))),
        }
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("explicit", &self.explicit.as_ref().map(|_| "<redacted>"))
            .field("env_var", &self.env_var)
            .finish()
    }
}
