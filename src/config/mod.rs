use crate::error::{ResponderError, Result};
use crate::translation::Translator;
use dashmap::DashMap;
use serde::Serialize;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

pub const APP_ENV: &str = "app.env";
pub const APP_NAME: &str = "app.name";
pub const SLACK_ENDPOINT: &str = "services.slack.endpoint";
pub const LOGIN_ROUTE: &str = "routes.sessions.create";
/// Path of a JSON file merged over the built-in English lines
pub const TRANSLATIONS: &str = "app.translations";

const DEFAULT_APP_NAME: &str = "Application";
const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Configuration service
///
/// Values are stored under dotted keys (`services.slack.endpoint`). Lookups
/// fall back to the upper-snake form of the key (`SERVICES_SLACK_ENDPOINT`),
/// which is how process environment variables land in the store.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let service = Self::default();
        for (key, value) in pairs {
            service.set(key.as_ref(), value.as_ref());
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.config.get(key) {
            return Some(value.clone());
        }
        self.config.get(&env_key(key)).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Empty values are treated as unset
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

fn env_key(key: &str) -> String {
    key.replace(['.', '-'], "_").to_uppercase()
}

/// Deployment mode of the running process
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Local,
    Development,
    Testing,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self> {
        Environment::from_str(value.trim())
            .map_err(|_| ResponderError::InvalidEnvironment(value.to_string()))
    }

    /// Only `production` hides internal error detail
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Values injected into the responder at construction
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub environment: Environment,
    pub app_name: String,
    pub slack_endpoint: Option<String>,
    pub login_route: String,
    pub translator: Translator,
}

impl ResponderConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            app_name: DEFAULT_APP_NAME.to_string(),
            slack_endpoint: None,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            translator: Translator::default(),
        }
    }

    /// Build from a [`ConfigService`]. A missing `app.env` means production.
    ///
    /// When `app.translations` names a file it is merged over the default
    /// lines; an unreadable or malformed file is a config error.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let environment = match config.get_non_empty(APP_ENV) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::default(),
        };

        let login_route = config.get_or(LOGIN_ROUTE, DEFAULT_LOGIN_ROUTE);
        let absolute = login_route.starts_with("http://") || login_route.starts_with("https://");
        if !login_route.starts_with('/') && !absolute {
            return Err(ResponderError::config(format!(
                "{} must be a path or absolute URL, got {:?}",
                LOGIN_ROUTE, login_route
            )));
        }

        let mut translator = Translator::default();
        if let Some(path) = config.get_non_empty(TRANSLATIONS) {
            translator.load_json_file(path.trim())?;
        }

        Ok(Self {
            environment,
            app_name: config.get_or(APP_NAME, DEFAULT_APP_NAME),
            slack_endpoint: config.get_non_empty(SLACK_ENDPOINT),
            login_route,
            translator,
        })
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_slack_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.slack_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }
}
