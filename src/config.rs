use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use secrecy::{ExposeSecret, SecretString};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Config {
    pub application: Application,
    pub database: Database,
    pub jwt: Jwt,
    pub chatbot: Chatbot,
    #[serde(default)]
    pub oauth: OAuth,
    #[serde(default)]
    pub storage: Storage,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Application {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub run_migration: bool,
}

impl Application {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Jwt {
    pub secret: SecretString,
    pub iss: SecretString,
    pub aud: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub expires_in_hours: i64,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Database {
    pub username: String,
    pub password: SecretString,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub database_name: String,
    #[serde(default)]
    pub require_ssl: bool,
}

impl Database {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

/// OpenAI-compatible chat completion endpoint used by the assistant.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Chatbot {
    pub api_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_tokens: u32,
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct OAuth {
    pub google: Option<GoogleOAuth>,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct GoogleOAuth {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: String,
    #[serde(default = "default_google_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
    #[serde(default = "default_google_userinfo_url")]
    pub userinfo_url: String,
    /// Frontend page receiving `?token=...` after a successful login.
    pub success_redirect: Option<String>,
}

fn default_google_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_google_userinfo_url() -> String {
    "https://www.googleapis.com/oauth2/v2/userinfo".to_string()
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct Storage {
    pub covers_dir: Option<String>,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, anyhow::Error> {
        let base_path = std::env::current_dir().context("Failed to determine the current directory.")?;
        let config_directory = base_path.join("configuration");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(anyhow::Error::msg)
            .context("Failed to parse APP_ENVIRONMENT.")?;

        let environment_filename = format!("{}.yaml", environment.as_str());

        Figment::new()
            .merge(Yaml::file(config_directory.join("base.yaml")))
            .merge(Yaml::file(config_directory.join(environment_filename)))
            .merge(Env::raw().split("__"))
            .extract()
            .context("Failed to extract configuration.")
    }
}
