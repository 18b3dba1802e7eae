#[derive(Clone)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Dev => "dev",
            Env::Staging => "staging",
            Env::Production => "production",
        }
    }
}

pub struct ServerConfig {
    pub env: Env,
    pub database_url: String,
    pub port: u16,

    /// Base URL of the profile-picture service. When unset, avatar
    /// resolution is skipped and listings carry empty image URLs.
    pub avatar_service_url: Option<String>,

    pub cors_allowed_origin: Option<String>,
}

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => {
                tracing::warn!("Missing environment variable `{key}`");
                Ok(None)
            }
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

fn required_var(key: &str) -> String {
    let val = var(key);
    match val {
        Ok(val) => match val {
            Some(val) => val,
            None => {
                tracing::error!("Environment variable `{key}` is required");
                std::process::exit(1)
            }
        },
        Err(e) => {
            tracing::error!(
                "Environment variable `{key}` is required, but could not retrieve: {e}"
            );
            std::process::exit(1)
        }
    }
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let port = match var("PORT") {
            Ok(Some(port)) => port.parse().unwrap_or_else(|_| {
                tracing::error!("Environment variable `PORT` is not a valid port number");
                std::process::exit(1)
            }),
            _ => 3000,
        };

        ServerConfig {
            env: match var("ENVIRONMENT") {
                Ok(Some(env)) => match env.as_str() {
                    "dev" => Env::Dev,
                    "staging" => Env::Staging,
                    "production" => Env::Production,
                    _ => Env::Dev,
                },
                _ => Env::Dev,
            },
            database_url: required_var("DATABASE_URL"),
            port,
            avatar_service_url: var("AVATAR_SERVICE_URL").unwrap_or(None),
            cors_allowed_origin: var("CORS_ALLOWED_ORIGIN").unwrap_or(None),
        }
    }
}
