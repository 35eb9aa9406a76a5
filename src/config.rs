use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Directory holding a file-backed SQLite database, if the URL names one.
    pub fn parent_dir(&self) -> Option<&Path> {
        let path = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next()?;
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Path::new(path).parent().filter(|dir| !dir.as_os_str().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded images are written under.
    pub root: String,
    /// Public prefix prepended to stored paths, always ends with `/`.
    pub url: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub profile_page_size: u32,
    pub post_page_size: u32,
    pub hashtag_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            profile_page_size: 10,
            post_page_size: 5,
            hashtag_page_size: 10,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = PaginationConfig::default();
        let mut media_url = env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string());
        if !media_url.ends_with('/') {
            media_url.push('/');
        }

        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/social_media.db".to_string()),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("SERVER_PORT", 8000)?,
            },
            media: MediaConfig {
                root: env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
                url: media_url,
                max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            },
            pagination: PaginationConfig {
                profile_page_size: env_or("PROFILE_PAGE_SIZE", defaults.profile_page_size)?,
                post_page_size: env_or("POST_PAGE_SIZE", defaults.post_page_size)?,
                hashtag_page_size: env_or("HASHTAG_PAGE_SIZE", defaults.hashtag_page_size)?,
            },
        })
    }

    /// In-memory database and the given media root, for tests and tooling.
    pub fn for_testing(media_root: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            media: MediaConfig {
                root: media_root.into(),
                url: "/media/".to_string(),
                max_upload_bytes: 1024 * 1024,
            },
            pagination: PaginationConfig::default(),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_sizes() {
        let pagination = PaginationConfig::default();
        assert_eq!(pagination.profile_page_size, 10);
        assert_eq!(pagination.post_page_size, 5);
        assert_eq!(pagination.hashtag_page_size, 10);
    }

    #[test]
    fn test_server_address() {
        let mut config = Config::for_testing("media");
        config.server.port = 8080;
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_database_parent_dir() {
        let mut database =
            DatabaseConfig { url: "sqlite:data/social_media.db".into(), max_connections: 1 };
        assert_eq!(database.parent_dir(), Some(Path::new("data")));

        database.url = "sqlite://social_media.db?mode=rwc".into();
        assert_eq!(database.parent_dir(), None);

        database.url = "sqlite::memory:".into();
        assert_eq!(database.parent_dir(), None);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        env::set_var("SOCIAL_MEDIA_TEST_PORT", "not-a-port");
        assert!(env_or::<u16>("SOCIAL_MEDIA_TEST_PORT", 1).is_err());
        env::remove_var("SOCIAL_MEDIA_TEST_PORT");
        assert_eq!(env_or::<u16>("SOCIAL_MEDIA_TEST_PORT", 1).unwrap(), 1);
    }
}
