use crate::{
    config::AppConfig,
    error::{AppError, Result},
};
use std::{fmt, path::PathBuf, time::Duration};
use tracing::debug;
use url::Url;

/// Where a playlist comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Remote(Url),
}

impl Source {
    /// http(s) URLs are fetched, anything else is a local path.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Remote(url),
            _ => Source::File(PathBuf::from(input)),
        }
    }

    /// Base for relative URI lines.
    pub fn base_url(&self) -> Option<&Url> {
        match self {
            Source::Remote(url) => Some(url),
            Source::File(_) => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// Reads playlists from disk or over HTTP.
pub struct Loader {
    client: reqwest::Client,
}

impl Loader {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn load(&self, source: &Source) -> Result<Vec<u8>> {
        match source {
            Source::File(path) => {
                debug!(path = %path.display(), "reading playlist");
                tokio::fs::read(path).await.map_err(|e| AppError::Load {
                    input: source.to_string(),
                    reason: e.to_string(),
                })
            }
            Source::Remote(url) => {
                debug!(%url, "fetching playlist");
                let response = self.client.get(url.clone()).send().await?;
                let body = response.error_for_status()?.bytes().await?;
                Ok(body.to_vec())
            }
        }
    }
}
