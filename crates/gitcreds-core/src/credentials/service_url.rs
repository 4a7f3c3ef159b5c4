//! Git service URLs that can carry userinfo

use crate::{CoreError, Result};
use url::{Position, Url};

/// A parsed git service URL.
///
/// Remembers whether the configured text had an explicit path so that
/// `https://github.com` renders back without the trailing `/` the URL parser
/// would otherwise add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    url: Url,
    explicit_path: bool,
}

impl ServiceUrl {
    /// Parse a git service URL.
    ///
    /// The URL must be absolute and have a host, otherwise it cannot carry
    /// a username and password.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| CoreError::invalid_url(raw, e))?;

        if url.cannot_be_a_base() || url.host_str().map_or(true, str::is_empty) {
            return Err(CoreError::invalid_url(raw, "URL has no host"));
        }
        if url.scheme() == "file" {
            return Err(CoreError::invalid_url(raw, "file URLs cannot carry credentials"));
        }

        Ok(Self {
            url,
            explicit_path: has_explicit_path(raw.trim()),
        })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    /// Render the URL, dropping the implicit root path
    pub fn render(&self) -> String {
        if self.explicit_path || self.url.path() != "/" {
            return self.url.as_str().to_string();
        }
        format!(
            "{}{}",
            &self.url[..Position::BeforePath],
            &self.url[Position::AfterPath..]
        )
    }
}

impl std::fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// True if the text after `scheme://host` starts with a `/`
fn has_explicit_path(raw: &str) -> bool {
    let rest = raw.split_once("://").map(|(_, rest)| rest).unwrap_or(raw);
    match rest.find(['/', '?', '#']) {
        Some(idx) => rest[idx..].starts_with('/'),
        None => false,
    }
}
