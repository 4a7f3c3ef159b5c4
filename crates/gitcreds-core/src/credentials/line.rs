//! git-credentials line synthesis
//!
//! Each resolved credential renders to one or two lines of the git
//! credential store format: the URL with embedded userinfo, followed by the
//! same URL with an `https` scheme so that hosts reachable only over https
//! are covered too.

use super::service_url::ServiceUrl;
use crate::{CoreError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// URL userinfo encode set plus `%`, so literal `%XX` in a secret survives
/// the percent-decoding done by git's credential store
const USERINFO: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// When to write the second, `https` line for a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpsMirror {
    /// Always write it, duplicating the first line for `https` URLs.
    /// Existing credentials files have always contained the duplicate.
    #[default]
    Always,
    /// Only write it when the configured scheme was `http`
    HttpOnly,
}

/// A credential ready to be rendered. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub base_url: ServiceUrl,
    pub username: String,
    pub secret: String,
}

/// Ordered, append-only set of git-credentials lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialLineSet {
    lines: Vec<String>,
}

impl CredentialLineSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Render as the bytes of a git-credentials file, one `\n` terminated line per entry
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl std::fmt::Display for CredentialLineSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Append the lines for one credential.
///
/// The username and secret are percent-encoded into the URL userinfo. An
/// `http` URL is followed by its `https` twin.
pub fn synthesize(
    credential: &ResolvedCredential,
    mirror: HttpsMirror,
    lines: &mut CredentialLineSet,
) -> Result<()> {
    let mut url = credential.base_url.clone();
    let raw = credential.base_url.as_url().as_str();

    url.url_mut()
        .set_username(&utf8_percent_encode(&credential.username, USERINFO).to_string())
        .map_err(|_| CoreError::invalid_url(raw, "URL cannot carry a username"))?;
    url.url_mut()
        .set_password(Some(
            &utf8_percent_encode(&credential.secret, USERINFO).to_string(),
        ))
        .map_err(|_| CoreError::invalid_url(raw, "URL cannot carry a password"))?;

    lines.push(url.render());

    let was_http = url.scheme() == "http";
    if was_http {
        url.url_mut()
            .set_scheme("https")
            .map_err(|_| CoreError::invalid_url(raw, "cannot switch scheme to https"))?;
    }

    if was_http || mirror == HttpsMirror::Always {
        lines.push(url.render());
    }

    Ok(())
}
