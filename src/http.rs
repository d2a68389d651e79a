//! Blocking HTTP access shared by the networked catalog providers.
//!
//! Providers talk to an [`HttpFetch`] and decode the returned body
//! themselves, so they can run against canned responses.

use crate::debug_log;
use crate::error::{Error, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("music-wordle/", env!("CARGO_PKG_VERSION"));

/// GET-only transport returning the response body.
pub trait HttpFetch {
    fn get_text(&self, url: &str, query: &[(&str, &str)], bearer_token: Option<&str>)
    -> Result<String>;
}

/// [`HttpFetch`] over a `ureq` agent with connect/read/write timeouts.
pub struct UreqFetch {
    agent: ureq::Agent,
}

impl UreqFetch {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(10))
            .timeout_write(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl Default for UreqFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetch for UreqFetch {
    fn get_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
        bearer_token: Option<&str>,
    ) -> Result<String> {
        debug_log!("UreqFetch::get_text() - GET {} {:?}", url, query);
        let mut request = self.agent.get(url).set("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }
        if let Some(token) = bearer_token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        let response = request.call().map_err(|error| Error::Http {
            url: url.to_string(),
            message: describe(&error),
        })?;
        Ok(response.into_string()?)
    }
}

fn describe(error: &ureq::Error) -> String {
    match error {
        ureq::Error::Status(401, _) => "unauthorized (token missing or expired)".to_string(),
        ureq::Error::Status(code, response) => {
            format!("HTTP {code} {}", response.status_text())
        }
        // The transport's own Display repeats the full URL; `Error::Http` already names it.
        ureq::Error::Transport(transport) => describe_transport(transport.kind(), transport.message()),
    }
}

fn describe_transport(kind: ureq::ErrorKind, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("{kind}: {message}"),
        None => kind.to_string(),
    }
}
