// colablint - Session Discovery
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Lists the host's active notebook sessions over its local HTTP API and
// picks the one belonging to our kernel.

use crate::config::LocatorConfig;
use crate::error::NotebookError;
use crate::host;
use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kernel reference inside a session record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelRef {
    #[serde(default)]
    pub id: Option<String>,
}

/// One entry of `GET /api/sessions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub kernel: Option<KernelRef>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionRecord {
    pub fn kernel_id(&self) -> Option<&str> {
        self.kernel.as_ref()?.id.as_deref()
    }
}

/// Anything that can list the host's sessions
pub trait SessionSource {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, NotebookError>;
}

/// The host's local session API
pub struct HttpSessionSource {
    client: Client,
    config: LocatorConfig,
}

impl HttpSessionSource {
    pub fn new(config: &LocatorConfig) -> Result<Self, NotebookError> {
        let client = Client::builder()
            .user_agent(concat!("colablint/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| NotebookError::SessionApi(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn sessions_url(&self) -> Result<String, NotebookError> {
        let host = host::host_address(&self.config)?;
        Ok(format!("http://{}:{}/api/sessions", host, self.config.api_port))
    }
}

impl SessionSource for HttpSessionSource {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, NotebookError> {
        let url = self.sessions_url()?;
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| NotebookError::SessionApi(format!("{}: {}", url, e)))?;

        if !resp.status().is_success() {
            return Err(NotebookError::SessionApi(format!(
                "HTTP {}: {}",
                resp.status().as_u16(),
                url
            )));
        }

        resp.json::<Option<Vec<SessionRecord>>>()
            .map(Option::unwrap_or_default)
            .map_err(|e| NotebookError::SessionApi(format!("Parse failed: {}", e)))
    }
}

/// Choose the notebook name for `kernel_id`.
///
/// A session whose kernel matches wins; otherwise the first named session.
/// The returned name is percent-decoded.
pub fn select_notebook_name(
    sessions: &[SessionRecord],
    kernel_id: Option<&str>,
) -> Result<String, NotebookError> {
    if sessions.is_empty() {
        return Err(NotebookError::NoSessions);
    }

    let matched = kernel_id.and_then(|id| {
        sessions
            .iter()
            .find(|s| s.kernel_id() == Some(id) && s.name.is_some())
    });

    let session = match matched {
        Some(session) => {
            log::info!("Kernel ID ({}) matched.", kernel_id.unwrap_or_default());
            session
        }
        None => {
            if let Some(id) = kernel_id {
                log::warn!("Kernel ID ({}) not in session list, using first session", id);
            }
            sessions
                .iter()
                .find(|s| s.name.is_some())
                .ok_or(NotebookError::NoSessions)?
        }
    };

    let raw = session.name.as_deref().unwrap_or_default();
    Ok(percent_decode_str(raw).decode_utf8_lossy().to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn record(kernel: &str, name: &str) -> SessionRecord {
        SessionRecord {
            kernel: Some(KernelRef {
                id: Some(kernel.to_string()),
            }),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn matching_kernel_wins() {
        let sessions = vec![record("k1", "first.ipynb"), record("k2", "second.ipynb")];
        assert_eq!(select_notebook_name(&sessions, Some("k2")).unwrap(), "second.ipynb");
    }

    #[test]
    fn unmatched_kernel_falls_back_to_first() {
        let sessions = vec![record("k1", "first.ipynb"), record("k2", "second.ipynb")];
        assert_eq!(select_notebook_name(&sessions, Some("zzz")).unwrap(), "first.ipynb");
        assert_eq!(select_notebook_name(&sessions, None).unwrap(), "first.ipynb");
    }

    #[test]
    fn empty_listing_is_no_sessions() {
        assert_eq!(select_notebook_name(&[], Some("k1")), Err(NotebookError::NoSessions));
    }

    #[test]
    fn name_is_percent_decoded() {
        let sessions = vec![record("k1", "My%20Notebook%20caf%C3%A9.ipynb")];
        assert_eq!(select_notebook_name(&sessions, Some("k1")).unwrap(), "My Notebook café.ipynb");
    }

    #[test]
    fn records_tolerate_missing_fields() {
        let parsed: Vec<SessionRecord> =
            serde_json::from_str(r#"[{"name": "a.ipynb"}, {"kernel": {"id": "k"}, "path": "x"}]"#).unwrap();
        assert_eq!(parsed[0].kernel_id(), None);
        assert_eq!(parsed[1].name, None);
        assert_eq!(select_notebook_name(&parsed, Some("k")).unwrap(), "a.ipynb");
    }

    /// One-shot HTTP server answering a single request with `body`
    fn serve_once(status: &str, body: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let status = status.to_string();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        port
    }

    fn local_config(port: u16) -> LocatorConfig {
        LocatorConfig {
            api_host: Some("127.0.0.1".to_string()),
            api_port: port,
            ..LocatorConfig::default()
        }
    }

    #[test]
    fn http_source_parses_listing() {
        let port = serve_once(
            "200 OK",
            r#"[{"kernel": {"id": "k1"}, "name": "nb.ipynb"}]"#,
        );
        let source = HttpSessionSource::new(&local_config(port)).unwrap();
        let sessions = source.list_sessions().unwrap();
        assert_eq!(sessions, vec![record("k1", "nb.ipynb")]);
    }

    #[test]
    fn http_source_null_body_is_empty_listing() {
        let port = serve_once("200 OK", "null");
        let source = HttpSessionSource::new(&local_config(port)).unwrap();
        assert!(source.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn http_source_error_status_is_typed() {
        let port = serve_once("503 Service Unavailable", "{}");
        let source = HttpSessionSource::new(&local_config(port)).unwrap();
        assert!(matches!(source.list_sessions(), Err(NotebookError::SessionApi(_))));
    }
}
