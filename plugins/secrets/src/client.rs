use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use strata_sdk::{LoadResult, LoaderError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the raw string payload of a secret by id.
pub trait SecretClient: Send + Sync {
    /// `Ok(None)` when the store has no secret with that id.
    fn get_secret_string(&self, id: &str) -> LoadResult<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(rename = "SecretString", default)]
    secret_string: Option<String>,
}

/// Talks to `GET {endpoint}/v1/secrets/{id}`. Each `/`-separated part of
/// the id is sent as one percent-encoded path segment.
pub struct HttpSecretClient {
    http: Client,
    endpoint: Url,
    token: Option<String>,
}

impl std::fmt::Debug for HttpSecretClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSecretClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpSecretClient {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> LoadResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            LoaderError::invalid_config(format!("invalid endpoint '{endpoint}': {e}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(LoaderError::invalid_config(format!(
                "endpoint '{endpoint}' cannot carry a path"
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoaderError::backend(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    fn url(&self, id: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "secrets"])
                .extend(id.split('/'));
        }
        url
    }
}

impl SecretClient for HttpSecretClient {
    fn get_secret_string(&self, id: &str) -> LoadResult<Option<String>> {
        let mut request = self.http.get(self.url(id));
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| LoaderError::backend(format!("secret store request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(secret_id = %id, "secret not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LoaderError::backend(format!(
                "secret store returned {status} for '{id}'"
            )));
        }

        let body: SecretResponse = response
            .json()
            .map_err(|e| LoaderError::parse(self.url(id).as_str(), e))?;
        Ok(body.secret_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server, token: Option<&str>) -> HttpSecretClient {
        HttpSecretClient::new(&server.url(), token.map(str::to_string), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn fetches_secret_string_with_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/secrets/prod/database")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"SecretString": "{\"host\": \"db.internal\"}"}"#)
            .create();

        let secret = client(&server, Some("t0ken"))
            .get_secret_string("prod/database")
            .unwrap();
        assert_eq!(secret.as_deref(), Some(r#"{"host": "db.internal"}"#));
        mock.assert();
    }

    #[test]
    fn not_found_is_none() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v1/secrets/missing")
            .with_status(404)
            .create();

        assert_eq!(client(&server, None).get_secret_string("missing").unwrap(), None);
    }

    #[test]
    fn server_error_is_backend_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v1/secrets/app")
            .with_status(503)
            .create();

        let err = client(&server, None).get_secret_string("app").unwrap_err();
        assert!(matches!(err, LoaderError::Backend(_)));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v1/secrets/app")
            .with_status(200)
            .with_body("not json")
            .create();

        let err = client(&server, None).get_secret_string("app").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { .. }));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        for endpoint in ["http://127.0.0.1:8200", "http://127.0.0.1:8200/"] {
            let client = HttpSecretClient::new(endpoint, None, DEFAULT_TIMEOUT).unwrap();
            assert_eq!(
                client.url("app").as_str(),
                "http://127.0.0.1:8200/v1/secrets/app"
            );
        }
    }

    #[test]
    fn endpoint_path_is_kept() {
        let client =
            HttpSecretClient::new("https://vault.internal/api/", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.url("prod/app").as_str(),
            "https://vault.internal/api/v1/secrets/prod/app"
        );
    }

    #[test]
    fn id_segments_are_escaped() {
        let client =
            HttpSecretClient::new("http://127.0.0.1:8200", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.url("prod/a?b#c d").as_str(),
            "http://127.0.0.1:8200/v1/secrets/prod/a%3Fb%23c%20d"
        );
        assert_eq!(
            client.url("app/../../admin").as_str(),
            "http://127.0.0.1:8200/v1/secrets/app/admin"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = HttpSecretClient::new("not a url", None, DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(LoaderError::InvalidConfig(_))));
    }
}
