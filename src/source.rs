//! schema sources
//!
//! sdl comes from local files or from an http endpoint serving the schema as
//! text. everything read here is handed to [`crate::Schema::from_sources`].

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// default timeout for remote schema fetches
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("projection-codegen/", env!("CARGO_PKG_VERSION"));

/// read every sdl file in order
pub fn read_schema_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            tracing::debug!(path = %path.display(), "reading schema file");
            std::fs::read_to_string(path).map_err(Error::from)
        })
        .collect()
}

/// sdl served over http
#[derive(Debug, Clone)]
pub struct RemoteSchema {
    url: Url,
    headers: HeaderMap,
    timeout: Duration,
}

impl RemoteSchema {
    /// create a remote source for `url`
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "schema url must be http or https: {url}"
            )));
        }
        Ok(Self {
            url,
            headers: HeaderMap::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        })
    }

    /// add a request header, e.g. an authorization token
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|err| Error::Config(format!("invalid header name `{name}`: {err}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|err| Error::Config(format!("invalid value for header `{name}`: {err}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// fetch the schema as text
    pub async fn fetch(&self) -> Result<String> {
        let http = reqwest::Client::builder()
            .default_headers(self.headers.clone())
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;

        self.fetch_with(|url| async move {
            let response = http.get(url).send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok((status, text))
        })
        .await
    }

    pub(crate) async fn fetch_with<F, Fut>(&self, send: F) -> Result<String>
    where
        F: FnOnce(Url) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        tracing::debug!(url = %self.url, "fetching remote schema");
        let (status, text) = send(self.url.clone()).await?;
        parse_schema_response(status, text)
    }
}

fn parse_schema_response(status: StatusCode, text: String) -> Result<String> {
    if !status.is_success() {
        return Err(Error::SchemaFetch {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_fetch_success() {
        let remote = RemoteSchema::new("http://localhost:4000/schema.graphql").unwrap();
        let sdl = remote
            .fetch_with(|url| async move {
                assert_eq!(url.path(), "/schema.graphql");
                Ok((StatusCode::OK, "type Query { ok: Boolean }".to_string()))
            })
            .await
            .unwrap();
        assert!(sdl.contains("type Query"));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_fetch_http_error() {
        let remote = RemoteSchema::new("http://localhost:4000/schema.graphql").unwrap();
        let err = remote
            .fetch_with(|_url| async move { Ok((StatusCode::NOT_FOUND, "not found".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaFetch { status: 404, ref body } if body == "not found"
        ));
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(RemoteSchema::new("not a url"), Err(Error::Url(_))));
        assert!(matches!(
            RemoteSchema::new("ftp://example.com/schema"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_with_header() {
        let remote = RemoteSchema::new("https://example.com/graphql")
            .unwrap()
            .with_header("Authorization", " Bearer abc ")
            .unwrap();
        assert_eq!(remote.headers["authorization"], "Bearer abc");

        let err = RemoteSchema::new("https://example.com/graphql")
            .unwrap()
            .with_header("bad header", "x")
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_schema_response() {
        let text = parse_schema_response(StatusCode::OK, "type Query".to_string()).unwrap();
        assert_eq!(text, "type Query");
        let err = parse_schema_response(StatusCode::BAD_GATEWAY, String::new()).unwrap_err();
        assert!(matches!(err, Error::SchemaFetch { status: 502, .. }));
    }

    #[test]
    fn test_read_schema_files() {
        let dir = std::env::temp_dir().join(format!("projection-codegen-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let base = dir.join("base.graphql");
        let ext = dir.join("ext.graphql");
        std::fs::write(&base, "type Query { shows: [Show] }").unwrap();
        std::fs::write(&ext, "type Show { title: String }").unwrap();

        let sources = read_schema_files(&[&base, &ext]).unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources[1].contains("Show"));

        let err = read_schema_files(&[dir.join("missing.graphql")]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
