//! Blocking HTTP client for the AnnoFab v1 API.
//!
//! All endpoint wrappers in `api::*` go through this. Pagination follows
//! the service's list envelope (`list` + `page_no` + `total_page_no`).

use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://annofab.com/api/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One page of a list endpoint.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub page_no: u32,
    pub total_page_no: u32,
}

pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl Client {
    /// Build a client for `endpoint` authenticating with a bearer token.
    pub fn new(endpoint: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::invalid_argument("token contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("afcli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self.http.get(self.url(path)).query(query).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let resp = self.http.put(self.url(path)).json(body).send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        let resp = self.http.delete(self.url(path)).send()?;
        Self::check(resp)?;
        Ok(())
    }

    /// GET raw bytes. Used for outer annotation bodies, whose `url` field
    /// may point outside the API base.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let full = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.url(url)
        };
        let resp = self.http.get(full).send()?;
        Ok(Self::check(resp)?.bytes()?.to_vec())
    }

    /// PUT raw bytes with a content type. Used to upload outer bodies.
    pub fn put_bytes(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<()> {
        let resp = self
            .http
            .put(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()?;
        Self::check(resp)?;
        Ok(())
    }

    /// Fetch every page of a list endpoint and concatenate.
    pub fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        base_query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut page_no = 1u32;
        loop {
            let mut query: Vec<(&str, String)> = base_query.to_vec();
            query.push(("page", page_no.to_string()));
            query.push(("limit", crate::model::PAGE_SIZE.to_string()));
            let page: Page<T> = self.get_json(path, &query)?;
            let total = page.total_page_no;
            out.extend(page.list);
            if page_no >= total {
                break;
            }
            page_no += 1;
        }
        Ok(out)
    }

    /// False when a GET on `path` came back 404; other errors propagate.
    pub fn exists(&self, path: &str) -> Result<bool> {
        let resp = self.http.get(self.url(path)).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(resp)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_parses() {
        let p: Page<String> = serde_json::from_str(
            r#"{"list":["x","y"],"page_no":1,"total_page_no":3,"total_count":5}"#,
        )
        .unwrap();
        assert_eq!(p.list.len(), 2);
        assert_eq!(p.page_no, 1);
        assert_eq!(p.total_page_no, 3);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let c = Client::new("https://example.com/api/v1/", "t").unwrap();
        assert_eq!(c.url("/projects"), "https://example.com/api/v1/projects");
        assert_eq!(c.url("projects"), "https://example.com/api/v1/projects");
    }
}
