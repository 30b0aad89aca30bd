use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::{decode_array, Source};
use crate::config::SourceUrls;
use crate::error::{ImportError, Result};
use crate::model::RecordKind;

/// Fetches the datasets from the NSI API (or any server with the same layout)
pub struct HttpSource {
    client: Client,
    urls: SourceUrls,
}

impl HttpSource {
    pub fn new(urls: SourceUrls) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ekatte-import")
            .build()
            .map_err(|source| ImportError::FetchTransport {
                url: "http client".to_string(),
                source,
            })?;
        Ok(Self { client, urls })
    }

    /// Fetch `<base>/json` and decode it as an array of records
    pub fn fetch_url(&self, base: &str) -> Result<Vec<Value>> {
        let url = json_url(base);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| ImportError::FetchTransport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::FetchStatus {
                url,
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .map_err(|source| ImportError::FetchTransport {
                url: url.clone(),
                source,
            })?;

        decode_array(&text, &url)
    }
}

impl Source for HttpSource {
    fn fetch(&self, kind: RecordKind) -> Result<Vec<Value>> {
        self.fetch_url(self.urls.url_for(kind))
    }
}

fn json_url(base: &str) -> String {
    format!("{}/json", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_url() {
        assert_eq!(
            json_url("https://www.nsi.bg/nrnm/ekatte/regions"),
            "https://www.nsi.bg/nrnm/ekatte/regions/json"
        );
        assert_eq!(json_url("http://localhost/towns/"), "http://localhost/towns/json");
    }
}
