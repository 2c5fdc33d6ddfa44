use serde::de::DeserializeOwned;

use crate::{
    error::{JobIconsError, JobIconsResult},
    model::{ClassJobDetail, ClassJobList, ClassJobListing, SubEntityDetail},
};

pub const DEFAULT_BASE_URL: &str = "https://xivapi.com";

/// The kind of sub-entity linked from a class/job detail response. Doubles
/// as the API endpoint segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubEntityKind {
    Action,
    CraftAction,
    Trait,
}

impl SubEntityKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::CraftAction => "CraftAction",
            Self::Trait => "Trait",
        }
    }
}

/// The metadata API surface the fetcher consumes. A trait so the batch
/// logic can run against a canned implementation in tests.
pub trait IconApi {
    /// One request for the full class/job list. The API serves it as a
    /// single page.
    fn list_class_jobs(&self) -> JobIconsResult<Vec<ClassJobListing>>;

    /// Fetches the detail endpoint a listing points at via its `Url` field.
    fn class_job_detail(&self, url: &str) -> JobIconsResult<ClassJobDetail>;

    fn sub_entity_detail(&self, kind: SubEntityKind, id: u32) -> JobIconsResult<SubEntityDetail>;

    /// Raw bytes of an icon, addressed by the API-relative path found in a
    /// metadata response.
    fn icon_bytes(&self, api_path: &str) -> JobIconsResult<Vec<u8>>;
}

/// Blocking GET wrapper over the metadata API. No authentication, no retry;
/// non-200 statuses and malformed JSON surface as `Api` errors.
pub struct XivApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl XivApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, api_path: &str) -> JobIconsResult<T> {
        let url = self.join(api_path);
        let resp = self
            .http
            .get(&url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| JobIconsError::api(format!("GET {url}: {err}")))?;
        resp.json()
            .map_err(|err| JobIconsError::api(format!("parse JSON from {url}: {err}")))
    }

    fn join(&self, api_path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = api_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl IconApi for XivApiClient {
    fn list_class_jobs(&self) -> JobIconsResult<Vec<ClassJobListing>> {
        let list: ClassJobList = self.get_json("/ClassJob")?;
        Ok(list.results)
    }

    fn class_job_detail(&self, url: &str) -> JobIconsResult<ClassJobDetail> {
        self.get_json(url)
    }

    fn sub_entity_detail(&self, kind: SubEntityKind, id: u32) -> JobIconsResult<SubEntityDetail> {
        self.get_json(&format!("/{}/{id}", kind.endpoint()))
    }

    fn icon_bytes(&self, api_path: &str) -> JobIconsResult<Vec<u8>> {
        let url = self.join(api_path);
        let resp = self
            .http
            .get(&url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| JobIconsError::api(format!("GET {url}: {err}")))?;
        let bytes = resp
            .bytes()
            .map_err(|err| JobIconsError::api(format!("read body of {url}: {err}")))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_normalizes_slashes() {
        let client = XivApiClient::new("https://xivapi.com/");
        assert_eq!(client.join("/ClassJob"), "https://xivapi.com/ClassJob");
        assert_eq!(client.join("cj/1.png"), "https://xivapi.com/cj/1.png");
    }

    #[test]
    fn sub_entity_kind_endpoints() {
        assert_eq!(SubEntityKind::Action.endpoint(), "Action");
        assert_eq!(SubEntityKind::CraftAction.endpoint(), "CraftAction");
        assert_eq!(SubEntityKind::Trait.endpoint(), "Trait");
    }

    #[test]
    fn transport_failures_are_api_errors() {
        // An unparseable URL fails in the request builder, before any
        // network traffic.
        let client = XivApiClient::new("not a base url");
        let err = client.list_class_jobs().unwrap_err();
        assert!(err.to_string().contains("api error:"));

        let err = client.icon_bytes("/cj/1.png").unwrap_err();
        assert!(err.to_string().contains("api error:"));
    }
}
