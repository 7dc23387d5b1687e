//! REST client for the monitor endpoints.

use crate::checkins::{parse_link_header, Pagination};
use crate::error::{ApiError, Result};
use crate::form::SubmitFailure;
use crate::model::{CheckIn, CurrentUser, Environment, Member, Monitor, Project, Team};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Raw `Link` header, when the endpoint paginates.
    pub link: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// Abstraction over the HTTP transport so endpoints can be tested without a network.
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;

    fn send_json(&self, method: Method, url: &str, body: &JsonValue) -> Result<HttpResponse>;
}

pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
    token: Option<String>,
}

impl ReqwestHttpClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Http(format!("building client: {e}")))?;
        Ok(Self { client, token })
    }

    fn finish(
        &self,
        label: &str,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<HttpResponse> {
        let req = match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        };
        let response = req
            .send()
            .map_err(|e| ApiError::Http(format!("{label} failed: {e}")))?;
        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .map_err(|e| ApiError::Http(format!("Reading response body: {e}")))?;
        tracing::debug!("{label} -> {status} ({} bytes)", body.len());
        Ok(HttpResponse { status, body, link })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        tracing::debug!("GET {url}");
        self.finish(&format!("GET {url}"), self.client.get(url))
    }

    fn send_json(&self, method: Method, url: &str, body: &JsonValue) -> Result<HttpResponse> {
        tracing::debug!("{} {url}", method.as_str());
        let req = match method {
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };
        self.finish(&format!("{} {url}", method.as_str()), req.json(body))
    }
}

/// Endpoints the form and check-in views need, scoped to one organization.
#[derive(Clone)]
pub struct MonitorApi {
    base_url: String,
    organization: String,
    per_page: u32,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for MonitorApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorApi")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .finish()
    }
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    if !response.is_success() {
        return Err(ApiError::Rejected {
            status: response.status,
            body: serde_json::from_str(&response.body).ok(),
        });
    }
    Ok(serde_json::from_str(&response.body)?)
}

impl MonitorApi {
    pub fn new(
        base_url: &str,
        organization: &str,
        per_page: u32,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            organization: organization.to_string(),
            per_page,
            http,
        }
    }

    fn org_url(&self, rest: &str) -> String {
        format!(
            "{}/api/0/organizations/{}/{}",
            self.base_url, self.organization, rest
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url)?;
        parse_body(&response)
    }

    pub fn current_user(&self) -> Result<CurrentUser> {
        self.get_json(&format!("{}/api/0/users/me/", self.base_url))
    }

    pub fn projects(&self) -> Result<Vec<Project>> {
        self.get_json(&self.org_url("projects/"))
    }

    pub fn environments(&self) -> Result<Vec<String>> {
        let envs: Vec<Environment> = self.get_json(&self.org_url("environments/"))?;
        Ok(envs.into_iter().map(|e| e.name).collect())
    }

    pub fn teams(&self) -> Result<Vec<Team>> {
        self.get_json(&self.org_url("teams/"))
    }

    pub fn members(&self) -> Result<Vec<Member>> {
        self.get_json(&self.org_url("members/"))
    }

    pub fn monitor(&self, slug: &str) -> Result<Monitor> {
        self.get_json(&self.org_url(&format!("monitors/{slug}/")))
    }

    pub fn checkins(
        &self,
        slug: &str,
        cursor: Option<&str>,
    ) -> Result<(Vec<CheckIn>, Pagination)> {
        let raw = self.org_url(&format!("monitors/{slug}/checkins/"));
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| ApiError::Http(format!("invalid URL {raw}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("per_page", &self.per_page.to_string());
            // cursors are opaque and may carry reserved characters
            if let Some(c) = cursor {
                query.append_pair("cursor", c);
            }
        }
        let response = self.http.get(url.as_str())?;
        let items = parse_body(&response)?;
        let pagination = response
            .link
            .as_deref()
            .map(parse_link_header)
            .unwrap_or_default();
        Ok((items, pagination))
    }

    /// Create (`existing_slug == None`) or update a monitor.
    pub fn save_monitor(
        &self,
        existing_slug: Option<&str>,
        body: &JsonValue,
    ) -> std::result::Result<Monitor, SubmitFailure> {
        let (method, url) = match existing_slug {
            Some(slug) => (Method::Put, self.org_url(&format!("monitors/{slug}/"))),
            None => (Method::Post, self.org_url("monitors/")),
        };
        let outcome = self
            .http
            .send_json(method, &url, body)
            .and_then(|r| parse_body(&r));
        outcome.map_err(submit_failure)
    }
}

/// Split a failed save into inline validation errors and everything else.
pub fn submit_failure(err: ApiError) -> SubmitFailure {
    match err {
        ApiError::Rejected {
            status: 400,
            body: Some(body @ JsonValue::Object(_)),
        } => SubmitFailure::Validation(body),
        ApiError::Rejected {
            status,
            body: Some(body),
        } => match body.get("detail").and_then(|d| d.as_str()) {
            Some(detail) => SubmitFailure::Other(detail.to_string()),
            None => SubmitFailure::Other(format!("Request rejected with status {status}")),
        },
        other => SubmitFailure::Other(other.to_string()),
    }
}
