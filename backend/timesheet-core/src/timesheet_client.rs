// src/timesheet_client.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::session::{Identity, Session, TimesheetScope};
use crate::submission_validation::NewDayEntry;
use crate::timesheet_entry::{EntryId, ProjectId, RawRecord, TimesheetStatus};
use crate::view_filter::FilterOption;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const PENDING_GROUPED_ENDPOINT: &str = "/api/manager/timesheets/pending/grouped";

// --- Error Types ---

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("Session expired or not authorized (Status 401)")]
    Unauthorized,

    // Non-401 HTTP failures
    #[error("Timesheet API error: Status={status}, Message='{message}'")]
    Status { status: StatusCode, message: String },

    // 2xx response carrying `"success": false`
    #[error("Timesheet API rejected the request: {message}")]
    Rejected { message: String },
}

// --- Transport Seam ---

/// Everything the approval workflow needs from the backend.
#[async_trait]
pub trait TimesheetApi: Send + Sync {
    async fn fetch_timesheets(&self, scope: &TimesheetScope) -> Result<Vec<RawRecord>, ApiError>;

    /// Manager view of pending weeks, already grouped by employee, project and week.
    async fn fetch_pending_grouped(&self) -> Result<Vec<RawRecord>, ApiError>;

    async fn fetch_projects(&self) -> Result<Vec<FilterOption>, ApiError>;

    async fn fetch_employees(&self) -> Result<Vec<FilterOption>, ApiError>;

    /// Create one day entry. Returns the id assigned by the backend when it reports one.
    async fn submit_entry(&self, entry: &NewDayEntry) -> Result<Option<EntryId>, ApiError>;

    async fn update_status(
        &self,
        day_id: &str,
        status: TimesheetStatus,
        comments: Option<&str>,
    ) -> Result<(), ApiError>;
}

// --- Request Bodies ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    project_id: &'a ProjectId,
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    hours: Decimal,
    description: Option<&'a str>,
    notes: Option<&'a str>,
}

impl<'a> From<&'a NewDayEntry> for SubmitRequest<'a> {
    fn from(entry: &'a NewDayEntry) -> Self {
        Self {
            project_id: &entry.project_id,
            date: entry.date,
            hours: entry.hours,
            description: entry.notes.as_deref(),
            notes: entry.notes.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusRequest<'a> {
    status: TimesheetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    user: Identity,
}

// --- Endpoint Selection ---

fn projects_endpoint(identity: &Identity) -> &'static str {
    if identity.is_hr() {
        "/api/hr/projects"
    } else if identity.is_manager() {
        "/api/manager/projects"
    } else if identity.is_admin() {
        "/api/admin/projects"
    } else {
        "/api/timesheets/projects"
    }
}

/// Employees have no directory access; `None` means the dropdown falls back to the loaded entries.
fn employees_endpoint(identity: &Identity) -> Option<&'static str> {
    if identity.is_manager() {
        Some("/api/manager/employees")
    } else if identity.is_hr() {
        Some("/api/hr/users")
    } else if identity.is_admin() {
        Some("/api/admin/users")
    } else {
        None
    }
}

// --- Envelope Handling ---

/// Responses arrive either bare or wrapped as `{ "success": .., "data": .., "message": .. }`.
fn unwrap_envelope(body: Value) -> Result<Value, ApiError> {
    match body {
        Value::Object(mut map) => {
            if map.get("success").and_then(Value::as_bool) == Some(false) {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("request failed")
                    .to_string();
                return Err(ApiError::Rejected { message });
            }
            match map.remove("data") {
                Some(data) => Ok(data),
                None => Ok(Value::Object(map)),
            }
        }
        other => Ok(other),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn created_id(data: &Value) -> Option<EntryId> {
    match data.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn join_endpoint(base: &Url, endpoint: &str) -> Result<Url, ApiError> {
    let base = base.as_str().trim_end_matches('/');
    let url = if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    };
    Ok(Url::parse(&url)?)
}

// --- HTTP Client ---

#[derive(Debug, Clone)]
pub struct HttpTimesheetApi {
    http_client: Client,
    base_url: Url,
    session: Session,
}

impl HttpTimesheetApi {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: Url::parse(base_url)?,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Exchange credentials for a bearer token and the identity it belongs to.
    pub async fn login(
        base_url: &str,
        email: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Session, ApiError> {
        let http_client = build_http_client(timeout)?;
        let url = join_endpoint(&Url::parse(base_url)?, "/api/auth/login")?;
        let request = http_client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&LoginRequest { email, password });
        let data = execute(&http_client, request, "login").await?;
        let login: LoginData = serde_json::from_value(data)?;
        info!("Logged in as {} ({})", login.user.email, login.user.role);
        Ok(Session::new(&login.token, login.user))
    }

    fn build_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder, ApiError> {
        let url = join_endpoint(&self.base_url, endpoint)?;
        Ok(self
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, self.session.bearer())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json"))
    }

    async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, ApiError> {
        let data = execute(&self.http_client, request_builder, context_msg).await?;
        serde_json::from_value::<T>(data).map_err(|e| {
            error!("JSON deserialization failed for '{}': {}", context_msg, e);
            ApiError::Json(e)
        })
    }
}

fn build_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

async fn execute(
    http_client: &Client,
    request_builder: RequestBuilder,
    context_msg: &str,
) -> Result<Value, ApiError> {
    let request = request_builder.build().map_err(|e| {
        error!("Request build failed for '{}': {}", context_msg, e);
        ApiError::Request(e)
    })?;
    let request_url = request.url().to_string();
    debug!("Sending request for '{}' to URL: {}", context_msg, request_url);

    let resp = http_client.execute(request).await.map_err(|e| {
        error!("HTTP request execution failed for '{}': {}", context_msg, e);
        ApiError::Request(e)
    })?;
    let status = resp.status();
    info!(
        "Received response for '{}' (URL: {}): Status={}",
        context_msg, request_url, status
    );

    let body = resp.text().await?;
    if !status.is_success() {
        error!(
            "API error for '{}' (URL: {}): Status={}, Body='{}'",
            context_msg, request_url, status, body
        );
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        return Err(ApiError::Status {
            status,
            message: error_message(&body),
        });
    }

    debug!("Raw success response body for '{}': {}", context_msg, body);
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    let parsed: Value = serde_json::from_str(&body)?;
    unwrap_envelope(parsed)
}

#[async_trait]
impl TimesheetApi for HttpTimesheetApi {
    async fn fetch_timesheets(&self, scope: &TimesheetScope) -> Result<Vec<RawRecord>, ApiError> {
        let request = self.build_request(Method::GET, &scope.endpoint())?;
        self.send_and_deserialize(request, "fetch timesheets").await
    }

    async fn fetch_pending_grouped(&self) -> Result<Vec<RawRecord>, ApiError> {
        let request = self.build_request(Method::GET, PENDING_GROUPED_ENDPOINT)?;
        self.send_and_deserialize(request, "fetch pending weeks").await
    }

    async fn fetch_projects(&self) -> Result<Vec<FilterOption>, ApiError> {
        let request = self.build_request(Method::GET, projects_endpoint(&self.session.user))?;
        self.send_and_deserialize(request, "fetch projects").await
    }

    async fn fetch_employees(&self) -> Result<Vec<FilterOption>, ApiError> {
        let Some(endpoint) = employees_endpoint(&self.session.user) else {
            debug!(
                "Role {} has no employee directory, skipping fetch",
                self.session.user.role
            );
            return Ok(Vec::new());
        };
        let request = self.build_request(Method::GET, endpoint)?;
        self.send_and_deserialize(request, "fetch employees").await
    }

    async fn submit_entry(&self, entry: &NewDayEntry) -> Result<Option<EntryId>, ApiError> {
        let request = self
            .build_request(Method::POST, "/api/timesheets")?
            .json(&SubmitRequest::from(entry));
        let data: Value = self.send_and_deserialize(request, "submit entry").await?;
        Ok(created_id(&data))
    }

    async fn update_status(
        &self,
        day_id: &str,
        status: TimesheetStatus,
        comments: Option<&str>,
    ) -> Result<(), ApiError> {
        let endpoint = format!("/api/manager/timesheets/{}/status", day_id);
        let request = self
            .build_request(Method::PUT, &endpoint)?
            .json(&StatusRequest { status, comments });
        let _: Value = self.send_and_deserialize(request, "update status").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn identity(role: &str) -> Identity {
        Identity {
            id: "3".to_string(),
            name: "Mira".to_string(),
            email: "mira@example.com".to_string(),
            role: Role::parse(role),
        }
    }

    #[test]
    fn envelope_is_unwrapped() {
        let wrapped = json!({ "success": true, "data": [{ "id": 1 }], "message": "ok" });
        assert_eq!(unwrap_envelope(wrapped).unwrap(), json!([{ "id": 1 }]));
    }

    #[test]
    fn bare_payloads_pass_through() {
        assert_eq!(unwrap_envelope(json!([1, 2])).unwrap(), json!([1, 2]));
        assert_eq!(
            unwrap_envelope(json!({ "id": 9 })).unwrap(),
            json!({ "id": 9 })
        );
    }

    #[test]
    fn unsuccessful_envelope_is_rejected() {
        let err = unwrap_envelope(json!({ "success": false, "message": "Invalid credentials" }))
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { message } if message == "Invalid credentials"));
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"message":"Forbidden"}"#), "Forbidden");
        assert_eq!(error_message(r#"{"error":"Bad id"}"#), "Bad id");
        assert_eq!(error_message(" gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn created_id_accepts_numbers_and_strings() {
        assert_eq!(created_id(&json!({ "id": 77 })), Some("77".to_string()));
        assert_eq!(created_id(&json!({ "id": "abc" })), Some("abc".to_string()));
        assert_eq!(created_id(&json!({ "id": "" })), None);
        assert_eq!(created_id(&Value::Null), None);
    }

    #[test]
    fn endpoints_join_onto_the_base_url() {
        let base = Url::parse("http://localhost:8081/").unwrap();
        assert_eq!(
            join_endpoint(&base, "/api/timesheets").unwrap().as_str(),
            "http://localhost:8081/api/timesheets"
        );
        assert_eq!(
            join_endpoint(&base, "api/hr/users").unwrap().as_str(),
            "http://localhost:8081/api/hr/users"
        );
    }

    #[test]
    fn directory_endpoints_follow_role() {
        assert_eq!(projects_endpoint(&identity("HR")), "/api/hr/projects");
        assert_eq!(projects_endpoint(&identity("MANAGER")), "/api/manager/projects");
        assert_eq!(projects_endpoint(&identity("EMPLOYEE")), "/api/timesheets/projects");
        assert_eq!(employees_endpoint(&identity("MANAGER")), Some("/api/manager/employees"));
        assert_eq!(employees_endpoint(&identity("ADMIN")), Some("/api/admin/users"));
        assert_eq!(employees_endpoint(&identity("EMPLOYEE")), None);
    }

    #[test]
    fn submit_body_sends_notes_twice_and_hours_as_number() {
        let entry = NewDayEntry {
            project_id: "5".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 7).unwrap(),
            hours: dec!(7.5),
            notes: Some("Kickoff".to_string()),
        };
        let body = serde_json::to_value(SubmitRequest::from(&entry)).unwrap();
        assert_eq!(
            body,
            json!({
                "projectId": "5",
                "date": "2025-04-07",
                "hours": 7.5,
                "description": "Kickoff",
                "notes": "Kickoff"
            })
        );
    }

    #[test]
    fn status_body_omits_absent_comments() {
        let approve = serde_json::to_value(StatusRequest {
            status: TimesheetStatus::Approved,
            comments: None,
        })
        .unwrap();
        assert_eq!(approve, json!({ "status": "APPROVED" }));

        let reject = serde_json::to_value(StatusRequest {
            status: TimesheetStatus::Rejected,
            comments: Some("Wrong project"),
        })
        .unwrap();
        assert_eq!(reject, json!({ "status": "REJECTED", "comments": "Wrong project" }));
    }

    #[test]
    fn directory_rows_accept_numeric_ids() {
        let rows: Vec<FilterOption> =
            serde_json::from_value(json!([{ "id": 5, "name": "Apollo", "code": "AP" }, { "id": "6" }]))
                .unwrap();
        assert_eq!(rows[0].id, "5");
        assert_eq!(rows[0].name.as_deref(), Some("Apollo"));
        assert_eq!(rows[1].name, None);
    }
}
