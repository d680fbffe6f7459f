//! API client for communicating with the attendance REST API.
//!
//! This module provides the `ApiClient` struct for reading the athlete,
//! group and schedule lists and for submitting mutations.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{Athlete, AthleteDraft, Group, Schedule, ScheduleDraft, ScheduleRecord};
use crate::store::RemoteStore;

use super::ApiError;

/// A resource addressed through the `path` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Athletes,
    Groups,
    Schedules,
    CheckIn,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Athletes => "athletes",
            Resource::Groups => "groups",
            Resource::Schedules => "schedules",
            Resource::CheckIn => "checkin",
        }
    }
}

/// API client for the attendance backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<Url>,
}

impl ApiClient {
    /// Create a new API client for the endpoint at `base_url`.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, resource: Resource) -> RequestBuilder {
        self.client
            .request(method, self.base_url.as_ref().clone())
            .query(&[("path", resource.as_str())])
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        let text = response.text().await?;
        debug!(resource = what, bytes = text.len(), "Response received");

        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", what, e)))
    }

    /// Send a request whose body only acknowledges success. The body is
    /// drained and ignored.
    async fn acknowledge(&self, request: RequestBuilder, what: &str) -> Result<(), ApiError> {
        let response = Self::check_response(request.send().await?).await?;
        let _ = response.bytes().await?;
        debug!(action = what, "Request acknowledged");
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, resource: Resource) -> Result<T, ApiError> {
        self.fetch(self.request(reqwest::Method::GET, resource), resource.as_str())
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<T, ApiError> {
        self.fetch(
            self.request(reqwest::Method::POST, resource).json(body),
            resource.as_str(),
        )
        .await
    }

    async fn put<B: Serialize + ?Sized>(&self, resource: Resource, body: &B) -> Result<(), ApiError> {
        self.acknowledge(
            self.request(reqwest::Method::PUT, resource).json(body),
            resource.as_str(),
        )
        .await
    }
}

impl RemoteStore for ApiClient {
    async fn fetch_athletes(&self) -> Result<Vec<Athlete>, ApiError> {
        self.get(Resource::Athletes).await
    }

    async fn fetch_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.get(Resource::Groups).await
    }

    async fn fetch_schedules(&self) -> Result<Vec<Schedule>, ApiError> {
        let rows: Vec<ScheduleRecord> = self.get(Resource::Schedules).await?;
        let total = rows.len();
        let schedules: Vec<Schedule> = rows
            .into_iter()
            .filter_map(ScheduleRecord::into_schedule)
            .collect();
        if schedules.len() != total {
            debug!(dropped = total - schedules.len(), "Skipped deleted schedule rows");
        }
        Ok(schedules)
    }

    async fn create_athlete(&self, draft: &AthleteDraft) -> Result<Athlete, ApiError> {
        self.post(Resource::Athletes, draft).await
    }

    async fn update_athlete(&self, athlete: &Athlete) -> Result<(), ApiError> {
        self.put(Resource::Athletes, athlete).await
    }

    async fn update_group(&self, group: &Group) -> Result<(), ApiError> {
        self.put(Resource::Groups, group).await
    }

    async fn check_in(&self, athlete_id: i64) -> Result<(), ApiError> {
        let body = serde_json::json!({ "athleteId": athlete_id });
        self.acknowledge(
            self.request(reqwest::Method::POST, Resource::CheckIn).json(&body),
            Resource::CheckIn.as_str(),
        )
        .await
    }

    async fn create_schedule(&self, draft: &ScheduleDraft) -> Result<Schedule, ApiError> {
        self.post(Resource::Schedules, draft).await
    }

    async fn delete_schedule(&self, id: i64) -> Result<(), ApiError> {
        let request = self
            .request(reqwest::Method::DELETE, Resource::Schedules)
            .query(&[("id", id)]);
        self.acknowledge(request, "delete schedule").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthleteStatus, Attendance};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api", server.uri()), None).expect("Failed to build client")
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_athletes_uses_path_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("path", "athletes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Alexey Smirnov", "group": "Boxers", "attendance": 95, "status": "active", "lastVisit": "today"},
                {"id": 2, "name": "Maria Petrova", "group": "Wrestlers", "attendance": 88, "status": "rest", "lastVisit": "yesterday"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let athletes = client_for(&server).await.fetch_athletes().await.unwrap();
        assert_eq!(athletes.len(), 2);
        assert_eq!(athletes[1].status, AthleteStatus::Rest);
    }

    #[tokio::test]
    async fn test_fetch_schedules_skips_deleted_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("path", "schedules"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "group": "Boxers", "day": "Monday", "time": "18:00", "duration": "90 min"},
                {"id": 2, "group": null, "day": "Friday", "time": "10:00", "duration": "60 min"}
            ])))
            .mount(&server)
            .await;

        let schedules = client_for(&server).await.fetch_schedules().await.unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].id, 1);
    }

    #[tokio::test]
    async fn test_create_athlete_posts_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("path", "athletes"))
            .and(body_json(json!({"name": "Ivan Sokolov", "group": "Wrestlers", "status": "active"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(
                {"id": 7, "name": "Ivan Sokolov", "group": "Wrestlers", "attendance": 0, "status": "active", "lastVisit": "never"}
            )))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .await
            .create_athlete(&AthleteDraft::new("Ivan Sokolov", "Wrestlers"))
            .await
            .unwrap();
        assert_eq!(created.id, 7);
        assert_eq!(created.attendance, Attendance::default());
        assert_eq!(created.last_visit, "never");
    }

    #[tokio::test]
    async fn test_check_in_sends_athlete_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("path", "checkin"))
            .and(body_json(json!({"athleteId": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).await.check_in(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_group_ignores_ack_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(query_param("path", "groups"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .expect(1)
            .mount(&server)
            .await;

        let group = Group {
            id: 3,
            name: "Crossfit".into(),
            count: 15,
            color: "bg-accent".into(),
        };
        client_for(&server).await.update_group(&group).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_schedule_sends_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(query_param("path", "schedules"))
            .and(query_param("id", "12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).await.delete_schedule(12).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_groups().await.unwrap_err();
        match err {
            ApiError::ServerError(body) => assert_eq!(body, "database unavailable"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("path", "groups"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"oops\": true}"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_groups().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }
}
