// libs/scheduling-cell/src/services/calendar.rs
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{BusyInterval, CalendarError};

/// The calendar collaborator contract. Vendor details stay behind this seam;
/// the core only needs busy intervals and event CRUD.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_busy_intervals(&self, date: NaiveDate) -> Result<Vec<BusyInterval>, CalendarError>;

    async fn create_event(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        subject: &str,
        attendee_email: &str,
    ) -> Result<String, CalendarError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError>;

    async fn update_event(
        &self,
        event_id: &str,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<(), CalendarError>;
}

pub struct HttpCalendarClient {
    client: Client,
    base_url: String,
    api_key: String,
    calendar_id: String,
}

impl HttpCalendarClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.calendar_base_url.clone(),
            api_key: config.calendar_api_key.clone(),
            calendar_id: config.calendar_id.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, CalendarError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making calendar request to {}", url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Calendar API error ({}): {}", status, error_text);

            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))
    }
}

#[derive(Debug, serde::Deserialize)]
struct CreatedEvent {
    event_id: String,
}

#[async_trait]
impl CalendarApi for HttpCalendarClient {
    async fn list_busy_intervals(&self, date: NaiveDate) -> Result<Vec<BusyInterval>, CalendarError> {
        let path = format!("/calendars/{}/busy?date={}", self.calendar_id, date);
        self.request(Method::GET, &path, None).await
    }

    async fn create_event(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        subject: &str,
        attendee_email: &str,
    ) -> Result<String, CalendarError> {
        let path = format!("/calendars/{}/events", self.calendar_id);
        let body = json!({
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339(),
            "subject": subject,
            "attendee_email": attendee_email,
        });

        let created: CreatedEvent = self.request(Method::POST, &path, Some(body)).await?;
        Ok(created.event_id)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let path = format!("/calendars/{}/events/{}", self.calendar_id, event_id);
        let _: Value = self.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn update_event(
        &self,
        event_id: &str,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<(), CalendarError> {
        let path = format!("/calendars/{}/events/{}", self.calendar_id, event_id);
        let body = json!({
            "start": new_start.to_rfc3339(),
            "end": new_end.to_rfc3339(),
        });

        let _: Value = self.request(Method::PATCH, &path, Some(body)).await?;
        Ok(())
    }
}
