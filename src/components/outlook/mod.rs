pub mod compose;
pub mod models;
pub mod timezone;
pub mod transport;

pub use compose::{build_meeting_pair, default_body, subject_line, MeetingPair};
pub use models::{CalendarItem, CreateItemEnvelope, FreeBusyType, NotifyMode};
pub use timezone::resolve_timezone;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

use crate::components::storage::Credential;
use crate::error::{config_error, Error, OotoResult, WriteError, WriteFailure};
use reqwest::Method;
use tracing::{error, info};
use url::Url;

/// Path segments of the OWA service, below the configured endpoint
const SERVICE_PATH: [&str; 2] = ["owa", "service.svc"];

/// A single calendar write, built fresh for every submission
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub credential: Credential,
    pub timezone_label: String,
    pub item: CalendarItem,
    pub notify_mode: NotifyMode,
}

/// Issues CreateItem calls against the Outlook web service
pub struct OutlookClient<T: Transport> {
    transport: T,
    service_url: Url,
    server_version: String,
}

impl<T: Transport> OutlookClient<T> {
    pub fn new(transport: T, endpoint: &str, server_version: &str) -> OotoResult<Self> {
        let invalid = || config_error(&format!("Invalid endpoint '{}'", endpoint));
        let mut service_url = Url::parse(endpoint)
            .map_err(|e| config_error(&format!("Invalid endpoint '{}': {}", endpoint, e)))?;
        // Appended below any path the endpoint already carries
        service_url
            .path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(SERVICE_PATH);

        Ok(Self {
            transport,
            service_url,
            server_version: server_version.to_string(),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Frame a write as an HTTP request
    pub fn http_request(&self, request: &WriteRequest) -> HttpRequest {
        let envelope = CreateItemEnvelope::new(
            &self.server_version,
            &request.timezone_label,
            request.item.clone(),
            request.notify_mode,
        );

        HttpRequest {
            method: Method::POST,
            url: self.service_url.to_string(),
            headers: vec![
                ("authorization".to_string(), request.credential.bearer()),
                (
                    "content-type".to_string(),
                    "application/json; charset=utf-8".to_string(),
                ),
                ("action".to_string(), "CreateItem".to_string()),
                (
                    "x-owa-actionname".to_string(),
                    "CreateCalendarItemAction".to_string(),
                ),
            ],
            // Plain derived Serialize on owned data; cannot fail
            body: serde_json::to_value(&envelope).unwrap_or_default(),
        }
    }

    /// Send one write; only 200 and 201 count as created
    pub async fn create_item(&self, request: &WriteRequest) -> Result<(), WriteError> {
        let response = self.transport.send(self.http_request(request)).await;
        match response {
            Ok(HttpResponse { status: 200 | 201, .. }) => {
                info!("Meeting created successfully: {}", request.item.subject);
                Ok(())
            }
            Ok(HttpResponse { status, body }) => {
                error!("Error creating meeting: HTTP {} - {}", status, body);
                Err(WriteError::Rejected { status, body })
            }
            Err(e) => {
                error!("Request error: {}", e);
                Err(e)
            }
        }
    }

    /// Write the notification meeting and the self block concurrently.
    ///
    /// Both writes are awaited. If either fails the whole submission fails, even though the
    /// other may already exist on the server; nothing is rolled back and a resubmission
    /// creates two new items.
    pub async fn submit_ooto(
        &self,
        credential: &Credential,
        timezone_label: &str,
        notification: CalendarItem,
        self_block: CalendarItem,
        notification_mode: NotifyMode,
        self_block_mode: NotifyMode,
    ) -> OotoResult<()> {
        let notification = WriteRequest {
            credential: credential.clone(),
            timezone_label: timezone_label.to_string(),
            item: notification,
            notify_mode: notification_mode,
        };
        let self_block = WriteRequest {
            credential: credential.clone(),
            timezone_label: timezone_label.to_string(),
            item: self_block,
            notify_mode: self_block_mode,
        };

        let (notification_result, self_block_result) = futures::join!(
            self.create_item(&notification),
            self.create_item(&self_block)
        );

        match (notification_result, self_block_result) {
            (Ok(()), Ok(())) => Ok(()),
            (n, s) => {
                let failure = WriteFailure {
                    notification: n.err(),
                    self_block: s.err(),
                };
                if failure.is_partial() {
                    error!("Calendar left half-written: {}", failure);
                }
                Err(Error::PartialOrTotalWriteFailure(failure))
            }
        }
    }

    /// Submit a composed pair: notification mailed to attendees, self block kept silent
    pub async fn submit_pair(
        &self,
        credential: &Credential,
        timezone_label: &str,
        pair: MeetingPair,
    ) -> OotoResult<()> {
        self.submit_ooto(
            credential,
            timezone_label,
            pair.notification,
            pair.self_block,
            NotifyMode::SendToAllAndSaveCopy,
            NotifyMode::SendToNone,
        )
        .await
    }
}
