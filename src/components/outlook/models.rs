use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

const CALENDAR_ITEM_TYPE: &str = "CalendarItem:#Exchange";
const ATTENDEE_TYPE: &str = "AttendeeType:#Exchange";

/// Whether the item blocks the owner's availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FreeBusyType {
    Free,
    #[serde(rename = "OOF")]
    Oof,
}

/// Whether the backend mails the item to its attendees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotifyMode {
    SendToAllAndSaveCopy,
    SendToNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sensitivity {
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyType {
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemBody {
    pub body_type: BodyType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mailbox {
    pub email_address: String,
    pub routing_type: String,
    pub mailbox_type: String,
    pub original_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attendee {
    #[serde(rename = "__type")]
    pub type_name: &'static str,
    pub mailbox: Mailbox,
}

impl Attendee {
    /// SMTP attendee displayed under its own address
    pub fn smtp(address: &str) -> Self {
        Self {
            type_name: ATTENDEE_TYPE,
            mailbox: Mailbox {
                email_address: address.to_string(),
                routing_type: "SMTP".to_string(),
                mailbox_type: "Mailbox".to_string(),
                original_display_name: address.to_string(),
            },
        }
    }
}

/// Calendar entry as the CreateItem action expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalendarItem {
    #[serde(rename = "__type")]
    pub type_name: &'static str,
    pub subject: String,
    pub body: ItemBody,
    pub sensitivity: Sensitivity,
    pub is_response_requested: bool,
    #[serde(serialize_with = "serialize_utc")]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "serialize_utc")]
    pub end: DateTime<Utc>,
    pub free_busy_type: FreeBusyType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_attendees: Vec<Attendee>,
}

impl CalendarItem {
    pub fn new(
        subject: &str,
        body_html: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        free_busy_type: FreeBusyType,
        required_attendees: Vec<Attendee>,
    ) -> Self {
        Self {
            type_name: CALENDAR_ITEM_TYPE,
            subject: subject.to_string(),
            body: ItemBody {
                body_type: BodyType::Html,
                value: body_html.to_string(),
            },
            sensitivity: Sensitivity::Normal,
            is_response_requested: false,
            start,
            end,
            free_busy_type,
            required_attendees,
        }
    }
}

/// `2024-06-10T00:00:00.000Z`
fn serialize_utc<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeZoneDefinition {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeZoneContext {
    pub time_zone_definition: TimeZoneDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestHeader {
    pub request_server_version: String,
    pub time_zone_context: TimeZoneContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateItemBody {
    pub items: Vec<CalendarItem>,
    pub send_meeting_invitations: NotifyMode,
}

/// Full CreateItem envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateItemEnvelope {
    pub header: RequestHeader,
    pub body: CreateItemBody,
}

impl CreateItemEnvelope {
    pub fn new(
        server_version: &str,
        timezone_label: &str,
        item: CalendarItem,
        notify_mode: NotifyMode,
    ) -> Self {
        Self {
            header: RequestHeader {
                request_server_version: server_version.to_string(),
                time_zone_context: TimeZoneContext {
                    time_zone_definition: TimeZoneDefinition {
                        id: timezone_label.to_string(),
                    },
                },
            },
            body: CreateItemBody {
                items: vec![item],
                send_meeting_invitations: notify_mode,
            },
        }
    }
}
