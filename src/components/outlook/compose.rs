use super::models::{Attendee, CalendarItem, FreeBusyType};
use crate::components::page::Identity;
use crate::config::{RecipientConfig, RecipientMode};
use crate::utils::time::{format_calendar_date, TimeRange};
use chrono::{DateTime, Utc};

/// The two items written for one OOTO submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingPair {
    /// Free meeting that tells the team
    pub notification: CalendarItem,
    /// OOF block on the owner's calendar
    pub self_block: CalendarItem,
}

/// `OOTO | <name> | (<start date> - <end date>)`
pub fn subject_line(display_name: &str, range: &TimeRange) -> String {
    format!(
        "OOTO | {} | ({} - {})",
        display_name,
        format_calendar_date(range.start_date()),
        format_calendar_date(range.end_date())
    )
}

/// Email body offered to the user before anything is sent
pub fn default_body(display_name: &str) -> String {
    format!(
        "Hello Team,<br><br>\n\
         I will be out of office on the scheduled dates with no access to outlook, slack and chime.<br><br>\n\
         For project related queries, please reach out to my (enter supervisor login @).<br><br>\n\
         Regards,<br>\n\
         {}<br>\n\
         =====================================================",
        display_name
    )
}

/// Build the notification meeting and the self block.
///
/// `utc` is `range` already converted to UTC; the subject uses the local calendar dates.
pub fn build_meeting_pair(
    identity: &Identity,
    range: &TimeRange,
    utc: (DateTime<Utc>, DateTime<Utc>),
    body_html: &str,
    recipients: &RecipientConfig,
) -> MeetingPair {
    let subject = subject_line(&identity.display_name, range);
    let (start, end) = utc;

    let notification = CalendarItem::new(
        &subject,
        body_html,
        start,
        end,
        FreeBusyType::Free,
        vec![Attendee::smtp(&recipients.notification_address)],
    );

    let self_attendees = match recipients.mode {
        RecipientMode::NoInvite => Vec::new(),
        RecipientMode::SelfInvite => vec![Attendee::smtp(&identity.email)],
    };
    let self_block = CalendarItem::new(
        &subject,
        body_html,
        start,
        end,
        FreeBusyType::Oof,
        self_attendees,
    );

    MeetingPair {
        notification,
        self_block,
    }
}
