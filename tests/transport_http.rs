use outlook_ooto::components::outlook::{CalendarItem, FreeBusyType, NotifyMode};
use outlook_ooto::components::{Credential, OutlookClient, ReqwestTransport};
use outlook_ooto::error::{Error, WriteError};
use chrono::{TimeZone, Utc};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(kind: FreeBusyType) -> CalendarItem {
    CalendarItem::new(
        "OOTO | Doe, Jane | (6/10/2024 - 6/10/2024)",
        "Hello Team",
        Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 10, 23, 59, 59).unwrap(),
        kind,
        Vec::new(),
    )
}

async fn submit(server: &MockServer) -> Result<(), Error> {
    let client = OutlookClient::new(ReqwestTransport::default(), &server.uri(), "Exchange2013")
        .expect("client");
    client
        .submit_ooto(
            &Credential::new("token-123"),
            "UTC",
            item(FreeBusyType::Free),
            item(FreeBusyType::Oof),
            NotifyMode::SendToAllAndSaveCopy,
            NotifyMode::SendToNone,
        )
        .await
}

#[tokio::test]
async fn test_both_writes_reach_the_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/owa/service.svc"))
        .and(header("authorization", "Bearer token-123"))
        .and(header("action", "CreateItem"))
        .and(header("x-owa-actionname", "CreateCalendarItemAction"))
        .and(body_partial_json(serde_json::json!({
            "Body": { "SendMeetingInvitations": "SendToAllAndSaveCopy" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/owa/service.svc"))
        .and(body_partial_json(serde_json::json!({
            "Body": { "SendMeetingInvitations": "SendToNone" }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    submit(&server).await.expect("both writes succeed");
}

#[tokio::test]
async fn test_rejected_write_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "Body": { "SendMeetingInvitations": "SendToAllAndSaveCopy" }
        })))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "Body": { "SendMeetingInvitations": "SendToNone" }
        })))
        .respond_with(ResponseTemplate::new(500).set_body_string("ErrorInternalServerError"))
        .mount(&server)
        .await;

    match submit(&server).await {
        Err(Error::PartialOrTotalWriteFailure(failure)) => {
            assert_eq!(failure.notification, None);
            assert_eq!(
                failure.self_block,
                Some(WriteError::Rejected {
                    status: 500,
                    body: "ErrorInternalServerError".to_string()
                })
            );
        }
        other => panic!("expected write failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_failure() {
    // Nothing listens on port 1
    let client = OutlookClient::new(ReqwestTransport::default(), "http://127.0.0.1:1", "Exchange2013")
        .expect("client");
    let result = client
        .submit_ooto(
            &Credential::new("token-123"),
            "UTC",
            item(FreeBusyType::Free),
            item(FreeBusyType::Oof),
            NotifyMode::SendToAllAndSaveCopy,
            NotifyMode::SendToNone,
        )
        .await;

    match result {
        Err(Error::PartialOrTotalWriteFailure(failure)) => {
            assert!(matches!(failure.notification, Some(WriteError::Transport(_))));
            assert!(matches!(failure.self_block, Some(WriteError::Transport(_))));
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
}
