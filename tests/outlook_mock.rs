use async_trait::async_trait;
use outlook_ooto::commands::{AcceptBody, BodyEditor, OotoWorkflow, ReplaceBody, SubmitOutcome};
use outlook_ooto::components::outlook::{HttpRequest, HttpResponse, Transport};
use outlook_ooto::components::{HtmlDocument, MemoryStore};
use outlook_ooto::config::{Config, RecipientMode};
use outlook_ooto::error::{Error, OotoResult, WriteError};
use outlook_ooto::utils::time::{parse_date, parse_time_of_day, TimeRange};
use std::sync::{Arc, Mutex};

const TOKEN_KEY: &str =
    "uid.tid-login.windows.net-msal.accesstoken-client-tid-outlook.office.com/calendars.readwrite";

const PAGE: &str = r#"<html><body>
    <div id="mectrl_currentAccount_primary">Doe, Jane</div>
    <div id="mectrl_currentAccount_secondary">jane.doe@org.example</div>
</body></html>"#;

/// Mock transport recording every request, answering by item availability
#[derive(Clone, Default)]
struct MockTransport {
    free_status: u16,
    oof_status: u16,
    sent: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    fn new(free_status: u16, oof_status: u16) -> Self {
        Self {
            free_status,
            oof_status,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn sent_with(&self, free_busy: &str) -> HttpRequest {
        self.sent()
            .into_iter()
            .find(|r| r.body["Body"]["Items"][0]["FreeBusyType"] == free_busy)
            .expect("request for item not sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WriteError> {
        let status = if request.body["Body"]["Items"][0]["FreeBusyType"] == "Free" {
            self.free_status
        } else {
            self.oof_status
        };
        self.sent.lock().unwrap().push(request);
        Ok(HttpResponse {
            status,
            body: String::new(),
        })
    }
}

/// Editor that backs out, like pressing Cancel in the review dialog
struct CancelBody;

#[async_trait]
impl BodyEditor for CancelBody {
    async fn review(&self, _body_html: &str) -> OotoResult<Option<String>> {
        Ok(None)
    }
}

fn config() -> Config {
    let mut config = Config::new("team@org.example", "org.example");
    config.timezone = "Asia/Kolkata".to_string();
    config
}

fn store() -> MemoryStore {
    vec![
        ("theme", "dark".to_string()),
        (TOKEN_KEY, r#"{"credentialType":"AccessToken","secret":"token-123"}"#.to_string()),
    ]
    .into_iter()
    .collect()
}

fn all_day_range() -> TimeRange {
    TimeRange::from_inputs(
        parse_date("2024-06-10").unwrap(),
        None,
        parse_date("2024-06-12").unwrap(),
        None,
        true,
    )
    .unwrap()
}

async fn run(
    config: Config,
    transport: MockTransport,
    store: &MemoryStore,
    page: &str,
    editor: &dyn BodyEditor,
) -> OotoResult<SubmitOutcome> {
    let workflow = OotoWorkflow::new(config, transport).unwrap();
    let page = HtmlDocument::parse(page);
    workflow.run(store, &page, editor, all_day_range()).await
}

#[tokio::test]
async fn test_successful_submission() {
    let transport = MockTransport::new(201, 200);
    let outcome = run(config(), transport.clone(), &store(), PAGE, &AcceptBody)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Created {
            subject: "OOTO | Doe, Jane | (6/10/2024 - 6/12/2024)".to_string()
        }
    );
    assert_eq!(transport.sent().len(), 2);

    let notification = transport.sent_with("Free");
    let self_block = transport.sent_with("OOF");

    for request in [&notification, &self_block] {
        assert_eq!(request.url, "https://outlook.office.com/owa/service.svc");
        assert_eq!(request.header("authorization"), Some("Bearer token-123"));
        assert_eq!(
            request.body["Header"]["TimeZoneContext"]["TimeZoneDefinition"]["Id"],
            "India Standard Time"
        );
        let item = &request.body["Body"]["Items"][0];
        assert_eq!(item["Subject"], "OOTO | Doe, Jane | (6/10/2024 - 6/12/2024)");
        // Midnight in Kolkata is 18:30 UTC the day before
        assert_eq!(item["Start"], "2024-06-09T18:30:00.000Z");
        assert_eq!(item["End"], "2024-06-12T18:29:59.000Z");
    }

    assert_eq!(notification.body["Body"]["SendMeetingInvitations"], "SendToAllAndSaveCopy");
    assert_eq!(
        notification.body["Body"]["Items"][0]["RequiredAttendees"][0]["Mailbox"]["EmailAddress"],
        "team@org.example"
    );
    assert_eq!(self_block.body["Body"]["SendMeetingInvitations"], "SendToNone");
    assert!(self_block.body["Body"]["Items"][0].get("RequiredAttendees").is_none());
}

#[tokio::test]
async fn test_self_invite_variant() {
    let mut config = config();
    config.recipients.mode = RecipientMode::SelfInvite;
    let transport = MockTransport::new(200, 200);
    run(config, transport.clone(), &store(), PAGE, &AcceptBody)
        .await
        .unwrap();

    let self_block = transport.sent_with("OOF");
    assert_eq!(
        self_block.body["Body"]["Items"][0]["RequiredAttendees"][0]["Mailbox"]["EmailAddress"],
        "jane.doe@org.example"
    );
}

#[tokio::test]
async fn test_edited_body_is_sent() {
    let transport = MockTransport::new(200, 200);
    let editor = ReplaceBody::new("Away until Thursday.\nAsk Sam.");
    run(config(), transport.clone(), &store(), PAGE, &editor)
        .await
        .unwrap();

    for request in transport.sent() {
        assert_eq!(
            request.body["Body"]["Items"][0]["Body"]["Value"],
            "Away until Thursday.<br>Ask Sam."
        );
    }
}

#[tokio::test]
async fn test_partial_failure_fails_the_submission() {
    let transport = MockTransport::new(201, 500);
    let result = run(config(), transport.clone(), &store(), PAGE, &AcceptBody).await;

    match result {
        Err(Error::PartialOrTotalWriteFailure(failure)) => {
            assert!(failure.is_partial());
            assert!(failure.notification.is_none());
            assert!(matches!(
                failure.self_block,
                Some(WriteError::Rejected { status: 500, .. })
            ));
        }
        other => panic!("expected write failure, got {:?}", other),
    }
    // The notification meeting was still created server-side
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn test_cancel_sends_nothing() {
    let transport = MockTransport::new(200, 200);
    let outcome = run(config(), transport.clone(), &store(), PAGE, &CancelBody)
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Cancelled);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_missing_token_fails_before_sending() {
    let transport = MockTransport::new(200, 200);
    let store: MemoryStore = vec![("theme", "dark")].into_iter().collect();
    let result = run(config(), transport.clone(), &store, PAGE, &AcceptBody).await;

    assert!(matches!(result, Err(Error::CredentialNotFound)));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_missing_email_fails_before_sending() {
    let transport = MockTransport::new(200, 200);
    let result = run(
        config(),
        transport.clone(),
        &store(),
        "<html><body><div>Doe, Jane</div></body></html>",
        &AcceptBody,
    )
    .await;

    assert!(matches!(result, Err(Error::EmailNotFound)));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_unmapped_zone_sends_utc_label() {
    let mut config = config();
    config.timezone = "America/Guatemala".to_string();
    let transport = MockTransport::new(200, 200);
    let range = TimeRange::from_inputs(
        parse_date("2024-06-10").unwrap(),
        parse_time_of_day("09:00"),
        parse_date("2024-06-10").unwrap(),
        parse_time_of_day("13:00"),
        false,
    )
    .unwrap();

    let workflow = OotoWorkflow::new(config, transport.clone()).unwrap();
    let page = HtmlDocument::parse(PAGE);
    workflow
        .run(&store(), &page, &AcceptBody, range)
        .await
        .unwrap();

    let request = transport.sent_with("Free");
    assert_eq!(
        request.body["Header"]["TimeZoneContext"]["TimeZoneDefinition"]["Id"],
        "UTC"
    );
    // Guatemala is UTC-6 all year
    assert_eq!(request.body["Body"]["Items"][0]["Start"], "2024-06-10T15:00:00.000Z");
}

#[test]
fn test_unknown_configured_timezone_is_rejected() {
    let mut config = config();
    config.timezone = "Nowhere/Special".to_string();
    assert!(OotoWorkflow::new(config, MockTransport::new(200, 200)).is_err());
}
