use crate::commands::review::BodyEditor;
use crate::components::outlook::{
    build_meeting_pair, default_body, resolve_timezone, OutlookClient, Transport,
};
use crate::components::page::{Document, IdentityExtractor};
use crate::components::storage::{find_token, KeyValueStore, TokenQuery};
use crate::config::Config;
use crate::error::{config_error, OotoResult};
use crate::utils::time::{parse_timezone, TimeRange};
use chrono_tz::Tz;
use rust_i18n::t;
use tracing::info;

/// How a submission ended when nothing went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both items were written
    Created { subject: String },
    /// The user backed out at the review step; nothing was sent
    Cancelled,
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Created { subject } => t!("ooto_created", subject = subject).to_string(),
            SubmitOutcome::Cancelled => t!("ooto_cancelled").to_string(),
        }
    }
}

/// Sets OOTO end to end: credential, identity, body review, then the paired writes
pub struct OotoWorkflow<T: Transport> {
    config: Config,
    client: OutlookClient<T>,
    extractor: IdentityExtractor,
    token_query: TokenQuery,
    timezone: Tz,
}

impl<T: Transport> OotoWorkflow<T> {
    pub fn new(config: Config, transport: T) -> OotoResult<Self> {
        let client = OutlookClient::new(transport, &config.endpoint, &config.server_version)?;
        let extractor = IdentityExtractor::new(&config.org_domain)?;
        let token_query = TokenQuery::new(config.token_key_markers.iter().cloned());
        let timezone = parse_timezone(&config.timezone)
            .map_err(|_| config_error(&format!("Unknown TIMEZONE '{}'", config.timezone)))?;

        Ok(Self {
            config,
            client,
            extractor,
            token_query,
            timezone,
        })
    }

    pub fn client(&self) -> &OutlookClient<T> {
        &self.client
    }

    /// Run one submission against the current store and page
    pub async fn run(
        &self,
        store: &dyn KeyValueStore,
        page: &dyn Document,
        editor: &dyn BodyEditor,
        range: TimeRange,
    ) -> OotoResult<SubmitOutcome> {
        // Fail before bothering the user if there is no token at all
        find_token(store, &self.token_query)?;

        let identity = self.extractor.extract_identity(page)?;
        let utc = range.to_utc(self.timezone)?;

        let generated = default_body(&identity.display_name);
        let Some(body) = editor.review(&generated).await? else {
            info!("OOTO cancelled at review, nothing sent");
            return Ok(SubmitOutcome::Cancelled);
        };

        // The token may have rotated while the user was reviewing
        let credential = find_token(store, &self.token_query)?;
        let timezone_label = resolve_timezone(self.timezone.name());

        let pair = build_meeting_pair(&identity, &range, utc, &body, &self.config.recipients);
        let subject = pair.notification.subject.clone();

        info!("Creating OOTO meetings: {}", subject);
        self.client
            .submit_pair(&credential, timezone_label, pair)
            .await?;

        Ok(SubmitOutcome::Created { subject })
    }
}
