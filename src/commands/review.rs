use crate::error::{other_error, OotoResult};
use crate::utils::html::{from_plain_text, to_plain_text};
use async_trait::async_trait;
use rust_i18n::t;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;

/// What the user chose to do with the generated body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyDecision {
    Cancel,
    SendWithoutEdit,
    /// Replacement body as plain text
    SaveAndSend(String),
}

impl BodyDecision {
    /// Final HTML body, or `None` when the user backed out
    pub fn apply(self, original_html: &str) -> Option<String> {
        match self {
            BodyDecision::Cancel => None,
            BodyDecision::SendWithoutEdit => Some(original_html.to_string()),
            BodyDecision::SaveAndSend(text) => Some(from_plain_text(&text)),
        }
    }
}

/// Lets the user review the body before anything is sent.
///
/// May wait on the user indefinitely.
#[async_trait]
pub trait BodyEditor: Send + Sync {
    async fn review(&self, body_html: &str) -> OotoResult<Option<String>>;
}

/// Sends the body as generated
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptBody;

#[async_trait]
impl BodyEditor for AcceptBody {
    async fn review(&self, body_html: &str) -> OotoResult<Option<String>> {
        Ok(BodyDecision::SendWithoutEdit.apply(body_html))
    }
}

/// Replaces the body with prepared plain text
#[derive(Debug, Clone)]
pub struct ReplaceBody {
    text: String,
}

impl ReplaceBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl BodyEditor for ReplaceBody {
    async fn review(&self, body_html: &str) -> OotoResult<Option<String>> {
        Ok(BodyDecision::SaveAndSend(self.text.clone()).apply(body_html))
    }
}

/// Interactive review on a line-based console
pub struct ConsoleReviewer<R, W> {
    io: Mutex<(R, W)>,
}

impl ConsoleReviewer<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleReviewer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    async fn decide(&self, plain_text: &str) -> OotoResult<BodyDecision> {
        let mut io = self.io.lock().await;
        let (reader, writer) = &mut *io;

        writer
            .write_all(format!("\n{}\n\n", plain_text).as_bytes())
            .await?;

        loop {
            writer
                .write_all(format!("{} ", t!("review_prompt")).as_bytes())
                .await?;
            writer.flush().await?;

            let mut choice = String::new();
            if reader.read_line(&mut choice).await? == 0 {
                return Ok(BodyDecision::Cancel);
            }

            match choice.trim().to_ascii_lowercase().as_str() {
                "s" | "send" => return Ok(BodyDecision::SendWithoutEdit),
                "c" | "cancel" => return Ok(BodyDecision::Cancel),
                "e" | "edit" => {
                    writer
                        .write_all(format!("{}\n", t!("review_edit_hint")).as_bytes())
                        .await?;
                    writer.flush().await?;
                    let text = read_until_dot(reader).await?;
                    return Ok(BodyDecision::SaveAndSend(text));
                }
                _ => continue,
            }
        }
    }
}

async fn read_until_dot<R: AsyncBufRead + Unpin>(reader: &mut R) -> OotoResult<String> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(other_error("Input ended before the body was finished"));
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "." {
            return Ok(lines.join("\n"));
        }
        lines.push(line.to_string());
    }
}

#[async_trait]
impl<R, W> BodyEditor for ConsoleReviewer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn review(&self, body_html: &str) -> OotoResult<Option<String>> {
        let decision = self.decide(&to_plain_text(body_html)).await?;
        Ok(decision.apply(body_html))
    }
}
