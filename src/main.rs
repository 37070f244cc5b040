use clap::Parser;
use outlook_ooto::commands::{AcceptBody, BodyEditor, ConsoleReviewer, OotoWorkflow, ReplaceBody};
use outlook_ooto::components::{HtmlDocument, JsonFileStore, ReqwestTransport};
use outlook_ooto::startup;
use outlook_ooto::utils::time::TimeRange;
use std::path::PathBuf;
use tracing::{error, info};

/// Set Out of Office directly on Outlook
#[derive(Debug, Parser)]
#[command(name = "set_ooto", version)]
struct Args {
    /// First day away (YYYY-MM-DD)
    #[arg(long)]
    start: String,
    /// Last day away (YYYY-MM-DD)
    #[arg(long)]
    end: String,
    /// Time leaving on the first day (HH:MM)
    #[arg(long)]
    start_time: Option<String>,
    /// Time returning on the last day (HH:MM)
    #[arg(long)]
    end_time: Option<String>,
    /// Block whole days; times are ignored
    #[arg(long)]
    all_day: bool,
    /// Client storage exported as a JSON object
    #[arg(long)]
    storage: PathBuf,
    /// Saved Outlook page
    #[arg(long)]
    page: PathBuf,
    /// Plain-text body to send instead of the generated one
    #[arg(long, conflicts_with = "yes")]
    body: Option<PathBuf>,
    /// Send the generated body without review
    #[arg(long)]
    yes: bool,
}

fn time_range(args: &Args) -> miette::Result<TimeRange> {
    Ok(TimeRange::parse(
        &args.start,
        args.start_time.as_deref(),
        &args.end,
        args.end_time.as_deref(),
        args.all_day,
    )?)
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Args::parse();

    // Initialize logging
    startup::init_logging()?;

    info!("Starting Outlook OOTO");

    // Load configuration
    let config = startup::load_config()?;

    let mut store = JsonFileStore::open(&args.storage)?;
    startup::prepare_store(&mut store);

    let markup = tokio::fs::read_to_string(&args.page)
        .await
        .map_err(outlook_ooto::error::Error::from)?;
    let page = HtmlDocument::parse(&markup);

    let range = time_range(&args)?;

    let editor: Box<dyn BodyEditor> = match (&args.body, args.yes) {
        (Some(path), _) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(outlook_ooto::error::Error::from)?;
            Box::new(ReplaceBody::new(text))
        }
        (None, true) => Box::new(AcceptBody),
        (None, false) => Box::new(ConsoleReviewer::stdio()),
    };

    let workflow = OotoWorkflow::new(config, ReqwestTransport::default())?;

    match workflow.run(&store, &page, editor.as_ref(), range).await {
        Ok(outcome) => {
            println!("{}", outcome.message());
            Ok(())
        }
        Err(e) => {
            error!("Error: {:?}", e);
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}
