//! Confirm Bot Example
//!
//! A confirmation prompt driven from the console instead of a gateway. Each
//! line typed on stdin becomes one interaction:
//!
//! ```text
//! click confirm                  press the Confirm button
//! click cancel                   press the Cancel button
//! click reason                   open the "reason" modal
//! submit reason_form reason=...  submit the modal
//! quit                           end the stream
//! ```
//!
//! Responses are printed as the JSON a real host would send.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package confirm-bot -- --work-ms 2500
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use futures::{Stream, stream};
use rivet::prelude::*;
use rivet::core::{ApiResult, InteractionResponse, SubmittedField};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// The message the prompt is "attached" to.
const PROMPT_MESSAGE: Snowflake = Snowflake(1000);

#[derive(Parser, Debug)]
#[command(about = "Console-driven confirmation prompt")]
struct Args {
    /// Configuration file (defaults to rivet.toml in the current directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long the Confirm callback works before answering. Values above
    /// the autodefer grace period show the deferral followed by a followup.
    #[arg(long, default_value_t = 500)]
    work_ms: u64,

    /// Prompt inactivity timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

// ============================================================================
// Console host
// ============================================================================

/// Interaction whose responses are printed instead of sent.
struct ConsoleInteraction {
    data: InteractionData,
}

impl ConsoleInteraction {
    fn print(&self, what: &str, body: &impl serde::Serialize) {
        match serde_json::to_string(body) {
            Ok(json) => println!("<- [{}] {what}: {json}", self.data.id),
            Err(e) => error!(error = %e, "Failed to render {what}"),
        }
    }
}

#[async_trait]
impl Interaction for ConsoleInteraction {
    fn data(&self) -> &InteractionData {
        &self.data
    }

    async fn create_response(&self, response: InteractionResponse) -> ApiResult<()> {
        self.print("response", &response);
        Ok(())
    }

    async fn create_followup(&self, message: MessagePayload) -> ApiResult<()> {
        self.print("followup", &message);
        Ok(())
    }

    async fn edit_original(&self, message: MessagePayload) -> ApiResult<()> {
        self.print("edit", &message);
        Ok(())
    }
}

/// Parses one console line; `Ok(None)` ends the stream.
fn parse_line(line: &str, id: u64) -> Result<Option<InteractionData>> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("click") => {
            let custom_id = words.next().context("usage: click <custom_id>")?;
            Ok(Some(
                InteractionData::component(id, custom_id)
                    .message(PROMPT_MESSAGE)
                    .user(42u64),
            ))
        }
        Some("submit") => {
            let custom_id = words
                .next()
                .context("usage: submit <modal_id> <input>=<value>...")?;
            let fields = words
                .map(|pair| {
                    pair.split_once('=')
                        .map(|(k, v)| SubmittedField::new(k, v))
                        .with_context(|| format!("expected <input>=<value>, got '{pair}'"))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(
                InteractionData::modal_submit(id, custom_id, fields).user(42u64),
            ))
        }
        Some("quit") => Ok(None),
        Some(other) => bail!("unknown command '{other}'"),
        None => bail!("empty line"),
    }
}

/// Turns stdin lines into interactions.
fn console_interactions() -> impl Stream<Item = BoxedInteraction> {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    stream::unfold((lines, 1u64), |(mut lines, mut next_id)| async move {
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    return None;
                }
            };
            match parse_line(&line, next_id) {
                Ok(Some(data)) => {
                    next_id += 1;
                    let interaction: BoxedInteraction = Arc::new(ConsoleInteraction { data });
                    return Some((interaction, (lines, next_id)));
                }
                Ok(None) => return None,
                Err(e) => eprintln!("{e:#}"),
            }
        }
    })
}

// ============================================================================
// Prompt
// ============================================================================

struct PromptHooks;

#[async_trait]
impl ViewHooks for PromptHooks {
    async fn check(&self, ctx: &ViewContext) -> bool {
        ctx.user_id() == Snowflake(42)
    }

    async fn on_timeout(&self, view: &View) -> Result<()> {
        warn!(session = %view.id(), "Prompt timed out without an answer");
        Ok(())
    }
}

fn reason_modal() -> Result<Modal> {
    let modal = Modal::builder("Why?")
        .custom_id("reason_form")
        .text_input(
            "reason",
            TextInput::new("Reason")
                .paragraph()
                .placeholder("Tell us what changed")
                .max_length(200),
        )
        .on_submit(|ctx: ModalContext| async move {
            let reason = ctx.value("reason").unwrap_or("(none)").to_string();
            info!(%reason, "Reason submitted");
            ctx.respond(MessagePayload::text(format!("Noted: {reason}")).ephemeral(true))
                .await?;
            Ok(())
        })
        .build()?;
    Ok(modal)
}

fn prompt(work: Duration, timeout: Duration) -> Result<View> {
    let view = View::builder()
        .hooks(PromptHooks)
        .timeout(Some(timeout))
        .item(
            Item::from(Button::success().label("Confirm")).custom_id("confirm"),
            move |ctx, _| async move {
                tokio::time::sleep(work).await;
                ctx.respond(MessagePayload::text("Confirmed.")).await?;
                ctx.view().stop();
                Ok(())
            },
        )
        .item(
            Item::from(Button::danger().label("Cancel")).custom_id("cancel"),
            |ctx, _| async move {
                ctx.view().disable_all();
                let rows = ctx.view().build();
                ctx.edit_response(MessagePayload::text("Cancelled.").components(rows))
                    .await?;
                ctx.view().stop();
                Ok(())
            },
        )
        .item(
            Item::from(Button::secondary().label("Give a reason"))
                .custom_id("reason")
                .row(1),
            |ctx, _| async move {
                ctx.respond_with_modal(&reason_modal()?).await?;
                Ok(())
            },
        )
        .build()?;
    Ok(view)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = RivetRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build()?;

    runtime.client().on_unhandled_component(|ctx| async move {
        warn!(custom_id = %ctx.custom_id(), "Nobody is listening for this component");
        if let Err(e) = ctx
            .respond(MessagePayload::text("This prompt has expired.").ephemeral(true))
            .await
        {
            error!(error = %e, "Failed to answer stale interaction");
        }
    });

    let view = prompt(
        Duration::from_millis(args.work_ms),
        Duration::from_secs(args.timeout_secs),
    )?;
    runtime.client().start_view(&view, PROMPT_MESSAGE)?;
    println!(
        "-> message {PROMPT_MESSAGE}: {}",
        serde_json::to_string(&view.build())?
    );

    let stats = runtime.serve(console_interactions()).await?;
    info!(
        handled = stats.handled,
        unhandled = stats.unhandled,
        rejected = stats.check_failed,
        "Done"
    );
    Ok(())
}
