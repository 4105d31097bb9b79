//! Message webhook development harness.
//!
//! Stands in for the chat server during development and manual testing:
//!
//! 1. **Wire observability**: configure `tracing-subscriber` with a pretty or
//!    JSON formatter and, when an OTLP endpoint is given, an OpenTelemetry
//!    exporter. Every `tracing` event emitted by the workspace crates flows
//!    through these layers.
//! 2. **Start the plugin**: exactly as the host would, against the property
//!    file in `--working-dir`, registered on an in-process
//!    [`interceptor::InterceptorChain`].
//! 3. **Replay packets**: read JSON lines from `--input` (or stdin) and push
//!    each one through the chain.
//! 4. **Stop the plugin**: unregister and release the dispatcher.
//!
//! Input lines look like:
//!
//! ```json
//! {"packet":{"kind":"message","from":"alice@example.com/phone","to":"bob@example.com","type":"chat","body":"hi"},"incoming":true,"processed":true}
//! ```

mod replay;
mod telemetry;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use interceptor::InterceptorChain;
use plugin::MessageWebhookPlugin;
use tracing::info;

use crate::telemetry::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "webhook-harness",
    version,
    about = "Replay chat packets through the message webhook plugin"
)]
struct Args {
    /// Directory holding the plugin's property file.
    #[arg(long, env = "MESSAGE_WEBHOOK_HOME")]
    working_dir: PathBuf,

    /// JSON-lines packet file. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// OTLP collector endpoint for span export.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let telemetry = telemetry::init(args.log_format, args.otlp_endpoint.as_deref())?;

    let result = run(&args);
    telemetry.shutdown();
    result
}

fn run(args: &Args) -> anyhow::Result<()> {
    let chain = Arc::new(InterceptorChain::new());
    let mut plugin = MessageWebhookPlugin::start(&args.working_dir, chain.clone())
        .with_context(|| format!("starting plugin in {}", args.working_dir.display()))?;

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stats = replay::replay(input, &chain);
    plugin.stop();

    let stats = stats.context("reading packet input")?;
    info!(
        replayed = stats.replayed,
        skipped = stats.skipped,
        rejected = stats.rejected,
        "Replay finished"
    );
    Ok(())
}
