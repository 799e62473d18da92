use crate::dispatch::{DeliveryError, Dispatcher, Event, Transport};
use crate::notify::{NullNotifier, OperatorNotifier, WebhookNotifier};
use crate::opt::{Commands, Run, Validate};
use crate::store::SessionStore;
use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use etap_config::QuestionBank;
use etap_utils::loader::Loader;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod console;
mod dispatch;
mod notify;
mod opt;
mod render;
mod store;

struct ConsoleTransport;

#[async_trait]
impl Transport for ConsoleTransport {
    async fn deliver(&self, _respondent: &str, text: String) -> Result<(), DeliveryError> {
        println!("{text}");
        Ok(())
    }
}

async fn load_bank(config: &Path) -> Result<QuestionBank> {
    let loader = Loader::new(config.to_path_buf());
    let battery = etap_config::battery::load(&loader).await?;
    let interpretations = etap_config::interpretation::load(&loader).await?;
    let bank = QuestionBank {
        battery,
        interpretations,
    };
    bank.validate()?;
    Ok(bank)
}

async fn run(opt: Run) -> Result<()> {
    etap_utils::tracing::setup(
        &etap_utils::tracing::TracingConfig::builder()
            .package(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .env(opt.env.clone())
            .build(),
    )?;

    let bank = Arc::new(load_bank(&opt.config).await?);
    tracing::info!(battery_id = bank.battery.battery_id, "question bank loaded");

    let notifier: Arc<dyn OperatorNotifier> = match opt.operator_webhook {
        Some(endpoint) => {
            tracing::info!(%endpoint, "operator webhook configured");
            Arc::new(WebhookNotifier::new(endpoint)?)
        }
        None => Arc::new(NullNotifier),
    };

    let dispatcher = Arc::new(Dispatcher::new(
        bank,
        SessionStore::new(),
        Arc::new(ConsoleTransport),
        notifier,
    ));

    let (events, receiver) = mpsc::channel::<Event>(16);
    let shutdown = CancellationToken::new();
    let dispatch_task = tokio::spawn(dispatch::run(dispatcher, receiver, shutdown.clone()));

    console::run(events, shutdown).await?;
    dispatch_task.await?;
    Ok(())
}

async fn validate(opt: Validate) -> Result<()> {
    etap_utils::tracing::setup(
        &etap_utils::tracing::TracingConfig::builder()
            .package(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .build(),
    )?;
    let bank = load_bank(&opt.config).await?;
    println!(
        "battery \"{}\" is valid: {} screening, {} stage blocks, {} idealization, {} interview questions; {} interpreted stages",
        bank.battery.battery_id,
        bank.battery.screening.len(),
        bank.battery.stages.len(),
        bank.battery.idealization.len(),
        bank.battery.interview.len(),
        bank.interpretations.stages.len(),
    );
    Ok(())
}

fn main() -> Result<()> {
    let main = async {
        let opt = opt::Cli::parse();

        match opt.command {
            Commands::Run(o) => run(o).await?,
            Commands::Validate(o) => validate(o).await?,
        }
        Ok(())
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(main)
}
