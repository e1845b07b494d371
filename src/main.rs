use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use card_pay::card_file::read_card;
use card_pay::{Config, HttpGateway, PaymentStatus, Workflow, WorkflowError};

const EXIT_INVALID: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: card-pay <card.json>");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_INVALID);
        }
    };

    let card = match read_card(&path) {
        Ok(card) => card,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(EXIT_INVALID);
        }
    };

    let gateway = match HttpGateway::new(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut workflow = Workflow::new(Arc::new(gateway), &config);

    let mut changes = workflow.state().changes();
    let renderer = tokio::spawn(async move {
        while let Some(status) = changes.next().await {
            info!(status = %status, "payment status");
        }
    });

    if let Err(e) = workflow.fill(&card) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match workflow.submit().await {
        Ok(pid) => info!(pid = %pid, "waiting for payment to settle"),
        Err(WorkflowError::Validation(errors)) => {
            for error in errors.iter() {
                println!("{}: {}", error.field(), error);
            }
            return ExitCode::from(EXIT_INVALID);
        }
        Err(WorkflowError::Pristine) => {
            println!("card file has no fields filled in");
            return ExitCode::from(EXIT_INVALID);
        }
        Err(e) => warn!(reason = %e, "payment was not submitted"),
    }

    let status = workflow.settled().await;
    renderer.abort();

    match status.outcome_message() {
        Some(message) => println!("{message}"),
        None => println!("payment ended in status {status}"),
    }

    if status == PaymentStatus::Succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
