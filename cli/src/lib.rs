//! Command-line front end shared by the `change-request` and `release-log`
//! binaries.
//!
//! Both binaries take the same options, build an open and a close payload from
//! them, and run the open/close workflow. They differ only in the noun they
//! print and the product name they send in `User-Agent`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use change_request_core::telemetry::init_tracing;
use change_request_core::{
    run_workflow_with, ChangeRequestClient, ClientOptions, CloseRecordInput, OpenRecordInput,
};
use clap::{CommandFactory, FromArgMatches, Parser};
use colored::Colorize;
use serde_json::Value;
use tracing::Level;

/// Per-binary wording and identity.
#[derive(Debug, Clone, Copy)]
pub struct Flavor {
    pub bin: &'static str,
    pub noun: &'static str,
    pub product: &'static str,
}

pub const CHANGE_REQUEST: Flavor = Flavor {
    bin: "change-request",
    noun: "change request",
    product: "ft-change-request",
};

pub const RELEASE_LOG: Flavor = Flavor {
    bin: "release-log",
    noun: "release log",
    product: "ft-release-log",
};

#[derive(Parser, Debug)]
#[command(version, about = "Open and immediately close a change request")]
pub struct Args {
    /// The API key to use when accessing the CR API
    #[arg(short, long, env = "KONSTRUCTOR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// The owner email address
    #[arg(short = 'o', long)]
    pub owner_email: Option<String>,

    /// A short summary of the change
    #[arg(short, long)]
    pub summary: Option<String>,

    /// A short description of the change
    #[arg(short, long)]
    pub description: Option<String>,

    /// File to read the description from, instead of --description
    #[arg(short = 'f', long)]
    pub description_file: Option<PathBuf>,

    /// The reason for the change. Default: "Deployment"
    #[arg(short, long)]
    pub reason: Option<String>,

    /// The category for opening. One of "Major", "Minor", "Significant". Default: "Minor"
    #[arg(short = 'c', long)]
    pub open_category: Option<String>,

    /// The category for closing. One of "Implemented", "Partially Implemented",
    /// "Rejected", "Rolled back", "Cancelled". Default: "Implemented"
    #[arg(short = 'C', long)]
    pub close_category: Option<String>,

    /// The risk profile. One of "Low", "Medium", "High". Default: "Low"
    #[arg(short = 'R', long)]
    pub risk_profile: Option<String>,

    /// The environment the change applies to. One of "Production", "Test",
    /// "Development", "Disaster Recovery". Default: "Test"
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Whether there will be an outage. Sends willThereBeAnOutage as the string
    /// "Yes" (the API takes "Yes"/"No", not a boolean). Default: "No"
    #[arg(short = 'O', long)]
    pub outage: bool,

    /// The service that the change applies to
    #[arg(short = 'S', long)]
    pub service: Option<String>,

    /// The Slack channel to notify
    #[arg(short, long)]
    pub notify_channel: Option<String>,

    /// API host. Default: "cr-api.in.ft.com"
    #[arg(long, env = "CR_API_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "CR_API_SCHEME", hide = true)]
    pub scheme: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Parse process arguments under the binary's own name.
    pub fn parse_for(flavor: &Flavor) -> Self {
        let matches = Args::command()
            .name(flavor.bin)
            .about(format!("Open and immediately close a {}", flavor.noun))
            .get_matches();
        Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }

    pub fn client_options(&self, flavor: &Flavor) -> ClientOptions {
        ClientOptions {
            api_key: self.api_key.clone(),
            host: self.host.clone(),
            scheme: self.scheme.clone(),
            product: Some(flavor.product.to_string()),
        }
    }

    /// The description file, when given, wins over `--description`.
    pub fn open_input(&self) -> Result<OpenRecordInput> {
        let change_description = match &self.description_file {
            Some(path) => Some(fs::read_to_string(path).with_context(|| {
                format!("failed to read description file {}", path.display())
            })?),
            None => self.description.clone(),
        };

        Ok(OpenRecordInput {
            owner_email_address: self.owner_email.clone(),
            summary_of_change: self.summary.clone(),
            change_description,
            reason_for_change_details: self.reason.clone(),
            change_category: self.open_category.clone(),
            risk_profile: self.risk_profile.clone(),
            environment: self.environment.clone(),
            will_there_be_an_outage: self.outage.then(|| "Yes".to_string()),
            resource_one: self.owner_email.clone(),
            service_ids: self.service.clone().map(Value::String),
            notify_channel: self.notify_channel.clone(),
            notify: Some(self.notify_channel.is_some()),
            ..OpenRecordInput::default()
        })
    }

    pub fn close_input(&self) -> CloseRecordInput {
        CloseRecordInput {
            closed_by_email_address: self.owner_email.clone(),
            close_category: self.close_category.clone(),
            notify_channel: self.notify_channel.clone(),
            notify: Some(self.notify_channel.is_some()),
            ..CloseRecordInput::default()
        }
    }
}

pub async fn run(flavor: &Flavor) -> ExitCode {
    let args = Args::parse_for(flavor);
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    init_tracing(args.json, level);

    match execute(flavor, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err).red());
            ExitCode::FAILURE
        }
    }
}

pub async fn execute(flavor: &Flavor, args: &Args) -> Result<()> {
    if args.api_key.is_none() {
        tracing::warn!("no API key given, set KONSTRUCTOR_API_KEY or pass --api-key");
    }
    let client = ChangeRequestClient::new(args.client_options(flavor))
        .context("failed to create HTTP client")?;
    let open = args.open_input()?;
    let close = args.close_input();

    println!("{}", format!("Creating a {}", flavor.noun).cyan().underline());
    let on_opened = |id: &str| {
        println!("{}", format!("Created {} \"{id}\"", flavor.noun).green());
    };
    let outcome = match run_workflow_with(&client, &open, &close, on_opened).await {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(id) = err.open_record_id() {
                eprintln!(
                    "{}",
                    format!("{} \"{id}\" was left open", capitalize(flavor.noun)).yellow()
                );
            }
            return Err(err.into());
        }
    };

    let closed_id = outcome.closed_id.as_deref().unwrap_or(&outcome.opened_id);
    println!("{}", format!("Closed {} \"{closed_id}\"", flavor.noun).green());
    Ok(())
}

/// Join the error chain, dropping causes that repeat the previous message.
pub fn render_error(err: &anyhow::Error) -> String {
    let mut messages: Vec<String> = Vec::new();
    for cause in err.chain() {
        let message = cause.to_string();
        if messages.last() != Some(&message) {
            messages.push(message);
        }
    }
    messages.join(": ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
