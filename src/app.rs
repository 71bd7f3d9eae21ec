//! Command dispatch for the binary.

use std::error::Error;
use std::sync::Arc;

use crate::cli::{Cli, Commands, SaveArgs, TestArgs};
use slotbox::auth::{MemoryTokenStore, TokenStore};
use slotbox::client::SlotClient;
use slotbox::client::models::SlotDetails;
use slotbox::config::Config;
use slotbox::mapping::Control;
use slotbox::media::MediaFile;
use slotbox::observability::Metrics;
use slotbox::session::{OperationSelection, ProviderSelection};
use slotbox::workflow::{SlotWorkflow, WorkflowError};

type AppResult = Result<(), Box<dyn Error + Send + Sync>>;

pub async fn run(cli: Cli) -> AppResult {
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let tokens = Arc::new(MemoryTokenStore::from_env());
    if !matches!(cli.command, Commands::Providers) {
        // Fail before assembling a request the service would only reject.
        tokens.require_token()?;
    }
    let client = SlotClient::new(&config, tokens)?;
    let mut workflow = SlotWorkflow::new(&config, client, Arc::new(Metrics::new()));

    match cli.command {
        Commands::Providers => {
            print_providers(&workflow);
            Ok(())
        }
        Commands::Show => {
            let details = workflow.bootstrap().await?;
            print_slot(&workflow, &config, &details);
            Ok(())
        }
        Commands::Save(args) => {
            hydrate_existing(&mut workflow, &config).await?;
            apply_edits(&mut workflow, &config, &args)?;
            match workflow.save().await {
                Ok(details) => {
                    println!("slot saved");
                    print_slot(&workflow, &config, &details);
                    Ok(())
                }
                Err(err) => report(err),
            }
        }
        Commands::Test(TestArgs { edits, image }) => {
            hydrate_existing(&mut workflow, &config).await?;
            apply_edits(&mut workflow, &config, &edits)?;
            let file = MediaFile::from_path(&image)?;
            workflow
                .session
                .test_image
                .attach(file, config.slot.upload_limit)?;
            match workflow.test_run().await {
                Ok(ack) => {
                    println!("test run submitted: {ack}");
                    Ok(())
                }
                Err(err) => report(err),
            }
        }
    }
}

/// Pull current server state before applying edits, so a partial edit does
/// not blank out fields the operator did not touch. Skipped when no fetch
/// endpoint is configured.
async fn hydrate_existing(workflow: &mut SlotWorkflow, config: &Config) -> AppResult {
    if config.service.slot_api.is_empty() {
        return Ok(());
    }
    workflow.bootstrap().await?;
    Ok(())
}

fn apply_edits(workflow: &mut SlotWorkflow, config: &Config, args: &SaveArgs) -> AppResult {
    let registry = workflow.registry().clone();

    if let Some(provider) = &args.provider {
        match workflow.session.select_provider(&registry, provider) {
            ProviderSelection::Applied { .. } => {}
            ProviderSelection::Cleared => {
                return Err(format!("unknown provider '{provider}'").into());
            }
        }
    }
    if let Some(operation) = &args.operation {
        match workflow.session.select_operation(&registry, operation) {
            OperationSelection::Applied => {}
            OperationSelection::SnappedBack { warning, .. } => eprintln!("warning: {warning}"),
            OperationSelection::Ignored => {
                return Err(format!("unknown operation '{operation}'").into());
            }
        }
    }

    let draft = &mut workflow.session.draft;
    if let Some(title) = &args.title {
        draft.title = title.clone();
    }
    if let Some(prompt) = &args.prompt {
        draft.prompt = prompt.clone();
    }
    if let Some(aspect_ratio) = &args.aspect_ratio {
        draft.aspect_ratio = aspect_ratio.clone();
    }
    if let Some(resolution) = &args.resolution {
        draft.resolution = resolution.clone();
    }

    if args.remove_template {
        workflow.session.template.remove();
    }
    if let Some(path) = &args.template {
        let file = MediaFile::from_path(path)?;
        workflow
            .session
            .template
            .attach(file, config.slot.upload_limit)?;
    }
    Ok(())
}

fn print_providers(workflow: &SlotWorkflow) {
    for provider in workflow.registry().providers() {
        println!("{} ({})", provider.label, provider.slug);
        for (slug, operation) in provider.operations() {
            let marker = if operation.supported { "" } else { " [unavailable]" };
            println!("  {slug} - {}{marker}", operation.label);
        }
    }
}

fn print_slot(workflow: &SlotWorkflow, config: &Config, details: &SlotDetails) {
    let session = &workflow.session;
    println!("{}", session.header_text(workflow.registry()));
    println!("  slot:       {}", session.meta.id);
    println!("  ingest url: {}", session.ingest_url(&config.service.ingest_base));
    println!("  title:      {}", session.draft.title);
    println!("  prompt:     {}", session.draft.prompt);
    if !session.draft.aspect_ratio.is_empty() {
        println!(
            "  output:     {} {}",
            session.draft.aspect_ratio, session.draft.resolution
        );
    }
    if let Some(id) = session.template.bound_id() {
        println!("  template:   {id}");
    }
    if let Some(result) = details.latest_result() {
        if let Some(url) = &result.download_url {
            println!("  last result: {url}");
        }
        if let Some(expires) = &result.result_expires_at {
            println!("  expires:     {expires}");
        }
    }
}

fn report(err: WorkflowError) -> AppResult {
    if let WorkflowError::Fields(fields) = &err {
        for field in fields {
            match field.control {
                Some(control) => eprintln!(
                    "  {}: {} ({})",
                    control_name(control),
                    field.issue.message,
                    field.issue.field_path
                ),
                None => eprintln!("  {}: {}", field.issue.field_path, field.issue.message),
            }
        }
    }
    Err(err.into())
}

fn control_name(control: Control) -> &'static str {
    match control {
        Control::Title => "title",
        Control::Provider => "provider",
        Control::Operation => "operation",
        Control::Prompt => "prompt",
        Control::AspectRatio => "aspect ratio",
        Control::Resolution => "resolution",
        Control::TemplateMedia => "template image",
        Control::TestImage => "test image",
    }
}
