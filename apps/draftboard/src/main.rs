use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    HttpWorkflowBackend, MarkdownRenderer, MemorySurface, MemoryViews, OperationOutcome,
    WorkflowController, WorkflowSurface,
};
use shared::domain::{ContentRegion, InputField, UiAction};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{Command, HELP};
use config::{load_settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(
    name = "draftboard",
    about = "Turn an idea into a refined draft and then a blog post"
)]
struct Args {
    /// Backend origin; overrides config and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Run non-interactively, starting from this idea.
    #[arg(long)]
    idea: Option<String>,
    #[arg(long = "refine", value_name = "TEXT", requires = "idea")]
    refinements: Vec<String>,
    #[arg(long, requires = "idea")]
    finalize: bool,
}

struct Session {
    controller: WorkflowController,
    surface: Arc<MemorySurface>,
}

impl Session {
    async fn run(&self, action: UiAction) -> OperationOutcome {
        let outcome = self.controller.dispatch(action).await;
        for message in self.surface.take_notifications() {
            eprintln!("{message}");
        }
        outcome
    }

    fn print_view(&self) {
        let view = self.controller.current_view();
        println!("== {} ==", view.element_id());
        for region in ContentRegion::shown_in(view) {
            println!("<!-- {} -->", region.element_id());
            print!("{}", self.surface.region_html(*region).unwrap_or_default());
        }
    }
}

async fn run_scripted(
    session: &Session,
    idea: String,
    refinements: Vec<String>,
    finalize: bool,
) -> Result<()> {
    session.surface.set_input_value(InputField::Idea, &idea);

    let mut steps = vec![(UiAction::SubmitIdea, None)];
    steps.extend(
        refinements
            .into_iter()
            .map(|text| (UiAction::Refine, Some(text))),
    );
    if finalize {
        steps.push((UiAction::Finalize, None));
    }

    for (action, refinement) in steps {
        if let Some(text) = refinement {
            session
                .surface
                .set_input_value(InputField::Refinement, &text);
        }
        let outcome = session.run(action).await;
        if outcome != OperationOutcome::Applied {
            bail!("{action:?} did not complete ({outcome:?})");
        }
    }

    session.print_view();
    Ok(())
}

async fn run_interactive(session: &Session) -> Result<()> {
    eprintln!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match &command {
            Command::Idea(text) => session.surface.set_input_value(InputField::Idea, text),
            Command::Refine(text) => session
                .surface
                .set_input_value(InputField::Refinement, text),
            Command::Show => {
                session.print_view();
                continue;
            }
            Command::Help => {
                eprintln!("{HELP}");
                continue;
            }
            Command::Quit => break,
            Command::Finalize | Command::New => {}
        }

        if let Some(action) = command.action() {
            if session.run(action).await == OperationOutcome::Applied {
                session.print_view();
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    info!(
        server_url = %settings.server_url,
        timeout = ?settings.request_timeout(),
        "starting draftboard"
    );

    let backend =
        HttpWorkflowBackend::with_timeout(&settings.server_url, settings.request_timeout())?;
    let surface = Arc::new(MemorySurface::new());
    let views = MemoryViews::default();
    let controller = WorkflowController::new(
        Arc::new(backend),
        surface.clone(),
        views.registry(),
        MarkdownRenderer::new(settings.markdown),
    )
    .with_busy_indicator(settings.busy_indicator.clone());
    let session = Session {
        controller,
        surface,
    };

    match args.idea {
        Some(idea) => run_scripted(&session, idea, args.refinements, args.finalize).await,
        None => run_interactive(&session).await,
    }
}
