//! Workflow controller: maps UI actions to backend calls, renders returned
//! Markdown into display regions, and switches between the three views.

use std::sync::{
    atomic::{AtomicU64, AtomicU8, Ordering},
    Arc,
};

use shared::{
    domain::{ContentRegion, ControlId, InputField, UiAction, ViewState},
    protocol::NarrativeContent,
};
use tracing::{debug, info, warn};

use crate::{
    backend::WorkflowBackend,
    busy::{BusyGuard, BusyLocks, DEFAULT_BUSY_INDICATOR},
    error::WorkflowError,
    markdown::MarkdownRenderer,
    surface::{ViewRegistry, WorkflowSurface},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Response rendered and any view transition performed.
    Applied,
    /// Error surfaced to the user; regions and view untouched.
    Failed,
    /// A newer operation started while this one was in flight, or a failure
    /// arrived after the session was reset.
    Discarded,
    /// The triggering control was already busy.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Process,
    Refine,
    Finalize,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Process => "process",
            Operation::Refine => "refine",
            Operation::Finalize => "finalize",
        }
    }

    fn control(self) -> ControlId {
        match self {
            Operation::Process => ControlId::Submit,
            Operation::Refine => ControlId::Refine,
            Operation::Finalize => ControlId::Finalize,
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Operation::Process => "Error processing idea: ",
            Operation::Refine => "Error refining content: ",
            Operation::Finalize => "Error finalizing blog: ",
        }
    }
}

/// Taken when a request starts. `generation` orders requests against each
/// other, `session` only changes on `start_new`.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: u64,
    session: u64,
}

pub struct WorkflowController {
    backend: Arc<dyn WorkflowBackend>,
    surface: Arc<dyn WorkflowSurface>,
    views: ViewRegistry,
    renderer: MarkdownRenderer,
    busy_indicator: String,
    busy: BusyLocks,
    current_view: AtomicU8,
    generation: AtomicU64,
    session: AtomicU64,
}

impl WorkflowController {
    /// Builds the controller and shows the initial view.
    pub fn new(
        backend: Arc<dyn WorkflowBackend>,
        surface: Arc<dyn WorkflowSurface>,
        views: ViewRegistry,
        renderer: MarkdownRenderer,
    ) -> Self {
        let controller = Self {
            backend,
            surface,
            views,
            renderer,
            busy_indicator: DEFAULT_BUSY_INDICATOR.to_string(),
            busy: BusyLocks::default(),
            current_view: AtomicU8::new(ViewState::Initial.as_u8()),
            generation: AtomicU64::new(0),
            session: AtomicU64::new(0),
        };
        controller.activate(ViewState::Initial);
        controller
    }

    pub fn with_busy_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.busy_indicator = indicator.into();
        self
    }

    pub fn current_view(&self) -> ViewState {
        ViewState::from_u8(self.current_view.load(Ordering::SeqCst)).unwrap_or_default()
    }

    pub fn is_busy(&self, control: ControlId) -> bool {
        self.busy.is_held(control)
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    /// Runs the operation bound to `action`.
    pub async fn dispatch(&self, action: UiAction) -> OperationOutcome {
        match action {
            UiAction::SubmitIdea => self.submit_idea().await,
            UiAction::Refine => self.submit_refinement().await,
            UiAction::Finalize => self.finalize().await,
            UiAction::StartNew => {
                self.start_new();
                OperationOutcome::Applied
            }
        }
    }

    pub async fn submit_idea(&self) -> OperationOutcome {
        let operation = Operation::Process;
        let Some(_busy) = self.acquire(operation) else {
            return OperationOutcome::Ignored;
        };
        let ticket = self.begin_request();
        let idea = self.surface.input_value(InputField::Idea);
        info!(
            operation = operation.name(),
            generation = ticket.generation,
            chars = idea.chars().count(),
            "submitting idea"
        );

        match self.backend.process(&idea).await {
            Ok(content) => {
                if !self.is_current(ticket) {
                    return self.discard(operation, ticket);
                }
                self.write_narrative(&content);
                self.activate(ViewState::Result);
                info!(
                    operation = operation.name(),
                    generation = ticket.generation,
                    "narrative applied"
                );
                OperationOutcome::Applied
            }
            Err(err) => self.fail(operation, ticket, &err),
        }
    }

    /// Same contract as [`Self::submit_idea`] but stays on the current view
    /// and clears the refinement field on success.
    pub async fn submit_refinement(&self) -> OperationOutcome {
        let operation = Operation::Refine;
        let Some(_busy) = self.acquire(operation) else {
            return OperationOutcome::Ignored;
        };
        let ticket = self.begin_request();
        let refinement = self.surface.input_value(InputField::Refinement);
        info!(
            operation = operation.name(),
            generation = ticket.generation,
            chars = refinement.chars().count(),
            "submitting refinement"
        );

        match self.backend.refine(&refinement).await {
            Ok(content) => {
                if !self.is_current(ticket) {
                    return self.discard(operation, ticket);
                }
                self.write_narrative(&content);
                self.surface.set_input_value(InputField::Refinement, "");
                info!(
                    operation = operation.name(),
                    generation = ticket.generation,
                    "refinement applied"
                );
                OperationOutcome::Applied
            }
            Err(err) => self.fail(operation, ticket, &err),
        }
    }

    pub async fn finalize(&self) -> OperationOutcome {
        let operation = Operation::Finalize;
        let Some(_busy) = self.acquire(operation) else {
            return OperationOutcome::Ignored;
        };
        let ticket = self.begin_request();
        info!(
            operation = operation.name(),
            generation = ticket.generation,
            "finalizing"
        );

        match self.backend.finalize().await {
            Ok(post) => {
                if !self.is_current(ticket) {
                    return self.discard(operation, ticket);
                }
                let html = self.renderer.render(&post.blog_post);
                self.surface
                    .set_region_html(ContentRegion::BlogContent, &html);
                self.activate(ViewState::Blog);
                info!(
                    operation = operation.name(),
                    generation = ticket.generation,
                    "blog post applied"
                );
                OperationOutcome::Applied
            }
            Err(err) => self.fail(operation, ticket, &err),
        }
    }

    /// Clears both inputs and returns to the initial view. Responses still in
    /// flight are discarded when they arrive.
    pub fn start_new(&self) {
        self.session.fetch_add(1, Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.surface.set_input_value(InputField::Idea, "");
        self.surface.set_input_value(InputField::Refinement, "");
        self.activate(ViewState::Initial);
        info!(generation, "started new session");
    }

    /// Hides every other view, then shows `target`. Idempotent.
    pub fn activate(&self, target: ViewState) {
        for view in ViewState::ALL {
            if view != target {
                self.views.get(view).hide();
            }
        }
        self.views.get(target).show();
        self.current_view.store(target.as_u8(), Ordering::SeqCst);
        debug!(view = target.element_id(), "view activated");
    }

    fn acquire(&self, operation: Operation) -> Option<BusyGuard<'_>> {
        let guard = self.busy.acquire(
            operation.control(),
            self.surface.as_ref(),
            &self.busy_indicator,
        );
        if guard.is_none() {
            debug!(
                operation = operation.name(),
                "control busy; ignoring repeated activation"
            );
        }
        guard
    }

    fn begin_request(&self) -> Ticket {
        Ticket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            session: self.session.load(Ordering::SeqCst),
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    fn write_narrative(&self, content: &NarrativeContent) {
        // Render everything before the first write.
        let rendered = content
            .by_region()
            .map(|(region, source)| (region, self.renderer.render(source)));
        for (region, html) in &rendered {
            self.surface.set_region_html(*region, html);
        }
    }

    fn discard(&self, operation: Operation, ticket: Ticket) -> OperationOutcome {
        warn!(
            operation = operation.name(),
            generation = ticket.generation,
            latest = self.generation.load(Ordering::SeqCst),
            "discarding stale response"
        );
        OperationOutcome::Discarded
    }

    fn fail(
        &self,
        operation: Operation,
        ticket: Ticket,
        err: &WorkflowError,
    ) -> OperationOutcome {
        // Failures write nothing; only a session reset silences them.
        if self.session.load(Ordering::SeqCst) != ticket.session {
            warn!(
                operation = operation.name(),
                generation = ticket.generation,
                kind = err.kind(),
                error = %err,
                "request from a previous session failed; not surfaced"
            );
            return OperationOutcome::Discarded;
        }

        warn!(
            operation = operation.name(),
            generation = ticket.generation,
            kind = err.kind(),
            error = %err,
            "operation failed"
        );
        self.surface
            .notify(&format!("{}{err}", operation.failure_prefix()));
        OperationOutcome::Failed
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
