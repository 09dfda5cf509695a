//! Client-side core of the idea → draft → blog workflow.

pub mod backend;
pub mod busy;
pub mod controller;
pub mod error;
pub mod markdown;
pub mod surface;

pub use backend::{HttpWorkflowBackend, WorkflowBackend};
pub use busy::{BusyGuard, BusyLocks, DEFAULT_BUSY_INDICATOR};
pub use controller::{OperationOutcome, WorkflowController};
pub use error::WorkflowError;
pub use markdown::{MarkdownRenderer, RenderOptions};
pub use surface::{
    ControlSnapshot, MemorySurface, MemoryView, MemoryViews, ViewHandle, ViewRegistry,
    WorkflowSurface,
};

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod http_tests;
