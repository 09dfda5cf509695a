//! Per-control busy locks released on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};

use shared::domain::ControlId;
use tracing::debug;

use crate::surface::WorkflowSurface;

pub const DEFAULT_BUSY_INDICATOR: &str = "<div class=\"spinner\"></div>";

#[derive(Default)]
pub struct BusyLocks {
    held: [AtomicBool; 3],
}

impl BusyLocks {
    pub fn is_held(&self, control: ControlId) -> bool {
        self.held[control.index()].load(Ordering::SeqCst)
    }

    /// Disables `control` and appends `indicator` to its label. Returns `None`
    /// if the control is already held.
    pub fn acquire<'a>(
        &'a self,
        control: ControlId,
        surface: &'a dyn WorkflowSurface,
        indicator: &str,
    ) -> Option<BusyGuard<'a>> {
        self.held[control.index()]
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;

        let original_label = surface.control_label(control);
        surface.set_control_enabled(control, false);
        surface.set_control_markup(control, &format!("{original_label}{indicator}"));
        debug!(control = control.element_id(), "busy lock acquired");

        Some(BusyGuard {
            locks: self,
            surface,
            control,
            original_label,
        })
    }
}

/// Held for the lifetime of one request; dropping it restores the control.
#[must_use = "dropping the guard releases the busy lock immediately"]
pub struct BusyGuard<'a> {
    locks: &'a BusyLocks,
    surface: &'a dyn WorkflowSurface,
    control: ControlId,
    original_label: String,
}

impl BusyGuard<'_> {
    pub fn original_label(&self) -> &str {
        &self.original_label
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_control_enabled(self.control, true);
        self.surface
            .set_control_label(self.control, &self.original_label);
        self.locks.held[self.control.index()].store(false, Ordering::SeqCst);
        debug!(control = self.control.element_id(), "busy lock released");
    }
}
