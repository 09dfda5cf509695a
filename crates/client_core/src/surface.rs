//! UI capabilities the controller drives, plus an in-memory implementation.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use shared::domain::{ContentRegion, ControlId, InputField, ViewState};

pub trait WorkflowSurface: Send + Sync {
    fn input_value(&self, field: InputField) -> String;
    fn set_input_value(&self, field: InputField, value: &str);
    fn set_region_html(&self, region: ContentRegion, html: &str);
    /// Plain-text label, as the user reads it.
    fn control_label(&self, control: ControlId) -> String;
    fn set_control_label(&self, control: ControlId, label: &str);
    /// Replaces the control's display with markup (label plus progress indicator).
    fn set_control_markup(&self, control: ControlId, markup: &str);
    fn set_control_enabled(&self, control: ControlId, enabled: bool);
    /// Blocking notification; returns once the user has acknowledged it.
    fn notify(&self, message: &str);
}

pub trait ViewHandle: Send + Sync {
    /// Removes the hidden marker and plays the entrance cue.
    fn show(&self);
    fn hide(&self);
}

#[derive(Clone)]
pub struct ViewRegistry {
    initial: Arc<dyn ViewHandle>,
    result: Arc<dyn ViewHandle>,
    blog: Arc<dyn ViewHandle>,
}

impl ViewRegistry {
    pub fn new(
        initial: Arc<dyn ViewHandle>,
        result: Arc<dyn ViewHandle>,
        blog: Arc<dyn ViewHandle>,
    ) -> Self {
        Self {
            initial,
            result,
            blog,
        }
    }

    pub fn get(&self, view: ViewState) -> &Arc<dyn ViewHandle> {
        match view {
            ViewState::Initial => &self.initial,
            ViewState::Result => &self.result,
            ViewState::Blog => &self.blog,
        }
    }
}

#[derive(Default)]
pub struct MemoryView {
    visible: AtomicBool,
    entrances: AtomicU32,
}

impl MemoryView {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// How many times the entrance cue has played.
    pub fn entrances(&self) -> u32 {
        self.entrances.load(Ordering::SeqCst)
    }
}

impl ViewHandle for MemoryView {
    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
        self.entrances.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MemoryViews {
    pub initial: Arc<MemoryView>,
    pub result: Arc<MemoryView>,
    pub blog: Arc<MemoryView>,
}

impl MemoryViews {
    pub fn registry(&self) -> ViewRegistry {
        ViewRegistry::new(
            self.initial.clone(),
            self.result.clone(),
            self.blog.clone(),
        )
    }

    pub fn get(&self, view: ViewState) -> &MemoryView {
        match view {
            ViewState::Initial => &self.initial,
            ViewState::Result => &self.result,
            ViewState::Blog => &self.blog,
        }
    }

    pub fn visible(&self) -> Vec<ViewState> {
        ViewState::ALL
            .into_iter()
            .filter(|view| self.get(*view).is_visible())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub label: String,
    /// Set while the display carries markup instead of the plain label.
    pub markup: Option<String>,
    pub enabled: bool,
}

struct SurfaceState {
    inputs: HashMap<InputField, String>,
    regions: HashMap<ContentRegion, String>,
    controls: HashMap<ControlId, ControlSnapshot>,
    notifications: Vec<String>,
}

/// Thread-safe stand-in for the page: fields, regions, controls and a
/// notification log. Notifications are recorded and acknowledged at once.
pub struct MemorySurface {
    state: Mutex<SurfaceState>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        let controls = ControlId::ALL
            .into_iter()
            .map(|control| {
                (
                    control,
                    ControlSnapshot {
                        label: control.default_label().to_string(),
                        markup: None,
                        enabled: true,
                    },
                )
            })
            .collect();

        Self {
            state: Mutex::new(SurfaceState {
                inputs: HashMap::new(),
                regions: HashMap::new(),
                controls,
                notifications: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn region_html(&self, region: ContentRegion) -> Option<String> {
        self.lock().regions.get(&region).cloned()
    }

    pub fn control(&self, control: ControlId) -> ControlSnapshot {
        self.lock()
            .controls
            .get(&control)
            .cloned()
            .unwrap_or_else(|| ControlSnapshot {
                label: control.default_label().to_string(),
                markup: None,
                enabled: true,
            })
    }

    pub fn notifications(&self) -> Vec<String> {
        self.lock().notifications.clone()
    }

    pub fn take_notifications(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().notifications)
    }
}

impl WorkflowSurface for MemorySurface {
    fn input_value(&self, field: InputField) -> String {
        self.lock().inputs.get(&field).cloned().unwrap_or_default()
    }

    fn set_input_value(&self, field: InputField, value: &str) {
        self.lock().inputs.insert(field, value.to_string());
    }

    fn set_region_html(&self, region: ContentRegion, html: &str) {
        self.lock().regions.insert(region, html.to_string());
    }

    fn control_label(&self, control: ControlId) -> String {
        self.control(control).label
    }

    fn set_control_label(&self, control: ControlId, label: &str) {
        let mut guard = self.lock();
        let entry = guard.controls.entry(control).or_insert_with(|| ControlSnapshot {
            label: String::new(),
            markup: None,
            enabled: true,
        });
        entry.label = label.to_string();
        entry.markup = None;
    }

    fn set_control_markup(&self, control: ControlId, markup: &str) {
        let mut guard = self.lock();
        if let Some(entry) = guard.controls.get_mut(&control) {
            entry.markup = Some(markup.to_string());
        }
    }

    fn set_control_enabled(&self, control: ControlId, enabled: bool) {
        let mut guard = self.lock();
        if let Some(entry) = guard.controls.get_mut(&control) {
            entry.enabled = enabled;
        }
    }

    fn notify(&self, message: &str) {
        self.lock().notifications.push(message.to_string());
    }
}
