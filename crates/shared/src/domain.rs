use serde::{Deserialize, Serialize};

macro_rules! element_ids {
    ($name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: [$name; element_ids!(@count $($variant)+)] = [$($name::$variant),+];

            /// Identifier of the page element this value is bound to.
            pub fn element_id(self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }
        }
    };
    (@count $($variant:ident)+) => { <[()]>::len(&[$(element_ids!(@one $variant)),+]) };
    (@one $variant:ident) => { () };
}

/// The single top-level screen shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Initial,
    Result,
    Blog,
}

element_ids!(ViewState {
    Initial => "initial-view",
    Result => "result-view",
    Blog => "blog-view",
});

impl ViewState {
    pub fn as_u8(self) -> u8 {
        match self {
            ViewState::Initial => 0,
            ViewState::Result => 1,
            ViewState::Blog => 2,
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ViewState::Initial),
            1 => Some(ViewState::Result),
            2 => Some(ViewState::Blog),
            _ => None,
        }
    }
}

/// Action controls that hold a busy lock while their request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    Submit,
    Refine,
    Finalize,
}

element_ids!(ControlId {
    Submit => "process-btn",
    Refine => "refine-btn",
    Finalize => "finalize-btn",
});

impl ControlId {
    pub fn default_label(self) -> &'static str {
        match self {
            ControlId::Submit => "Process Idea",
            ControlId::Refine => "Refine",
            ControlId::Finalize => "Finalize to Blog",
        }
    }

    pub fn index(self) -> usize {
        match self {
            ControlId::Submit => 0,
            ControlId::Refine => 1,
            ControlId::Finalize => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Idea,
    Refinement,
}

element_ids!(InputField {
    Idea => "initial-idea",
    Refinement => "refinement-input",
});

/// Display regions that receive rendered HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRegion {
    ConnectedNarrative,
    GrowthPoints,
    AiContributions,
    BlogContent,
}

element_ids!(ContentRegion {
    ConnectedNarrative => "connected-narrative",
    GrowthPoints => "growth-points",
    AiContributions => "ai-contributions",
    BlogContent => "blog-content",
});

impl ContentRegion {
    pub const NARRATIVE: [ContentRegion; 3] = [
        ContentRegion::ConnectedNarrative,
        ContentRegion::GrowthPoints,
        ContentRegion::AiContributions,
    ];

    /// Regions that are visible while `view` is active.
    pub fn shown_in(view: ViewState) -> &'static [ContentRegion] {
        match view {
            ViewState::Initial => &[],
            ViewState::Result => &Self::NARRATIVE,
            ViewState::Blog => &[ContentRegion::BlogContent],
        }
    }
}

/// Click bindings exposed by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiAction {
    SubmitIdea,
    Refine,
    Finalize,
    StartNew,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_state_u8_encoding_is_stable() {
        for view in ViewState::ALL {
            assert_eq!(ViewState::from_u8(view.as_u8()), Some(view));
        }
        assert_eq!(ViewState::from_u8(3), None);
    }

    #[test]
    fn element_ids_are_distinct_per_kind() {
        let ids: std::collections::HashSet<_> =
            ContentRegion::ALL.iter().map(|r| r.element_id()).collect();
        assert_eq!(ids.len(), ContentRegion::ALL.len());
        assert_eq!(ViewState::Result.element_id(), "result-view");
        assert_eq!(ControlId::Submit.element_id(), "process-btn");
    }
}
