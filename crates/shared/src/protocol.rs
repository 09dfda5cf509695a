use serde::{Deserialize, Serialize};

use crate::domain::ContentRegion;

pub const PROCESS_PATH: &str = "/api/process";
pub const REFINE_PATH: &str = "/api/refine";
pub const FINALIZE_PATH: &str = "/api/finalize";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub idea: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineRequest {
    pub refinement: String,
}

/// Markdown blocks returned by the process and refine endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeContent {
    pub connected_narrative: String,
    pub growth_points: String,
    pub ai_contributions: String,
}

impl NarrativeContent {
    /// Each field paired with the region it is written to.
    pub fn by_region(&self) -> [(ContentRegion, &str); 3] {
        [
            (ContentRegion::ConnectedNarrative, self.connected_narrative.as_str()),
            (ContentRegion::GrowthPoints, self.growth_points.as_str()),
            (ContentRegion::AiContributions, self.ai_contributions.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub blog_post: String,
}
