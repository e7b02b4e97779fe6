use crate::grade::GradeLevel;
use crate::links::LinkFields;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchActivity { id: String },
    GenerateSlides { activity_id: String, grade: GradeLevel },
    CancelGeneration,
    RequestExport,
    PersistLinks(LinkSyncRequest),
    CreateVariation(VariationRequest),
}

/// Upload the exported deck, then store it with the share links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSyncRequest {
    pub activity_id: String,
    pub title: String,
    pub export_url: String,
    pub links: LinkFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationRequest {
    pub activity_id: String,
    pub title: String,
    pub grade: GradeLevel,
    pub links: LinkFields,
}
