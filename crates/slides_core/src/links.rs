use std::fmt;

/// Semantic kind of a share link pasted by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Empty,
    Collaboration,
    Template,
    PublicView,
    Unknown,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Empty => "empty",
            LinkKind::Collaboration => "collaboration",
            LinkKind::Template => "template",
            LinkKind::PublicView => "public view",
            LinkKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three link fields the operator fills in from the share dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkRole {
    Collaboration,
    Template,
    PublicView,
}

impl LinkRole {
    pub const ALL: [LinkRole; 3] = [
        LinkRole::Collaboration,
        LinkRole::Template,
        LinkRole::PublicView,
    ];

    /// The kind a raw link must classify to in order to be valid for this role.
    pub fn expected_kind(self) -> LinkKind {
        match self {
            LinkRole::Collaboration => LinkKind::Collaboration,
            LinkRole::Template => LinkKind::Template,
            LinkRole::PublicView => LinkKind::PublicView,
        }
    }
}

const EDIT_MARKER: &str = "/edit?";
const VIEW_MARKER: &str = "/view?";
const PREVIEW_MARKER: &str = "mode=preview";

/// Classify a raw link string. Total and pure.
///
/// Checked in priority order: collaboration (`/edit?`), template (`/view?`
/// with a later `mode=preview`), public view (`/view?` without one).
/// Blank input is `Empty`, never `Unknown`.
pub fn classify(raw: &str) -> LinkKind {
    let raw = raw.trim();
    if raw.is_empty() {
        return LinkKind::Empty;
    }
    if raw.contains(EDIT_MARKER) {
        return LinkKind::Collaboration;
    }
    // The first `/view?` leaves the longest tail, so checking it alone decides
    // whether any occurrence is followed by the preview marker.
    match raw.find(VIEW_MARKER) {
        Some(idx) if raw[idx + VIEW_MARKER.len()..].contains(PREVIEW_MARKER) => {
            LinkKind::Template
        }
        Some(_) => LinkKind::PublicView,
        None => LinkKind::Unknown,
    }
}

/// Raw strings for every link role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkFields {
    pub collaboration: String,
    pub template: String,
    pub public_view: String,
}

impl LinkFields {
    pub fn get(&self, role: LinkRole) -> &str {
        match role {
            LinkRole::Collaboration => &self.collaboration,
            LinkRole::Template => &self.template,
            LinkRole::PublicView => &self.public_view,
        }
    }

    /// Stores the link without surrounding whitespace, the form `classify` judges.
    pub fn set(&mut self, role: LinkRole, raw: impl Into<String>) {
        let raw = raw.into().trim().to_string();
        match role {
            LinkRole::Collaboration => self.collaboration = raw,
            LinkRole::Template => self.template = raw,
            LinkRole::PublicView => self.public_view = raw,
        }
    }

    pub fn kind(&self, role: LinkRole) -> LinkKind {
        classify(self.get(role))
    }

    /// True when every field classifies to the kind its role expects.
    pub fn all_valid(&self) -> bool {
        LinkRole::ALL
            .iter()
            .all(|role| self.kind(*role) == role.expected_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_before_view_marker_is_not_template() {
        assert_eq!(
            classify("https://host/design?mode=preview/view?x=1"),
            LinkKind::PublicView
        );
    }

    #[test]
    fn stored_links_are_trimmed() {
        let mut links = LinkFields::default();
        links.set(LinkRole::Collaboration, "  https://host/d/abc/edit?x=1 \n");
        assert_eq!(links.get(LinkRole::Collaboration), "https://host/d/abc/edit?x=1");
        assert_eq!(links.kind(LinkRole::Collaboration), LinkKind::Collaboration);
    }

    #[test]
    fn edit_wins_over_view() {
        assert_eq!(
            classify("https://host/d/abc/view?x=1&next=/edit?y"),
            LinkKind::Collaboration
        );
    }
}
