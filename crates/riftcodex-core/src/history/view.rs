/// One point in browsing history: either a tag listing or a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub entity_id: Option<String>,
    pub tag: Option<String>,
    pub is_tag_view: bool,
    /// Selected row in the displayed list, -1 for none
    pub selected_index: i32,
}

impl ViewState {
    /// Tag view with nothing selected; every history starts here
    pub fn initial() -> Self {
        Self {
            entity_id: None,
            tag: None,
            is_tag_view: true,
            selected_index: -1,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: non_empty(tag.into()),
            ..Self::initial()
        }
    }

    /// Single-entity view, remembering the tag that was active when it opened
    pub fn entity(id: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            entity_id: non_empty(id.into()),
            tag: tag.and_then(non_empty),
            is_tag_view: false,
            selected_index: 0,
        }
    }

    pub fn with_selected_index(mut self, index: i32) -> Self {
        self.selected_index = index;
        self
    }

    /// Build from raw fields, treating empty strings as absent
    pub fn from_parts(
        entity_id: impl Into<String>,
        tag: impl Into<String>,
        is_tag_view: bool,
        selected_index: i32,
    ) -> Self {
        Self {
            entity_id: non_empty(entity_id.into()),
            tag: non_empty(tag.into()),
            is_tag_view,
            selected_index,
        }
    }

    pub fn entity_id(&self) -> &str {
        self.entity_id.as_deref().unwrap_or("")
    }

    pub fn tag_name(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::initial()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::initial()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
