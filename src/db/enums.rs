use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects which tag namespace and link table an operation works against.
/// Book tags and film tags never share rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Book,
    Film,
}

impl TagKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TagKind::Book => "book",
            TagKind::Film => "film",
        }
    }

    pub fn tag_table(self) -> &'static str {
        match self {
            TagKind::Book => "book_tags",
            TagKind::Film => "film_tags",
        }
    }

    pub fn link_table(self) -> &'static str {
        match self {
            TagKind::Book => "book_tag_links",
            TagKind::Film => "film_tag_links",
        }
    }

    /// Column in the link table that points at the owning entity.
    pub fn entity_column(self) -> &'static str {
        match self {
            TagKind::Book => "book_id",
            TagKind::Film => "film_id",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
