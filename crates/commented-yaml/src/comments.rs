use serde::Serialize;

use crate::error::Error;

/// Where a comment sits relative to the entry that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentLocation {
    /// On the lines directly before the entry.
    Above,
    /// On the entry's own line, after its key or scalar value.
    Inline,
    /// On the lines after the entry's line, before the next entry.
    Below,
}

/// Comment lines attached to one entry, grouped by location.
///
/// Text is stored without the leading `#` and at most one following space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub above: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub below: Vec<String>,
}

impl CommentData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.above.is_empty() && self.inline.is_empty() && self.below.is_empty()
    }

    pub fn get(&self, location: CommentLocation) -> &[String] {
        match location {
            CommentLocation::Above => &self.above,
            CommentLocation::Inline => &self.inline,
            CommentLocation::Below => &self.below,
        }
    }

    /// Append a comment line at `location`.
    ///
    /// # Errors
    ///
    /// An entry has a single line, so a second inline comment is rejected.
    pub fn push(
        &mut self,
        location: CommentLocation,
        text: impl Into<String>,
    ) -> Result<(), Error> {
        match location {
            CommentLocation::Above => self.above.push(text.into()),
            CommentLocation::Inline if !self.inline.is_empty() => {
                return Err(Error::unsupported(
                    "an entry can carry at most one inline comment",
                ));
            }
            CommentLocation::Inline => self.inline.push(text.into()),
            CommentLocation::Below => self.below.push(text.into()),
        }
        Ok(())
    }

    /// Builder form of [`CommentData::push`] for the unconditional locations.
    #[must_use]
    pub fn with_above(mut self, text: impl Into<String>) -> Self {
        self.above.push(text.into());
        self
    }

    #[must_use]
    pub fn with_below(mut self, text: impl Into<String>) -> Self {
        self.below.push(text.into());
        self
    }

    /// Replaces any existing inline comment.
    #[must_use]
    pub fn with_inline(mut self, text: impl Into<String>) -> Self {
        self.inline = vec![text.into()];
        self
    }
}
