use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

//
// ─── ACTIVITY KIND ─────────────────────────────────────────────────────────────
//

/// Kind of activity behind a subconcept or attempt.
///
/// Tags are matched case-insensitively. Unknown tags are kept, lowercased,
/// in `Other` so they survive a decode/encode cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Video,
    Youtube,
    Image,
    Pdf,
    AssignmentImage,
    Assessment,
    Mcq,
    Other(String),
}

impl ActivityKind {
    /// Parses a content-type tag. Returns `None` for an empty tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lowered = tag.to_lowercase();
        let kind = match lowered.as_str() {
            "" => return None,
            "video" => Self::Video,
            "youtube" => Self::Youtube,
            "image" => Self::Image,
            "pdf" => Self::Pdf,
            "assignment_image" => Self::AssignmentImage,
            "assessment" => Self::Assessment,
            "mcq" => Self::Mcq,
            _ => Self::Other(lowered),
        };
        Some(kind)
    }

    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Video => "video",
            Self::Youtube => "youtube",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::AssignmentImage => "assignment_image",
            Self::Assessment => "assessment",
            Self::Mcq => "mcq",
            Self::Other(tag) => tag,
        }
    }

    /// Passive content that earns full marks just by being opened.
    #[must_use]
    pub fn is_auto_scored(&self) -> bool {
        matches!(self, Self::Video | Self::Youtube | Self::Image | Self::Pdf)
    }

    /// Content scored by a mentor outside this system.
    #[must_use]
    pub fn requires_grading(&self) -> bool {
        matches!(self, Self::AssignmentImage | Self::Assessment)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Serialize for ActivityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&raw).unwrap_or_else(|| Self::Other(String::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_case_insensitive() {
        assert_eq!(ActivityKind::from_tag("VIDEO"), Some(ActivityKind::Video));
        assert_eq!(
            ActivityKind::from_tag("Assignment_Image"),
            Some(ActivityKind::AssignmentImage)
        );
    }

    #[test]
    fn empty_tag_has_no_kind() {
        assert_eq!(ActivityKind::from_tag(""), None);
    }

    #[test]
    fn unknown_tags_are_preserved_lowercased() {
        let kind = ActivityKind::from_tag("Flashcards").unwrap();
        assert_eq!(kind, ActivityKind::Other("flashcards".into()));
        assert_eq!(kind.as_tag(), "flashcards");
        assert!(!kind.is_auto_scored());
        assert!(!kind.requires_grading());
    }

    #[test]
    fn scoring_classes_do_not_overlap() {
        for kind in [
            ActivityKind::Video,
            ActivityKind::Youtube,
            ActivityKind::Image,
            ActivityKind::Pdf,
        ] {
            assert!(kind.is_auto_scored());
            assert!(!kind.requires_grading());
        }
        assert!(ActivityKind::Assessment.requires_grading());
        assert!(!ActivityKind::Mcq.is_auto_scored());
    }
}
