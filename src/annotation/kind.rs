//! Semantic annotation kinds.

use serde::{Deserialize, Serialize};

/// What a mark *means*, independent of the primitive that draws it.
///
/// A freehand stroke and a tick stamp are both paths; the kind is what tells
/// them apart, so it is tagged at creation time and never re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Pen,
    Highlight,
    Circle,
    Cross,
    Check,
    Text,
}

/// Which primitive family a kind must be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveFamily {
    Path,
    Ellipse,
    Text,
}

impl AnnotationKind {
    pub fn primitive(&self) -> PrimitiveFamily {
        match self {
            AnnotationKind::Pen
            | AnnotationKind::Highlight
            | AnnotationKind::Cross
            | AnnotationKind::Check => PrimitiveFamily::Path,
            AnnotationKind::Circle => PrimitiveFamily::Ellipse,
            AnnotationKind::Text => PrimitiveFamily::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&AnnotationKind::Check).unwrap();
        assert_eq!(json, "\"check\"");
        let parsed: AnnotationKind = serde_json::from_str("\"highlight\"").unwrap();
        assert_eq!(parsed, AnnotationKind::Highlight);
    }

    #[test]
    fn test_path_kinds_share_a_primitive() {
        assert_eq!(AnnotationKind::Pen.primitive(), PrimitiveFamily::Path);
        assert_eq!(AnnotationKind::Cross.primitive(), PrimitiveFamily::Path);
        assert_eq!(AnnotationKind::Check.primitive(), PrimitiveFamily::Path);
        assert_eq!(AnnotationKind::Circle.primitive(), PrimitiveFamily::Ellipse);
        assert_eq!(AnnotationKind::Text.primitive(), PrimitiveFamily::Text);
    }
}
