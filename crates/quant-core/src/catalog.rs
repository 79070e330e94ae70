//! CSS property catalog
//!
//! A membership oracle used by the validator (unknown properties) and the
//! usage scanner (unknown class tails). Names starting with `--` are custom
//! properties and always accepted.

use std::collections::HashSet;

const LAYOUT: &[&str] = &[
    "display", "position", "top", "right", "bottom", "left", "inset", "z-index", "float",
    "clear", "overflow", "overflow-x", "overflow-y", "clip", "visibility", "box-sizing",
    "isolation", "object-fit", "object-position", "aspect-ratio", "container", "container-type",
];

const BOX_MODEL: &[&str] = &[
    "width", "min-width", "max-width", "height", "min-height", "max-height",
    "margin", "margin-top", "margin-right", "margin-bottom", "margin-left",
    "margin-inline", "margin-block",
    "padding", "padding-top", "padding-right", "padding-bottom", "padding-left",
    "padding-inline", "padding-block",
    "border", "border-width", "border-style", "border-color",
    "border-top", "border-right", "border-bottom", "border-left",
    "border-top-color", "border-right-color", "border-bottom-color", "border-left-color",
    "border-radius", "border-top-left-radius", "border-top-right-radius",
    "border-bottom-right-radius", "border-bottom-left-radius",
    "outline", "outline-width", "outline-style", "outline-color", "outline-offset",
];

const TYPOGRAPHY: &[&str] = &[
    "color", "font", "font-family", "font-size", "font-style", "font-weight", "font-variant",
    "font-stretch", "line-height", "letter-spacing", "word-spacing", "word-break",
    "overflow-wrap", "white-space", "text-align", "text-transform", "text-decoration",
    "text-decoration-line", "text-decoration-style", "text-decoration-color",
    "text-underline-offset", "text-indent", "text-overflow", "vertical-align", "direction",
    "tab-size", "hyphens",
];

const BACKGROUND: &[&str] = &[
    "background", "background-color", "background-image", "background-repeat",
    "background-position", "background-size", "background-attachment", "background-clip",
    "background-origin", "backdrop-filter",
];

const FLEX_GRID: &[&str] = &[
    "flex", "flex-grow", "flex-shrink", "flex-basis", "flex-direction", "flex-flow",
    "flex-wrap", "justify-content", "justify-items", "justify-self", "align-items",
    "align-content", "align-self", "place-items", "place-content", "place-self",
    "gap", "row-gap", "column-gap", "order",
    "grid", "grid-template", "grid-template-columns", "grid-template-rows",
    "grid-template-areas", "grid-auto-columns", "grid-auto-rows", "grid-auto-flow",
    "grid-column", "grid-column-start", "grid-column-end", "grid-row", "grid-row-start",
    "grid-row-end", "grid-area",
];

const MOTION: &[&str] = &[
    "animation", "animation-name", "animation-duration", "animation-timing-function",
    "animation-delay", "animation-iteration-count", "animation-direction",
    "animation-fill-mode", "animation-play-state",
    "transition", "transition-property", "transition-duration", "transition-timing-function",
    "transition-delay",
    "transform", "transform-origin", "transform-style", "perspective", "perspective-origin",
    "backface-visibility", "translate", "rotate", "scale", "will-change",
];

const EFFECTS: &[&str] = &[
    "filter", "box-shadow", "text-shadow", "opacity", "mix-blend-mode",
];

const TABLES_LISTS_CONTENT: &[&str] = &[
    "border-collapse", "border-spacing", "caption-side", "empty-cells", "table-layout",
    "list-style", "list-style-type", "list-style-position", "list-style-image",
    "content", "quotes", "counter-reset", "counter-increment",
];

const INTERACTION: &[&str] = &[
    "scroll-behavior", "scroll-snap-type", "scroll-snap-align",
    "scroll-margin", "scroll-margin-top", "scroll-margin-right", "scroll-margin-bottom",
    "scroll-margin-left", "scroll-padding", "scroll-padding-top", "scroll-padding-right",
    "scroll-padding-bottom", "scroll-padding-left",
    "cursor", "pointer-events", "resize", "user-select", "touch-action", "appearance",
    "accent-color", "caret-color",
];

const GROUPS: &[&[&str]] = &[
    LAYOUT,
    BOX_MODEL,
    TYPOGRAPHY,
    BACKGROUND,
    FLEX_GRID,
    MOTION,
    EFFECTS,
    TABLES_LISTS_CONTENT,
    INTERACTION,
];

/// Set of known CSS property names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCatalog {
    names: HashSet<String>,
}

impl PropertyCatalog {
    /// Catalog of common, widely supported properties
    pub fn standard() -> Self {
        Self {
            names: GROUPS
                .iter()
                .flat_map(|group| group.iter())
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Empty catalog; only custom properties are accepted
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn extend<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(extra.into_iter().map(Into::into));
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extend(extra);
        self
    }

    /// Membership test; `--*` custom properties always match
    pub fn contains(&self, name: &str) -> bool {
        name.starts_with("--") || self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for PropertyCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = PropertyCatalog::standard();
        assert!(catalog.contains("color"));
        assert!(catalog.contains("grid-template-columns"));
        assert!(catalog.contains("scroll-padding-left"));
        assert!(!catalog.contains("colr"));
        assert!(!catalog.contains("bg-red"));
    }

    #[test]
    fn test_custom_properties_always_known() {
        let catalog = PropertyCatalog::empty();
        assert!(catalog.is_empty());
        assert!(catalog.contains("--brand-color"));
        assert!(!catalog.contains("color"));
    }

    #[test]
    fn test_extend() {
        let catalog = PropertyCatalog::standard().with_extra(["field-sizing"]);
        assert!(catalog.contains("field-sizing"));
    }
}
