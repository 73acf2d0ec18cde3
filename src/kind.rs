//! Element role kinds and the derived priority score.
//!
//! Every outline line names a role token ("button", "listitem", …). The
//! engine branches on these roles in several places — wrapper removal,
//! semantic run detection, fingerprint features — so the token set is a
//! closed enumeration with an explicit [`ElementKind::Other`] variant,
//! letting the compiler check exhaustiveness instead of scattering string
//! comparisons.

use serde::{Deserialize, Serialize};

/// The role a page element declares in the outline.
///
/// Covers the roles the engine treats specially plus the common roles of
/// accessibility snapshots; anything else lands in `Other` with its raw
/// token preserved (the fingerprint still distinguishes unknown roles by
/// that token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Button,
    Link,
    ListItem,
    List,
    Generic,
    Heading,
    Text,
    Paragraph,
    Image,
    Textbox,
    Checkbox,
    Radio,
    Combobox,
    Option,
    Tab,
    Menu,
    MenuItem,
    Dialog,
    Navigation,
    Banner,
    ContentInfo,
    Main,
    Table,
    Row,
    Cell,
    Form,
    Separator,
    /// A role outside the curated set, carrying its raw token.
    Other(String),
}

impl ElementKind {
    /// Map a raw role token to its kind. Unknown tokens become `Other`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "button" => Self::Button,
            "link" => Self::Link,
            "listitem" => Self::ListItem,
            "list" => Self::List,
            "generic" => Self::Generic,
            "heading" => Self::Heading,
            "text" => Self::Text,
            "paragraph" => Self::Paragraph,
            "img" | "image" => Self::Image,
            "textbox" => Self::Textbox,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "combobox" => Self::Combobox,
            "option" => Self::Option,
            "tab" => Self::Tab,
            "menu" => Self::Menu,
            "menuitem" => Self::MenuItem,
            "dialog" => Self::Dialog,
            "navigation" => Self::Navigation,
            "banner" => Self::Banner,
            "contentinfo" => Self::ContentInfo,
            "main" => Self::Main,
            "table" => Self::Table,
            "row" => Self::Row,
            "cell" => Self::Cell,
            "form" => Self::Form,
            "separator" => Self::Separator,
            other => Self::Other(other.to_string()),
        }
    }

    /// The role token as it appears in outline text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::ListItem => "listitem",
            Self::List => "list",
            Self::Generic => "generic",
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Paragraph => "paragraph",
            Self::Image => "img",
            Self::Textbox => "textbox",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Combobox => "combobox",
            Self::Option => "option",
            Self::Tab => "tab",
            Self::Menu => "menu",
            Self::MenuItem => "menuitem",
            Self::Dialog => "dialog",
            Self::Navigation => "navigation",
            Self::Banner => "banner",
            Self::ContentInfo => "contentinfo",
            Self::Main => "main",
            Self::Table => "table",
            Self::Row => "row",
            Self::Cell => "cell",
            Self::Form => "form",
            Self::Separator => "separator",
            Self::Other(token) => token,
        }
    }

    /// Whether this is the structurally meaningless wrapper role.
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic)
    }

    /// Whether elements of this role accept user interaction.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Link
                | Self::Textbox
                | Self::Checkbox
                | Self::Radio
                | Self::Combobox
                | Self::Option
                | Self::Tab
                | Self::MenuItem
        )
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compute the importance score of an element from its role and content.
///
/// Layered additive scoring: each signal that makes an element worth
/// showing to an agent adds a fixed weight. The score decides which of a
/// sample's children survive when a structural sample must cut children;
/// it never affects which reference ids the output carries.
pub fn score_priority(
    kind: &ElementKind,
    inline_text: Option<&str>,
    has_reference: bool,
) -> i32 {
    let mut score = 0;

    // Layer 1: interactive roles are what agents act on.
    if kind.is_interactive() {
        score += 30;
    }

    // Layer 2: landmark and labeling roles orient the agent.
    if matches!(
        kind,
        ElementKind::Heading | ElementKind::Tab | ElementKind::Dialog | ElementKind::Navigation
    ) {
        score += 20;
    }

    // Layer 3: visible text, weighted a little by how much of it there is.
    if let Some(text) = inline_text {
        score += 10;
        score += (text.len() as i32 / 10).min(10);
    }

    // Layer 4: a reference id means the automation layer can re-target it.
    if has_reference {
        score += 15;
    }

    // Wrappers sort last among equals.
    if kind.is_generic() {
        score -= 10;
    }

    score
}
