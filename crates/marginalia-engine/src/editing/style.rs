use serde::{Deserialize, Serialize};

/// Inline formatting attributes a run of text can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    /// Monospace / inline code styling.
    Code,
}

impl InlineStyle {
    /// Every style, in the fixed order used for deterministic HTML nesting.
    pub const ALL: [InlineStyle; 4] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Code,
    ];
}

/// Membership-only set of inline styles applied to a run.
///
/// No priority or nesting order is stored; ordering concerns are owned by
/// the HTML exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSet {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
}

impl StyleSet {
    pub const EMPTY: StyleSet = StyleSet {
        bold: false,
        italic: false,
        underline: false,
        code: false,
    };

    /// Build a set from a slice of styles.
    pub fn of(styles: &[InlineStyle]) -> Self {
        let mut set = Self::EMPTY;
        for style in styles {
            set = set.with(*style);
        }
        set
    }

    pub fn contains(self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.bold,
            InlineStyle::Italic => self.italic,
            InlineStyle::Underline => self.underline,
            InlineStyle::Code => self.code,
        }
    }

    pub fn with(self, style: InlineStyle) -> Self {
        let mut set = self;
        match style {
            InlineStyle::Bold => set.bold = true,
            InlineStyle::Italic => set.italic = true,
            InlineStyle::Underline => set.underline = true,
            InlineStyle::Code => set.code = true,
        }
        set
    }

    pub fn without(self, style: InlineStyle) -> Self {
        let mut set = self;
        match style {
            InlineStyle::Bold => set.bold = false,
            InlineStyle::Italic => set.italic = false,
            InlineStyle::Underline => set.underline = false,
            InlineStyle::Code => set.code = false,
        }
        set
    }

    pub fn toggled(self, style: InlineStyle) -> Self {
        if self.contains(style) {
            self.without(style)
        } else {
            self.with(style)
        }
    }

    /// Styles present in both sets.
    pub fn intersection(self, other: StyleSet) -> StyleSet {
        StyleSet {
            bold: self.bold && other.bold,
            italic: self.italic && other.italic,
            underline: self.underline && other.underline,
            code: self.code && other.code,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}
