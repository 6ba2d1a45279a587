use std::sync::Arc;

use spanlens_common::SpanSize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB color packed as `0xRRGGBB`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Left,
    Bottom,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Left, Side::Bottom, Side::Right];

    fn slot(self) -> usize {
        self as usize
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    pub family: Arc<str>,
    /// Size in 1/10 points.
    pub size_10pt: u16,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Font {
    pub fn new(family: impl Into<Arc<str>>, points: u16) -> Self {
        Self {
            family: family.into(),
            size_10pt: points.saturating_mul(10),
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    #[default]
    General,
    Left,
    Center,
    Right,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Center,
    Bottom,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Insets {
    pub top: u16,
    pub left: u16,
    pub bottom: u16,
    pub right: u16,
}

impl Insets {
    pub const fn uniform(v: u16) -> Self {
        Self {
            top: v,
            left: v,
            bottom: v,
            right: v,
        }
    }
}

/// Attributes set on one cell. Every field is optional: `None` means the
/// layer below decides.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct TableCellInfo {
    pub borders: [Option<BorderStyle>; 4],
    pub border_colors: [Option<Color>; 4],
    pub font: Option<Font>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub alignment: Option<Alignment>,
    pub span: Option<SpanSize>,
    pub insets: Option<Insets>,
    pub wrapping: Option<bool>,
}

impl TableCellInfo {
    pub fn border(&self, side: Side) -> Option<BorderStyle> {
        self.borders[side.slot()]
    }

    pub fn set_border(&mut self, side: Side, style: Option<BorderStyle>) {
        self.borders[side.slot()] = style;
    }

    pub fn border_color(&self, side: Side) -> Option<Color> {
        self.border_colors[side.slot()]
    }

    pub fn set_border_color(&mut self, side: Side, color: Option<Color>) {
        self.border_colors[side.slot()] = color;
    }

    /// Nothing set.
    pub fn is_blank(&self) -> bool {
        *self == TableCellInfo::default()
    }
}
