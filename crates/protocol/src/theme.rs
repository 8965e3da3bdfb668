use serde::{Deserialize, Serialize};

/// Fixed action palette: a hue wheel in 15° steps starting at red.
///
/// Actions index into it with a stride of 7 so that neighbouring actions in
/// the domain get clearly distinct hues.
pub const ACTION_PALETTE: [&str; 24] = [
    "#ff0000", "#ff4000", "#ff8000", "#ffbf00", "#ffff00", "#bfff00", "#80ff00", "#40ff00",
    "#00ff00", "#00ff40", "#00ff80", "#00ffbf", "#00ffff", "#00bfff", "#0080ff", "#0040ff",
    "#0000ff", "#4000ff", "#8000ff", "#bf00ff", "#ff00ff", "#ff00bf", "#ff0080", "#ff0040",
];

/// Color used for actions the domain does not declare.
pub const UNKNOWN_ACTION_COLOR: &str = "#808080";

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    /// Slot in [`ACTION_PALETTE`].
    Action(u8),
    /// Action missing from the domain (or no domain at all).
    UnknownAction,
    /// Speculative (relaxed-plan) part of a Gantt bar.
    RelaxedHatch,

    LaneBackground,
    LaneBorder,
    LaneHeaderBackground,
    LaneHeaderText,

    TextPrimary,
    TextMuted,
    LinkText,
    ErrorText,
    HelpfulActionText,

    // Line charts
    ChartBackground,
    ChartAxis,
    /// Series color; resolved through [`ACTION_PALETTE`] by slot as well.
    ChartSeries(u8),
    Loader,

    Background,
    Border,
}

impl ThemeToken {
    /// Palette hex string for palette-backed tokens.
    pub fn palette_hex(self) -> Option<&'static str> {
        match self {
            ThemeToken::Action(slot) | ThemeToken::ChartSeries(slot) => {
                ACTION_PALETTE.get(usize::from(slot) % ACTION_PALETTE.len()).copied()
            }
            ThemeToken::UnknownAction => Some(UNKNOWN_ACTION_COLOR),
            _ => None,
        }
    }
}
