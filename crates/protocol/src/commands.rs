use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A selectable target attached to a drawn element.
///
/// Renderers report a hit back to the owning plan view, which dispatches
/// it to its listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link {
    /// Reveal the action declaration in the domain.
    Action(String),
    /// Apply one of the planner's suggested next actions.
    HelpfulAction(String),
}

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` for each view. Renderers consume
/// this list sequentially; each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a text label, a hover
    /// tooltip, and a selectable link.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        tooltip: Option<String>,
        link: Option<Link>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
        link: Option<Link>,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Begin a logical group (e.g. the Gantt chart or one object's swim
    /// lane). Renderers may use this for batching or accessibility.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

impl RenderCommand {
    /// The link carried by this command, if any.
    pub fn link(&self) -> Option<&Link> {
        match self {
            RenderCommand::DrawRect { link, .. } | RenderCommand::DrawText { link, .. } => {
                link.as_ref()
            }
            _ => None,
        }
    }

    /// Translate the command vertically by `dy`.
    pub fn offset_y(self, dy: f64) -> Self {
        match self {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                tooltip,
                link,
            } => RenderCommand::DrawRect {
                rect: rect.offset_y(dy),
                color,
                border_color,
                label,
                tooltip,
                link,
            },
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
                link,
            } => RenderCommand::DrawText {
                position: Point::new(position.x, position.y + dy),
                text,
                color,
                font_size,
                align,
                link,
            },
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => RenderCommand::DrawLine {
                from: Point::new(from.x, from.y + dy),
                to: Point::new(to.x, to.y + dy),
                color,
                width,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_moves_geometry_but_keeps_payload() {
        let cmd = RenderCommand::DrawText {
            position: Point::new(4.0, 10.0),
            text: "drive".into(),
            color: ThemeToken::LinkText,
            font_size: 12.0,
            align: TextAlign::Left,
            link: Some(Link::Action("drive".into())),
        };
        let moved = cmd.offset_y(100.0);
        match &moved {
            RenderCommand::DrawText { position, text, .. } => {
                assert_eq!(*position, Point::new(4.0, 110.0));
                assert_eq!(text, "drive");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(moved.link(), Some(&Link::Action("drive".into())));
    }

    #[test]
    fn serializes_as_externally_tagged_json() {
        let cmd = RenderCommand::BeginGroup {
            id: "gantt".into(),
            label: None,
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert_eq!(json, r#"{"BeginGroup":{"id":"gantt","label":null}}"#);
    }
}
