pub mod gantt;
pub mod line_chart;
pub mod swim_lanes;

use planviz_protocol::{ACTION_PALETTE, DomainInfo, PlanStep, RenderCommand, ThemeToken};

/// Decimal places shown for times in tooltips.
pub const DIGITS: usize = 4;

pub(crate) const FONT_SIZE: f64 = 12.0;
/// Rough advance of one character at [`FONT_SIZE`], used to place text runs
/// one after another.
pub(crate) const CHAR_WIDTH: f64 = FONT_SIZE * 0.6;

pub(crate) fn text_width(text: &str) -> f64 {
    text.chars().count() as f64 * CHAR_WIDTH
}

/// Deterministic color for the step's action: the action's position in the
/// domain, strided by 7 through the palette. Unknown actions are gray.
pub fn action_color(action_name: &str, domain: Option<&DomainInfo>) -> ThemeToken {
    match domain.and_then(|d| d.action_index(action_name)) {
        Some(index) => ThemeToken::Action(((index * 7) % ACTION_PALETTE.len()) as u8),
        None => ThemeToken::UnknownAction,
    }
}

/// One-line tooltip:
/// `"drive t1 a b, Start: 1.0000 Duration: 2.0000, End: 3.0000"`.
pub fn tooltip_text(step: &PlanStep) -> String {
    let duration = match step.duration {
        Some(duration) if step.is_durative => format!(
            "Duration: {duration:.DIGITS$}, End: {:.DIGITS$}",
            step.end_time()
        ),
        _ => String::new(),
    };
    format!(
        "{}, Start: {:.DIGITS$} {duration}",
        step.full_action_name(),
        step.start_time
    )
}

/// Multi-line tooltip: a title line, then `Start`, and for durative steps
/// `Duration` and `End`.
pub fn tooltip_table(step: &PlanStep) -> String {
    let mut lines = vec![
        step.full_action_name(),
        format!("Start: {:.DIGITS$}", step.start_time),
    ];
    if let Some(duration) = step.duration
        && step.is_durative
    {
        lines.push(format!("Duration: {duration:.DIGITS$}"));
        lines.push(format!("End: {:.DIGITS$}", step.end_time()));
    }
    lines.join("\n")
}

/// Lowest y coordinate reached by the commands (0 for none).
pub fn commands_extent(commands: &[RenderCommand]) -> f64 {
    commands
        .iter()
        .map(|cmd| match cmd {
            RenderCommand::DrawRect { rect, .. } => rect.bottom(),
            RenderCommand::DrawText {
                position, font_size, ..
            } => position.y + font_size * 0.3,
            RenderCommand::DrawLine { from, to, .. } => from.y.max(to.y),
            _ => 0.0,
        })
        .fold(0.0, f64::max)
}
