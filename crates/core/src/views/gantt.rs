use planviz_protocol::{
    HappeningType, HelpfulAction, Link, Plan, Point, Rect, RenderCommand, TextAlign, ThemeToken,
};

use super::{FONT_SIZE, action_color, text_width, tooltip_text};
use crate::layout::{TimeScale, is_plan_head_step, split_duration};
use crate::options::PlanViewOptions;
use crate::settings::PlanVizSettings;

/// Narrowest committed bar drawn, so every step stays visible.
const MIN_BAR_WIDTH: f64 = 1.0;
const BAR_INSET: f64 = 3.0;
const LABEL_GAP: f64 = 4.0;

/// One Gantt row: a step's bar split into its committed and relaxed parts.
#[derive(Debug, Clone, PartialEq)]
pub struct GanttRow {
    /// Index into `Plan::steps`.
    pub step_index: usize,
    pub row: usize,
    pub left: f64,
    pub top: f64,
    pub head_width: f64,
    pub relaxed_width: f64,
    pub color: ThemeToken,
    pub action_name: String,
    /// Objects and iteration count shown after the action name.
    pub label: String,
    pub tooltip: String,
    pub linked: bool,
}

impl GanttRow {
    pub fn width(&self) -> f64 {
        self.head_width + self.relaxed_width
    }
}

/// The marker row between the head batch and the relaxed batch, listing
/// the planner's suggested next actions.
#[derive(Debug, Clone, PartialEq)]
pub struct HelpfulActionsRow {
    pub top: f64,
    pub left: f64,
    /// `(display text, action name)` pairs.
    pub entries: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GanttLayout {
    pub rows: Vec<GanttRow>,
    pub helpful_actions: Option<HelpfulActionsRow>,
    pub height: f64,
}

/// Lay out the displayed steps of `plan`: plan-head steps first, then the
/// helpful-actions marker (if any), then the relaxed-plan steps.
pub fn layout_gantt(
    plan: &Plan,
    settings: Option<&dyn PlanVizSettings>,
    options: &PlanViewOptions,
) -> GanttLayout {
    let scale = TimeScale::new(plan.makespan(), options.display_width, options.epsilon);
    let step_height = options.plan_step_height;

    let displayed: Vec<usize> = plan
        .steps
        .iter()
        .enumerate()
        .filter(|(_, step)| settings.is_none_or(|s| s.should_display(step)))
        .map(|(i, _)| i)
        .collect();

    let (head, relaxed): (Vec<usize>, Vec<usize>) = displayed
        .iter()
        .partition(|&&i| is_plan_head_step(&plan.steps[i], plan.now));

    let marker_rows = usize::from(plan.has_helpful_actions());
    let linked = !options.self_contained && plan.domain.is_some();

    let row_for = |step_index: usize, row: usize| -> GanttRow {
        let step = &plan.steps[step_index];
        let split = split_duration(step, plan.now, options.epsilon);
        let iterations = if step.iterations > 1 {
            format!("{}x", step.iterations)
        } else {
            String::new()
        };
        GanttRow {
            step_index,
            row,
            left: scale.to_view(Some(step.start_time)),
            top: row as f64 * step_height,
            head_width: scale.to_view(Some(split.plan_head)).max(MIN_BAR_WIDTH),
            relaxed_width: scale.to_view(Some(split.relaxed)),
            color: action_color(&step.action_name, plan.domain.as_ref()),
            action_name: step.action_name.clone(),
            label: format!("{} {iterations}", step.objects.join(" ")),
            tooltip: tooltip_text(step),
            linked,
        }
    };

    let mut rows: Vec<GanttRow> = head
        .iter()
        .enumerate()
        .map(|(row, &i)| row_for(i, row))
        .collect();
    let relaxed_offset = head.len() + marker_rows;
    rows.extend(
        relaxed
            .iter()
            .enumerate()
            .map(|(row, &i)| row_for(i, row + relaxed_offset)),
    );

    let helpful_actions = plan.has_helpful_actions().then(|| HelpfulActionsRow {
        top: head.len() as f64 * step_height,
        left: scale.to_view(plan.now),
        entries: plan
            .helpful_actions
            .iter()
            .map(|a| (helpful_action_text(a), a.action_name.clone()))
            .collect(),
    });

    GanttLayout {
        rows,
        helpful_actions,
        height: (displayed.len() + marker_rows) as f64 * step_height,
    }
}

/// Action name with a suffix marking which happening is suggested:
/// `├` for the start, `┤` for the end of a durative action.
pub fn helpful_action_text(action: &HelpfulAction) -> String {
    let suffix = match action.kind {
        HappeningType::Start => "├",
        HappeningType::End => "┤",
        HappeningType::Instantaneous => "",
    };
    format!("{}{suffix}", action.action_name)
}

pub fn render_gantt(layout: &GanttLayout, options: &PlanViewOptions) -> Vec<RenderCommand> {
    let step_height = options.plan_step_height;
    let bar_height = (step_height - 2.0 * BAR_INSET).max(1.0);
    let text_baseline = step_height / 2.0 + FONT_SIZE * 0.35;

    let mut commands = Vec::with_capacity(layout.rows.len() * 4 + 4);
    commands.push(RenderCommand::BeginGroup {
        id: "gantt".into(),
        label: Some("Gantt".into()),
    });

    for row in &layout.rows {
        let y = row.top + BAR_INSET;
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(row.left, y, row.head_width, bar_height),
            color: row.color,
            border_color: None,
            label: None,
            tooltip: Some(row.tooltip.clone()),
            link: None,
        });
        if row.relaxed_width > 0.0 {
            commands.push(RenderCommand::DrawRect {
                rect: Rect::new(row.left + row.head_width, y, row.relaxed_width, bar_height),
                color: ThemeToken::RelaxedHatch,
                border_color: Some(row.color),
                label: None,
                tooltip: Some(row.tooltip.clone()),
                link: None,
            });
        }

        let mut x = row.left + row.width() + LABEL_GAP;
        let (color, link) = if row.linked {
            (ThemeToken::LinkText, Some(Link::Action(row.action_name.clone())))
        } else {
            (ThemeToken::TextPrimary, None)
        };
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, row.top + text_baseline),
            text: row.action_name.clone(),
            color,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            link,
        });
        x += text_width(&row.action_name) + text_width(" ");
        if !row.label.trim().is_empty() {
            commands.push(RenderCommand::DrawText {
                position: Point::new(x, row.top + text_baseline),
                text: row.label.trim_end().to_string(),
                color: ThemeToken::TextPrimary,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
                link: None,
            });
        }
    }

    if let Some(helpful) = &layout.helpful_actions {
        let y = helpful.top + text_baseline;
        let mut x = helpful.left;
        let arrow = "▶ ";
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, y),
            text: arrow.into(),
            color: ThemeToken::HelpfulActionText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            link: None,
        });
        x += text_width(arrow);
        for (index, (text, action_name)) in helpful.entries.iter().enumerate() {
            let ordinal = format!("{}. ", index + 1);
            commands.push(RenderCommand::DrawText {
                position: Point::new(x, y),
                text: ordinal.clone(),
                color: ThemeToken::TextMuted,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
                link: None,
            });
            x += text_width(&ordinal);
            commands.push(RenderCommand::DrawText {
                position: Point::new(x, y),
                text: text.clone(),
                color: ThemeToken::HelpfulActionText,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
                link: Some(Link::HelpfulAction(action_name.clone())),
            });
            x += text_width(text) + text_width(" ");
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
