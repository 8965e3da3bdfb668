use planviz_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};
use serde::{Deserialize, Serialize};

const LABEL_PADDING: f64 = 4.0;
const FONT_SIZE: f64 = 10.0;
/// Space reserved for the title row above and the legend row below the plot.
const TITLE_HEIGHT: f64 = FONT_SIZE + 2.0 * LABEL_PADDING;
const LEGEND_HEIGHT: f64 = FONT_SIZE + 2.0 * LABEL_PADDING;
const AXIS_MARGIN: f64 = 40.0;

/// One chart of numeric series sharing an x axis.
///
/// Each row is `[x, y1, y2, …]`; a `None` y breaks that series' line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePlot {
    pub title: String,
    pub unit: String,
    pub legend: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl LinePlot {
    pub fn series_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.len().saturating_sub(1))
            .max()
            .unwrap_or(0)
            .max(self.legend.len())
    }

    fn x_range(&self) -> Option<(f64, f64)> {
        range(self.rows.iter().filter_map(|row| row.first().copied().flatten()))
    }

    fn y_range(&self) -> Option<(f64, f64)> {
        range(
            self.rows
                .iter()
                .flat_map(|row| row.iter().skip(1).copied().flatten()),
        )
    }

    /// Polyline segments of one series, split where a value is missing.
    fn segments(&self, series: usize) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for row in &self.rows {
            let x = row.first().copied().flatten();
            let y = row.get(series + 1).copied().flatten();
            match (x, y) {
                (Some(x), Some(y)) => current.push((x, y)),
                _ if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                _ => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
        .map(|(lo, hi)| if lo == hi { (lo - 1.0, hi + 1.0) } else { (lo, hi) })
}

/// Chart size for a given plan display width.
pub fn line_plot_size(display_width: f64) -> (f64, f64) {
    (display_width + 100.0, (display_width / 2.0).round())
}

/// Render a line chart into a `width` × `height` box at the origin.
pub fn render_line_plot(plot: &LinePlot, id: &str, width: f64, height: f64) -> Vec<RenderCommand> {
    let mut commands = Vec::new();
    commands.push(RenderCommand::BeginGroup {
        id: id.to_string(),
        label: Some(plot.title.clone()),
    });

    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, width, height),
        color: ThemeToken::ChartBackground,
        border_color: Some(ThemeToken::LaneBorder),
        label: None,
        tooltip: None,
        link: None,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(width / 2.0, FONT_SIZE + LABEL_PADDING),
        text: plot.title.clone(),
        color: ThemeToken::TextPrimary,
        font_size: FONT_SIZE,
        align: TextAlign::Center,
        link: None,
    });

    let area = Rect::new(
        AXIS_MARGIN,
        TITLE_HEIGHT,
        (width - AXIS_MARGIN - LABEL_PADDING).max(1.0),
        (height - TITLE_HEIGHT - LEGEND_HEIGHT).max(1.0),
    );
    commands.push(RenderCommand::DrawLine {
        from: Point::new(area.x, area.y),
        to: Point::new(area.x, area.bottom()),
        color: ThemeToken::ChartAxis,
        width: 1.0,
    });
    commands.push(RenderCommand::DrawLine {
        from: Point::new(area.x, area.bottom()),
        to: Point::new(area.right(), area.bottom()),
        color: ThemeToken::ChartAxis,
        width: 1.0,
    });

    if let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (plot.x_range(), plot.y_range()) {
        let to_view = |(x, y): (f64, f64)| {
            Point::new(
                area.x + (x - x_lo) / (x_hi - x_lo) * area.w,
                area.bottom() - (y - y_lo) / (y_hi - y_lo) * area.h,
            )
        };

        for series in 0..plot.series_count() {
            let color = ThemeToken::ChartSeries((series * 7 % 24) as u8);
            for segment in plot.segments(series) {
                if let [only] = segment.as_slice() {
                    // A lone point between gaps still deserves a mark.
                    let p = to_view(*only);
                    commands.push(RenderCommand::DrawRect {
                        rect: Rect::new(p.x - 1.5, p.y - 1.5, 3.0, 3.0),
                        color,
                        border_color: None,
                        label: None,
                        tooltip: None,
                        link: None,
                    });
                    continue;
                }
                for pair in segment.windows(2) {
                    commands.push(RenderCommand::DrawLine {
                        from: to_view(pair[0]),
                        to: to_view(pair[1]),
                        color,
                        width: 1.5,
                    });
                }
            }
        }

        commands.push(RenderCommand::DrawText {
            position: Point::new(area.x - LABEL_PADDING, area.y + FONT_SIZE),
            text: format_value(y_hi, &plot.unit),
            color: ThemeToken::TextMuted,
            font_size: FONT_SIZE,
            align: TextAlign::Right,
            link: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(area.x - LABEL_PADDING, area.bottom()),
            text: format_value(y_lo, &plot.unit),
            color: ThemeToken::TextMuted,
            font_size: FONT_SIZE,
            align: TextAlign::Right,
            link: None,
        });
    }

    let mut x = AXIS_MARGIN;
    let legend_y = height - LABEL_PADDING;
    for (series, name) in plot.legend.iter().enumerate() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, legend_y),
            text: format!("■ {name}"),
            color: ThemeToken::ChartSeries((series * 7 % 24) as u8),
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            link: None,
        });
        x += (name.chars().count() as f64 + 3.0) * FONT_SIZE * 0.6;
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

/// Placeholder shown until the chart region scrolls into view.
pub fn render_loader(width: f64, height: f64) -> Vec<RenderCommand> {
    vec![
        RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, width, height),
            color: ThemeToken::ChartBackground,
            border_color: None,
            label: None,
            tooltip: None,
            link: None,
        },
        RenderCommand::DrawText {
            position: Point::new(width / 2.0, height / 2.0),
            text: "Loading…".into(),
            color: ThemeToken::Loader,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
            link: None,
        },
    ]
}

fn format_value(value: f64, unit: &str) -> String {
    let number = if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    if unit.is_empty() {
        number
    } else {
        format!("{number} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot(rows: Vec<Vec<Option<f64>>>) -> LinePlot {
        LinePlot {
            title: "fuel".into(),
            unit: "l".into(),
            legend: vec!["truck1".into(), "truck2".into()],
            rows,
        }
    }

    fn lines_of(commands: &[RenderCommand], token: ThemeToken) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawLine { color, .. } if *color == token))
            .count()
    }

    #[test]
    fn size_follows_display_width() {
        assert_eq!(line_plot_size(300.0), (400.0, 150.0));
        assert_eq!(line_plot_size(301.0), (401.0, 151.0));
    }

    #[test]
    fn missing_values_break_the_line() {
        let p = plot(vec![
            vec![Some(0.0), Some(10.0), Some(1.0)],
            vec![Some(1.0), None, Some(2.0)],
            vec![Some(2.0), Some(8.0), Some(3.0)],
            vec![Some(3.0), Some(6.0), Some(4.0)],
        ]);
        assert_eq!(p.segments(0), vec![vec![(0.0, 10.0)], vec![(2.0, 8.0), (3.0, 6.0)]]);
        assert_eq!(p.segments(1).len(), 1);

        let cmds = render_line_plot(&p, "plot-0", 400.0, 200.0);
        // Series 0: a lone point plus one segment; series 1: three segments.
        assert_eq!(lines_of(&cmds, ThemeToken::ChartSeries(0)), 1);
        assert_eq!(lines_of(&cmds, ThemeToken::ChartSeries(7)), 3);
        assert_eq!(lines_of(&cmds, ThemeToken::ChartAxis), 2);
    }

    #[test]
    fn points_stay_inside_the_box() {
        let p = plot(vec![
            vec![Some(-5.0), Some(100.0)],
            vec![Some(5.0), Some(-100.0)],
        ]);
        let cmds = render_line_plot(&p, "plot-0", 300.0, 150.0);
        for cmd in &cmds {
            if let RenderCommand::DrawLine { from, to, .. } = cmd {
                for point in [from, to] {
                    assert!((0.0..=300.0).contains(&point.x));
                    assert!((0.0..=150.0).contains(&point.y));
                }
            }
        }
    }

    #[test]
    fn title_unit_and_legend_are_labelled() {
        let p = plot(vec![vec![Some(0.0), Some(1.5)], vec![Some(1.0), Some(2.5)]]);
        let texts: Vec<String> = render_line_plot(&p, "plot-0", 300.0, 150.0)
            .into_iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"fuel".to_string()));
        assert!(texts.contains(&"2.50 l".to_string()));
        assert!(texts.contains(&"■ truck2".to_string()));
    }

    #[test]
    fn empty_plot_draws_frame_only() {
        let cmds = render_line_plot(&plot(vec![]), "plot-0", 300.0, 150.0);
        assert_eq!(lines_of(&cmds, ThemeToken::ChartSeries(0)), 0);
        assert!(matches!(cmds.first(), Some(RenderCommand::BeginGroup { .. })));
        assert!(matches!(cmds.last(), Some(RenderCommand::EndGroup)));
    }
}
