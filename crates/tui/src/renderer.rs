use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use planviz_core::PlansView;
use planviz_core::views::swim_lanes::NAME_COLUMN_WIDTH;
use planviz_protocol::{Link, RenderCommand, ThemeToken, Viewport};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};

use crate::handle_events;

/// Logical pixels per terminal row.
const ROW_HEIGHT: f64 = 20.0;

fn theme_to_color(token: ThemeToken) -> Color {
    if let Some(rgb) = token
        .palette_hex()
        .and_then(planviz_protocol::Color::from_hex)
    {
        return Color::Rgb(
            (rgb.r * 255.0) as u8,
            (rgb.g * 255.0) as u8,
            (rgb.b * 255.0) as u8,
        );
    }
    match token {
        ThemeToken::RelaxedHatch => Color::Gray,
        ThemeToken::LaneBackground | ThemeToken::Background | ThemeToken::ChartBackground => {
            Color::Black
        }
        ThemeToken::LaneBorder | ThemeToken::Border | ThemeToken::ChartAxis => Color::DarkGray,
        ThemeToken::LaneHeaderBackground => Color::DarkGray,
        ThemeToken::LaneHeaderText | ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextMuted | ThemeToken::Loader => Color::Gray,
        ThemeToken::LinkText => Color::LightBlue,
        ThemeToken::ErrorText => Color::LightRed,
        ThemeToken::HelpfulActionText => Color::LightGreen,
        _ => Color::Gray,
    }
}

pub fn render_tui(plans: &mut PlansView) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut scroll_y: f64 = 0.0;
    let mut selected_link: Option<usize> = None;
    let mut status = String::new();

    loop {
        let term_size = terminal.size()?;
        let content_rows = term_size.height.saturating_sub(1);
        let viewport = Viewport {
            x: 0.0,
            y: scroll_y,
            width: f64::from(term_size.width),
            height: f64::from(content_rows) * ROW_HEIGHT,
            dpr: 1.0,
        };

        let selected_plan = plans.selected_plan().unwrap_or(0);
        let events = plans
            .plan_view_mut(selected_plan)
            .map(|view| view.on_viewport_changed(viewport))
            .unwrap_or_default();
        if let Some(message) = handle_events(plans, &events) {
            status = message;
        }

        let Some(view) = plans.plan_view(selected_plan) else {
            break;
        };
        let cmds = view.render();
        let links: Vec<&Link> = cmds.iter().filter_map(RenderCommand::link).collect();
        let total_width = NAME_COLUMN_WIDTH + view.options().display_width + 200.0;
        let focused = selected_link.and_then(|i| links.get(i).copied());

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(format!(
                    " planviz | plan {} of {} | ↑↓ scroll | tab link | enter select | q quit {status}",
                    selected_plan + 1,
                    plans.len(),
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content_area = Rect::new(0, 1, area.width, content_rows);
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, content_area);

            let col_scale = f64::from(content_area.width) / total_width;
            let buf = frame.buffer_mut();
            for cmd in &cmds {
                draw_command(buf, content_area, cmd, col_scale, scroll_y, focused);
            }
        })?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Up => scroll_y = (scroll_y - ROW_HEIGHT).max(0.0),
                    KeyCode::Down => scroll_y += ROW_HEIGHT,
                    KeyCode::Tab if !links.is_empty() => {
                        selected_link = Some(selected_link.map_or(0, |i| (i + 1) % links.len()));
                    }
                    KeyCode::Enter => {
                        if let Some(event) = focused.and_then(|link| view.activate(link)) {
                            let events = [event];
                            if let Some(message) = handle_events(plans, &events) {
                                status = message;
                            }
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => scroll_y += ROW_HEIGHT,
                    MouseEventKind::ScrollUp => scroll_y = (scroll_y - ROW_HEIGHT).max(0.0),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn draw_command(
    buf: &mut Buffer,
    area: Rect,
    cmd: &RenderCommand,
    col_scale: f64,
    scroll_y: f64,
    focused: Option<&Link>,
) {
    let to_row = |y: f64| ((y - scroll_y) / ROW_HEIGHT).floor();
    let mut put = |col: f64, row: f64, ch: char, fg: Color| {
        if col < 0.0 || row < 0.0 {
            return;
        }
        let (col, row) = (col as u16, row as u16);
        if col >= area.width || row >= area.height {
            return;
        }
        buf[(area.x + col, area.y + row)].set_char(ch).set_fg(fg);
    };

    match cmd {
        RenderCommand::DrawRect {
            rect,
            color,
            label,
            link,
            ..
        } => {
            // Backgrounds stay black; only bars are drawn.
            if matches!(
                color,
                ThemeToken::LaneBackground
                    | ThemeToken::Background
                    | ThemeToken::ChartBackground
                    | ThemeToken::LaneHeaderBackground
            ) {
                return;
            }
            let row = to_row(rect.y + rect.h / 2.0);
            let col = (rect.x * col_scale).floor();
            let width = (rect.w * col_scale).round().max(1.0) as usize;
            let fill = if *color == ThemeToken::RelaxedHatch { '░' } else { '█' };
            let fg = if link.is_some() && link.as_ref() == focused {
                Color::White
            } else {
                theme_to_color(*color)
            };
            let label = label.as_deref().unwrap_or("");
            let chars: Vec<char> = if width >= label.chars().count() + 2 && !label.is_empty() {
                format!(" {label:<w$}", w = width - 1).chars().collect()
            } else {
                std::iter::repeat_n(fill, width).collect()
            };
            for (i, ch) in chars.into_iter().take(width).enumerate() {
                put(col + i as f64, row, ch, fg);
            }
        }
        RenderCommand::DrawText {
            position,
            text,
            color,
            link,
            ..
        } => {
            let row = to_row(position.y - 1.0);
            let col = (position.x * col_scale).floor();
            let fg = if link.is_some() && link.as_ref() == focused {
                Color::Yellow
            } else {
                theme_to_color(*color)
            };
            for (i, ch) in text.chars().enumerate() {
                put(col + i as f64, row, ch, fg);
            }
        }
        _ => {}
    }
}
