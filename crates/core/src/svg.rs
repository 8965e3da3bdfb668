//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use planviz_protocol::{Link, RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 200);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:12px">"#,
    ));

    // Relaxed-plan bars are hatched rather than filled.
    let hatch = if dark { "#5c5c5c" } else { "#c8c8c8" };
    svg.push_str(&format!(
        r#"<defs><pattern id="relaxed" width="6" height="6" patternUnits="userSpaceOnUse" patternTransform="rotate(45)"><line x1="0" y1="0" x2="0" y2="6" stroke="{hatch}" stroke-width="3"/></pattern></defs>"#,
    ));

    let bg = resolve_color(ThemeToken::Background, dark);
    svg.push_str(&format!(r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#));

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                tooltip,
                link,
            } => {
                open_link(&mut svg, link.as_ref());
                let fill = if *color == ThemeToken::RelaxedHatch {
                    "url(#relaxed)"
                } else {
                    resolve_color(*color, dark)
                };
                let stroke = border_color
                    .map(|b| format!(r#" stroke="{}" stroke-width="1""#, resolve_color(b, dark)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}"{stroke}>"#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
                if let Some(title) = tooltip.as_ref().or(label.as_ref()) {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(title)));
                }
                svg.push_str("</rect>");

                // Render text label if rect is wide enough
                if let Some(label) = label
                    && rect.w > 30.0
                {
                    let text_color = resolve_color(ThemeToken::TextPrimary, dark);
                    let tx = rect.x + 3.0;
                    let ty = rect.y + rect.h * 0.75;
                    let max_chars = (rect.w / 7.0) as usize;
                    let text = if label.chars().count() > max_chars && max_chars > 2 {
                        let truncated: String = label.chars().take(max_chars - 1).collect();
                        format!("{truncated}…")
                    } else {
                        label.to_string()
                    };
                    svg.push_str(&format!(
                        r#"<text x="{tx}" y="{ty}" fill="{text_color}" style="pointer-events:none">{}</text>"#,
                        escape_xml(&text),
                    ));
                }
                close_link(&mut svg, link.as_ref());
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = resolve_color(*color, dark);
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    from.x, from.y, to.x, to.y,
                ));
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
                link,
            } => {
                open_link(&mut svg, link.as_ref());
                let fill = resolve_color(*color, dark);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}" xml:space="preserve">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                ));
                close_link(&mut svg, link.as_ref());
            }
            RenderCommand::BeginGroup { id, .. } => {
                svg.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Links become anchors the host page can hook, e.g.
/// `<a class="action" data-action="drive">`.
fn open_link(svg: &mut String, link: Option<&Link>) {
    let (class, target) = match link {
        Some(Link::Action(name)) => ("action", name),
        Some(Link::HelpfulAction(name)) => ("helpful-action", name),
        None => return,
    };
    svg.push_str(&format!(
        r#"<a href="" class="{class}" data-action="{}" style="cursor:pointer">"#,
        escape_xml(target)
    ));
}

fn close_link(svg: &mut String, link: Option<&Link>) {
    if link.is_some() {
        svg.push_str("</a>");
    }
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if let Some(hex) = token.palette_hex() {
        return hex;
    }
    if dark {
        match token {
            ThemeToken::Border | ThemeToken::LaneBorder => "#303030",
            ThemeToken::TextPrimary | ThemeToken::LaneHeaderText => "#ececec",
            ThemeToken::TextMuted | ThemeToken::Loader => "#9e9e9e",
            ThemeToken::LinkText => "#64b5f6",
            ThemeToken::ErrorText => "#ef5350",
            ThemeToken::HelpfulActionText => "#81c784",
            ThemeToken::LaneBackground | ThemeToken::Background => "#181818",
            ThemeToken::LaneHeaderBackground | ThemeToken::ChartBackground => "#222222",
            ThemeToken::ChartAxis => "#757575",
            _ => "#616161",
        }
    } else {
        match token {
            ThemeToken::Border | ThemeToken::LaneBorder => "#dee2e6",
            ThemeToken::TextPrimary | ThemeToken::LaneHeaderText => "#1a1a2e",
            ThemeToken::TextMuted | ThemeToken::Loader => "#666677",
            ThemeToken::LinkText => "#1565c0",
            ThemeToken::ErrorText => "#c62828",
            ThemeToken::HelpfulActionText => "#2e7d32",
            ThemeToken::LaneBackground | ThemeToken::Background => "#ffffff",
            ThemeToken::LaneHeaderBackground | ThemeToken::ChartBackground => "#f1f3f5",
            ThemeToken::ChartAxis => "#868e96",
            _ => "#999999",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
