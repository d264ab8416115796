use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Everything the status bar shows for one frame.
pub struct StatusView<'a> {
    pub eyes: &'a str,
    pub mouth: &'a str,
    pub tps: f64,
    /// Most recent log line, already formatted.
    pub log: Option<&'a str>,
}

pub fn status_line(view: &StatusView<'_>) -> Line<'static> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled("ABI", label.fg(Color::Cyan)),
        Span::raw(" | eyes "),
        Span::styled(view.eyes.to_string(), label),
        Span::raw(" | mouth "),
        Span::styled(view.mouth.to_string(), label),
        Span::raw(format!(" | {:.1} tps", view.tps)),
    ];
    if let Some(log) = view.log {
        spans.push(Span::styled(
            format!(" | {log}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

pub fn render_status(f: &mut Frame, area: Rect, view: &StatusView<'_>) {
    f.render_widget(Paragraph::new(status_line(view)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn shows_features_and_tps() {
        let view = StatusView {
            eyes: "Bored (active)",
            mouth: "Open (idle)",
            tps: 9.96,
            log: None,
        };
        assert_eq!(
            plain(&status_line(&view)),
            "ABI | eyes Bored (active) | mouth Open (idle) | 10.0 tps"
        );
    }

    #[test]
    fn appends_latest_log() {
        let view = StatusView {
            eyes: "-",
            mouth: "-",
            tps: 0.0,
            log: Some("WARN mien has no geometry"),
        };
        assert!(plain(&status_line(&view)).ends_with("| WARN mien has no geometry"));
    }
}
