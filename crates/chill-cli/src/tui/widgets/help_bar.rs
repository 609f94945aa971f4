use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::tui::app::InputMode;

/// Bottom help bar showing context-sensitive key bindings.
pub struct HelpBar<'a> {
    pub input_mode: &'a InputMode,
    pub can_retry: bool,
}

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::DarkGray);
        let key_style = Style::default().fg(Color::Cyan);

        let mut spans: Vec<Span> = match self.input_mode {
            InputMode::Normal => vec![
                Span::styled("j/k", key_style),
                Span::styled(" scroll  ", style),
                Span::styled("PgUp/PgDn", key_style),
                Span::styled(" page  ", style),
                Span::styled("g/G", key_style),
                Span::styled(" top/bottom  ", style),
                Span::styled("/", key_style),
                Span::styled(" search  ", style),
                Span::styled("Tab", key_style),
                Span::styled(" recommendations  ", style),
            ],
            InputMode::Search => vec![
                Span::styled("Enter", key_style),
                Span::styled(" search  ", style),
                Span::styled("Esc", key_style),
                Span::styled(" cancel", style),
            ],
        };

        if *self.input_mode == InputMode::Normal {
            if self.can_retry {
                spans.push(Span::styled("r", key_style));
                spans.push(Span::styled(" retry  ", style));
            }
            spans.push(Span::styled("q", key_style));
            spans.push(Span::styled(" quit", style));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
