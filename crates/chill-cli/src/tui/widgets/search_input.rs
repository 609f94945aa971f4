use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// A text input widget for the movie query, with cursor and focus highlight.
pub struct SearchInput<'a> {
    pub text: &'a str,
    /// Byte offset of the cursor, always on a char boundary.
    pub cursor: usize,
    pub focused: bool,
    pub active_query: Option<&'a str>,
}

impl Widget for SearchInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };

        let title = match (self.focused, self.active_query) {
            (true, _) => " Search & Chill (Enter to search, Esc to cancel) ".to_string(),
            (false, Some(q)) => format!(" Search & Chill: \"{q}\" (press / to change) "),
            (false, None) => " Search & Chill (press /) ".to_string(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title);

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let cursor = self.cursor.min(self.text.len());
        let (before_cursor, after_cursor) = self.text.split_at(cursor);

        let mut spans = vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(before_cursor),
        ];

        if self.focused {
            let cursor_char = after_cursor.chars().next().unwrap_or(' ');
            spans.push(Span::styled(
                cursor_char.to_string(),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            if after_cursor.len() > cursor_char.len_utf8() {
                spans.push(Span::raw(&after_cursor[cursor_char.len_utf8()..]));
            }
        } else {
            spans.push(Span::raw(after_cursor));
        }

        let line = Line::from(spans);
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
