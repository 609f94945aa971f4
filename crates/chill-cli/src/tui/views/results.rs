use chill_core::fetch::{PageFetcher, RecommendationSource};
use chill_core::model::MovieCard;
use chill_core::Status;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::app::{App, CARD_HEIGHT};

pub fn render<F, R>(frame: &mut Frame, app: &App<F, R>, area: Rect)
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    let items = app.results.items();
    let title = match app.results.active_query() {
        Some(q) => format!(" Results for \"{q}\" ({}) ", items.len()),
        None => " Results ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if items.is_empty() {
        let (text, color) = match app.results.status() {
            Status::Loading => ("  Searching...", Color::Yellow),
            Status::Exhausted => ("  No movies found. Press / to try another search.", Color::DarkGray),
            Status::Error(_) => ("  Search failed. Press r to retry.", Color::Red),
            _ => ("  Press / and type a movie title.", Color::DarkGray),
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(app.viewport_cards)
        .flat_map(|(idx, item)| {
            card_lines(&MovieCard::from_item(item, &app.display), idx == app.selected)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Exactly `CARD_HEIGHT` lines per card.
pub fn card_lines(card: &MovieCard, selected: bool) -> Vec<Line<'static>> {
    let title_style = if selected {
        Style::default()
            .bg(Color::Indexed(236))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    let marker = if selected { "▸ " } else { "  " };

    let mut header = vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(card.title.clone(), title_style),
    ];
    let meta: Vec<&str> = [card.release.as_str(), card.duration.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !meta.is_empty() {
        header.push(Span::styled(
            format!("  {}", meta.join(" - ")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(ref rating) = card.rating {
        let color = if card.hot { Color::LightRed } else { Color::Yellow };
        let text = if card.hot {
            format!("  ★ {rating} hot")
        } else {
            format!("  ★ {rating}")
        };
        header.push(Span::styled(text, Style::default().fg(color)));
    }

    let genres = Line::from(Span::styled(
        format!("  {}", card.genres.join(", ")),
        Style::default().fg(Color::Magenta),
    ));
    let description = Line::from(Span::raw(format!("  {}", card.description)));
    let links = Line::from(Span::styled(
        format!(
            "  {}",
            card.links
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        ),
        Style::default().fg(Color::Blue),
    ));

    let lines = vec![Line::from(header), genres, description, links];
    debug_assert_eq!(lines.len(), CARD_HEIGHT);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chill_core::config::DisplayConfig;
    use chill_core::model::ResultItem;

    #[test]
    fn test_card_lines_height() {
        let item = ResultItem::new("Alien").with_source("imdb", Some(8.5), "u");
        let card = MovieCard::from_item(&item, &DisplayConfig::default());
        assert_eq!(card_lines(&card, false).len(), CARD_HEIGHT);
        assert_eq!(card_lines(&card, true).len(), CARD_HEIGHT);
    }

    #[test]
    fn test_card_header_shows_rating() {
        let item = ResultItem::new("Alien").with_source("imdb", Some(8.5), "u");
        let card = MovieCard::from_item(&item, &DisplayConfig::default());
        let header: String = card_lines(&card, false)[0]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(header.contains("Alien"));
        assert!(header.contains("★ 8.5 hot"));
    }
}
