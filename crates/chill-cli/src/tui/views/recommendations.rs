use chill_core::fetch::{PageFetcher, RecommendationSource};
use chill_core::model::MovieCard;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::App;

/// Whether the side panel takes up room: open and with something to show.
pub fn visible<F, R>(app: &App<F, R>) -> bool
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    app.recs_open && !app.recommendations.items().is_empty()
}

pub fn render<F, R>(frame: &mut Frame, app: &App<F, R>, area: Rect)
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Recommendations ",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let lines: Vec<Line> = app
        .recommendations
        .items()
        .iter()
        .map(|item| MovieCard::from_item(item, &app.display))
        .flat_map(|card| {
            let rating = card.rating.map(|r| format!(" ★ {r}")).unwrap_or_default();
            [
                Line::from(vec![
                    Span::styled(card.title, Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(rating, Style::default().fg(Color::Yellow)),
                ]),
                Line::from(Span::styled(
                    format!("{} {}", card.release, card.duration),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::default(),
            ]
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}
