pub mod app;
mod views;
mod widgets;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chill_core::config::ChillConfig;
use chill_core::fetch::{PageFetcher, RecommendationSource, SearchClient};
use chill_core::recommend::recommendation_loader;
use chill_core::retry::RetryPolicy;
use chill_core::scroll::{ScrollObserver, ScrollSignal, ScrollTrigger};
use chill_core::{Loader, Status};
use crossterm::event::{self as ct_event, Event};
use ratatui::{
    layout::{Constraint, Layout},
    DefaultTerminal, Frame,
};

use self::app::{App, InputMode};
use self::widgets::{help_bar::HelpBar, search_input::SearchInput};

/// Entry point for the interactive results browser.
pub async fn run_tui(config: &ChillConfig, initial_query: Option<String>) -> Result<()> {
    let client =
        Arc::new(SearchClient::from_config(config).context("failed to create search client")?);
    let policy = RetryPolicy::from_config(&config.pagination);

    let mut app = App::new(
        Loader::new(Arc::clone(&client), policy),
        recommendation_loader(client, policy),
        config.display.clone(),
    );
    if let Some(query) = initial_query {
        app.submit_query(&query);
    } else {
        app.input_mode = InputMode::Search;
    }

    let trigger = ScrollTrigger::from_config(&config.pagination);
    let signal = ScrollSignal::new();

    let mut terminal = ratatui::init();
    // The observer lives exactly as long as the results view.
    let result = {
        let mut observer = signal.observe();
        run_loop(&mut terminal, &mut app, &signal, &mut observer, trigger)
    };
    ratatui::restore();

    result
}

fn run_loop<F, R>(
    terminal: &mut DefaultTerminal,
    app: &mut App<F, R>,
    signal: &ScrollSignal,
    observer: &mut ScrollObserver,
    trigger: ScrollTrigger,
) -> Result<()>
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    loop {
        app.sync_query();
        app.refresh(&trigger);

        // 3 rows search box, 2 rows of list border, 1 status, 1 help
        let size = terminal.size()?;
        app.set_viewport_rows(size.height.saturating_sub(7));

        terminal.draw(|frame| render(frame, app))?;

        let position = app.scroll_position();
        if signal.current() != position {
            signal.publish(position);
        }
        while let Some(position) = observer.poll_change() {
            trigger.on_scroll(position, &mut app.results);
        }

        // Poll for keyboard events (50ms timeout for responsive UI)
        if ct_event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = ct_event::read()? {
                app.handle_key(key);
            }
        }

        app.tick_error();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render<F, R>(frame: &mut Frame, app: &App<F, R>)
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    let layout = Layout::vertical([
        Constraint::Length(3), // search bar
        Constraint::Min(5),    // results (+ recommendations)
        Constraint::Length(1), // status line
        Constraint::Length(1), // help bar
    ])
    .split(frame.area());

    frame.render_widget(
        SearchInput {
            text: &app.search_input,
            cursor: app.search_cursor,
            focused: app.input_mode == InputMode::Search,
            active_query: app.results.active_query(),
        },
        layout[0],
    );

    if views::recommendations::visible(app) {
        let [results_area, recs_area] =
            Layout::horizontal([Constraint::Min(40), Constraint::Length(40)]).areas(layout[1]);
        views::results::render(frame, app, results_area);
        views::recommendations::render(frame, app, recs_area);
    } else {
        views::results::render(frame, app, layout[1]);
    }

    render_status_line(frame, app, layout[2]);

    frame.render_widget(
        HelpBar {
            input_mode: &app.input_mode,
            can_retry: matches!(app.results.status(), Status::Error(_)),
        },
        layout[3],
    );

    if let Some(ref msg) = app.error_message {
        render_error_toast(frame, msg);
    }
}

fn render_status_line<F, R>(frame: &mut Frame, app: &App<F, R>, area: ratatui::layout::Rect)
where
    F: PageFetcher + 'static,
    R: RecommendationSource + 'static,
{
    use ratatui::{
        style::{Color, Style},
        widgets::Paragraph,
    };

    let color = match app.results.status() {
        Status::Loading => Color::Yellow,
        Status::Error(_) => Color::Red,
        Status::Exhausted => Color::Green,
        _ => Color::DarkGray,
    };
    frame.render_widget(
        Paragraph::new(format!(" {}", app.status_line())).style(Style::default().fg(color)),
        area,
    );
}

fn render_error_toast(frame: &mut Frame, msg: &str) {
    use ratatui::{
        layout::Flex,
        style::{Color, Style},
        widgets::{Block, Borders, Clear, Paragraph},
    };

    let area = frame.area();
    let [toast_area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);
    let [toast_area] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::End)
        .areas(toast_area);

    frame.render_widget(Clear, toast_area);
    let toast = Paragraph::new(format!(" ✗ {msg}"))
        .style(Style::default().fg(Color::White).bg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error (any key to dismiss) "),
        );
    frame.render_widget(toast, toast_area);
}
