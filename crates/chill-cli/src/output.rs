use chill_core::model::MovieCard;
use chill_core::Status;
use owo_colors::OwoColorize;
use serde::Serialize;

/// `chill search --json` payload.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub status: &'static str,
    pub pages: usize,
    pub results: Vec<MovieCard>,
}

pub fn print_cards(cards: &[MovieCard]) {
    if cards.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }
    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_card(card);
    }
}

fn print_card(card: &MovieCard) {
    let rating = match &card.rating {
        Some(r) if card.hot => format!("★ {r} 🔥").yellow().to_string(),
        Some(r) => format!("★ {r}"),
        None => "no rating".dimmed().to_string(),
    };
    println!("{}  {}", heading(card).bold(), rating);

    let meta = meta_line(card);
    if !meta.is_empty() {
        println!("  {}", meta.dimmed());
    }
    if !card.description.is_empty() {
        println!("  {}", card.description);
    }
    for link in &card.links {
        println!("  {} {}", format!("{}:", link.name).dimmed(), link.url.cyan());
    }
}

/// `Title (1999)`, or just the title when the release is unknown.
fn heading(card: &MovieCard) -> String {
    if card.release.is_empty() {
        card.title.clone()
    } else {
        format!("{} ({})", card.title, card.release)
    }
}

/// `2h 16m · Action, Sci-Fi`
fn meta_line(card: &MovieCard) -> String {
    let genres = card.genres.join(", ");
    [card.duration.as_str(), genres.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}

pub fn print_footer(status: &Status, count: usize) {
    let line = match status {
        Status::LoadedWithMore => format!("{count} results shown, more available (--pages N or --all)"),
        Status::Exhausted => format!("{count} results, end of list"),
        Status::Error(failure) => format!("{count} results before error: {}", failure.message),
        other => format!("{count} results ({other})"),
    };
    println!();
    println!("{}", line.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chill_core::config::DisplayConfig;
    use chill_core::model::ResultItem;

    fn card(release: &str, duration: Option<u32>, genres: &[&str]) -> MovieCard {
        let mut item = ResultItem::new("The Matrix");
        item.release = release.into();
        item.duration = duration;
        item.genres = genres.iter().map(|g| g.to_string()).collect();
        MovieCard::from_item(&item, &DisplayConfig::default())
    }

    #[test]
    fn test_heading_with_release() {
        assert_eq!(heading(&card("1999", None, &[])), "The Matrix (1999)");
        assert_eq!(heading(&card("", None, &[])), "The Matrix");
    }

    #[test]
    fn test_meta_line_skips_missing_parts() {
        assert_eq!(
            meta_line(&card("", Some(136), &["Action", "Sci-Fi"])),
            "2h 16m · Action, Sci-Fi"
        );
        assert_eq!(meta_line(&card("", None, &["Drama"])), "Drama");
        assert_eq!(meta_line(&card("", None, &[])), "");
    }

    #[test]
    fn test_search_output_json_shape() {
        let out = SearchOutput {
            query: "matrix".into(),
            status: Status::Exhausted.label(),
            pages: 2,
            results: vec![card("1999", Some(136), &[])],
        };
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["query"], "matrix");
        assert_eq!(value["pages"], 2);
        assert_eq!(value["results"][0]["title"], "The Matrix");
        assert_eq!(value["results"][0]["duration"], "2h 16m");
    }
}
