pub mod card;
mod item;
mod page;
pub mod rating;

pub use card::{MovieCard, SourceLink};
pub use item::{RatingSource, ResultItem};
pub use page::{Cursor, PageRequest, ResultPage};
