//! Types that represent the data model: the `Book` rows of an export and the records derived from
//! them while working out series progress and weights.
mod book;
mod progress;
mod weighted;

pub use book::{Book, Shelf};
pub use progress::{
    ActiveSeries, BookProgress, BookProgressStatus, SeriesInfo, SeriesProgress,
    SeriesProgressionTimeline,
};
pub use weighted::{BookType, CuratedBook, WeightedBook};
