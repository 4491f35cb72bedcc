pub mod context;
pub mod keywords;
pub mod timeframe;

pub use context::{interpret, InformationType, PreferredDocument, QueryContext};
pub use keywords::KeywordCategory;
pub use timeframe::{extract_timeframe, mentions_multi_year, relevant_years, Timeframe};
