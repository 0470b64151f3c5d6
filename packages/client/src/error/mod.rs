pub mod body;
pub mod classification;
pub mod constructors;
pub mod types;

pub use body::parse_json_lenient;
pub use constructors::*;
pub use types::{BoxError, ErrorBody, FetchError, Kind, Result};
