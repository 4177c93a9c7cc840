pub mod month;

pub use month::{YearMonth, normalize_end, normalize_start};
