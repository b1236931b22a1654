pub mod session;
pub mod traits;

pub use session::SessionHistory;
pub use traits::HistorySink;
