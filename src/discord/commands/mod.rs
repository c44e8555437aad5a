mod stats;
mod track;
mod tracked;
mod untrack;

pub use stats::stats;
pub use track::track;
pub use tracked::tracked;
pub use untrack::untrack;
