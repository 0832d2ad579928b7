pub mod listing;
pub mod reply;

pub use listing::ListFormat;
pub use reply::ReplyBuffer;
