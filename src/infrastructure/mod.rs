// 外部服务
pub mod quotes;

pub use quotes::{Quote, QuoteClient, QuoteError};
