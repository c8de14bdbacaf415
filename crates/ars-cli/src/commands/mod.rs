pub mod chat;
pub mod dispatch;
pub mod export;
pub mod research;
pub mod shared;
pub mod status;
