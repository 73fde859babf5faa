pub mod cancel;
pub mod export;
pub mod live;
