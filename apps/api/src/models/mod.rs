pub mod activity;
pub mod asset;
pub mod deal;
pub mod engagement;
