//! 暫停剪輯：取樣畫面上的固定點位判斷暫停狀態，
//! 把暫停段剪掉或降級，其餘畫面依模式保留或折半加速

pub mod classifier;
pub mod emitter;
pub mod finalizer;
pub mod geometry;
pub mod main;
pub mod partition;
pub mod postprocess;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testutil;

pub use main::PauseCutter;
