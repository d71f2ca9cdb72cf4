//! 黑邊測量與裁切：從畫面邊緣的固定 UI 線條推算四邊黑邊

pub mod main;

pub use main::{crop, crop_rect, measure_at, measure_margins};
