pub mod load;
pub mod save;
pub mod types;
pub mod validate;

pub use types::{
    Config, CutMode, DEFAULT_IGNORE_FRAME_CNT, DEFAULT_THREAD_NUM, DetectionPoints, Language,
    MARGIN_MAX, MAX_THREADS, MIN_THREADS, Margins, RunConfig, UserSettings,
};
