use serde::{Deserialize, Serialize};

/// 黑邊上限（px），超過視為測量失敗
pub const MARGIN_MAX: u32 = 500;
pub const MIN_THREADS: usize = 1;
pub const MAX_THREADS: usize = 16;
pub const DEFAULT_THREAD_NUM: usize = 4;
pub const DEFAULT_IGNORE_FRAME_CNT: usize = 0;

/// 四種剪輯策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutMode {
    /// 一般模式：無效暫停只保留音訊
    NormalAudioOnly,
    /// 一般模式：無效暫停連影片一起保留
    NormalKeepInvalid,
    /// 懶人模式：剪掉暫停但保留有效暫停，其餘 2 倍速
    LazyKeepValid,
    /// 懶人模式：剪掉全部暫停，其餘 2 倍速
    LazyCutAll,
}

impl CutMode {
    #[must_use]
    pub const fn is_lazy(self) -> bool {
        matches!(self, Self::LazyKeepValid | Self::LazyCutAll)
    }

    #[must_use]
    pub const fn display_key(self) -> &'static str {
        match self {
            Self::NormalAudioOnly => "mode.normal_audio_only",
            Self::NormalKeepInvalid => "mode.normal_keep_invalid",
            Self::LazyKeepValid => "mode.lazy_keep_valid",
            Self::LazyCutAll => "mode.lazy_cut_all",
        }
    }

    pub const ALL: [Self; 4] = [
        Self::NormalAudioOnly,
        Self::NormalKeepInvalid,
        Self::LazyKeepValid,
        Self::LazyCutAll,
    ];
}

/// 錄影畫面四邊的黑邊（px）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// 手動指定的偵測點，取代自動幾何推算
///
/// 所有座標皆為 (y, x)。group_1 依序為加速右點、加速左點、
/// 右上暫停中點、右上暫停左點；group_2 依序為畫面中央暫停的
/// 左白點、黑點、中白點、右白點。有效暫停四點共用同一個 y。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionPoints {
    pub group_1: [[u32; 2]; 4],
    pub group_2: [[u32; 2]; 4],
    pub valid_pause_y: u32,
    pub valid_pause_x: [u32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    EnUs,
    ZhTw,
    JaJp,
}

impl Language {
    #[must_use]
    pub const fn locale(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
            Self::JaJp => "ja-JP",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EnUs => "English",
            Self::ZhTw => "繁體中文",
            Self::JaJp => "日本語",
        }
    }

    pub const ALL: [Self; 3] = [Self::EnUs, Self::ZhTw, Self::JaJp];
}

/// 持久化的使用者設定（settings.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub mode: CutMode,
    pub margins: Margins,
    pub thread_num: usize,
    pub ignore_frame_cnt: usize,
    pub manual_detection: bool,
    pub language: Language,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            mode: CutMode::NormalAudioOnly,
            margins: Margins::default(),
            thread_num: DEFAULT_THREAD_NUM,
            ignore_frame_cnt: DEFAULT_IGNORE_FRAME_CNT,
            manual_detection: false,
            language: Language::EnUs,
        }
    }
}

/// 單次剪輯執行的完整參數，建構一次後唯讀傳遞
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: CutMode,
    pub margins: Margins,
    pub thread_num: usize,
    pub ignore_frame_cnt: usize,
    pub start_second: u64,
    pub end_second: u64,
    pub manual_points: Option<DetectionPoints>,
}

impl RunConfig {
    #[must_use]
    pub fn from_settings(settings: &UserSettings, start_second: u64, end_second: u64) -> Self {
        Self {
            mode: settings.mode,
            margins: settings.margins,
            thread_num: settings.thread_num,
            ignore_frame_cnt: settings.ignore_frame_cnt,
            start_second,
            end_second,
            manual_points: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
    pub detection_points: Option<DetectionPoints>,
}
