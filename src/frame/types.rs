use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

/// 影格類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Light,
    Dark,
    Flat,
    Bias,
}

impl FrameKind {
    /// 依檔頭文字判斷類型，只看第一個字（`Light Frame`、`Flat Field` 等）
    ///
    /// `Dark Flat` 這類混合類型不會被辨識
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace().map(str::to_ascii_lowercase);
        let first = words.next()?;
        let second = words.next();

        let kind = match first.as_str() {
            "light" | "science" => Self::Light,
            "dark" => Self::Dark,
            "flat" => Self::Flat,
            "bias" | "offset" | "zero" => Self::Bias,
            _ => return None,
        };

        match second.as_deref() {
            Some("dark" | "flat" | "light" | "bias") => None,
            _ => Some(kind),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Flat => "flat",
            Self::Bias => "bias",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 相機感測器設定，暗場比對的依據
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings {
    pub camera: String,
    pub set_temp: f64,
    pub gain: f64,
    pub offset: f64,
    pub readout_mode: String,
}

/// 單一影格檔案，讀取後不再變動
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub path: PathBuf,
    pub kind: FrameKind,
    /// Bias 可能沒有感測器設定
    pub sensor: Option<SensorSettings>,
    pub filter: Option<String>,
    /// 曝光秒數
    pub exposure: Option<f64>,
}

impl Frame {
    #[must_use]
    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map_or_else(|| self.path.to_string_lossy(), |n| n.to_string_lossy())
    }
}

/// 同一資料夾（不遞迴）內的所有影格
#[derive(Debug, Clone, Default)]
pub struct DirectoryGroup {
    pub directory: PathBuf,
    /// 相對於來源根目錄的路徑
    pub relative_path: PathBuf,
    /// 依檔名排序
    pub frames: Vec<Frame>,
    /// 資料夾內所有一般檔案，也就是搬移時的檔案集合
    pub files: Vec<PathBuf>,
    /// 檔頭無法讀取的影格檔
    pub unreadable: Vec<PathBuf>,
    /// 類型不參與比對的影格檔，仍隨資料夾一起搬移
    pub ignored: Vec<PathBuf>,
}

impl DirectoryGroup {
    pub fn frames_of(&self, kind: FrameKind) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(move |f| f.kind == kind)
    }

    pub fn lights(&self) -> impl Iterator<Item = &Frame> {
        self.frames_of(FrameKind::Light)
    }

    #[must_use]
    pub fn count_of(&self, kind: FrameKind) -> usize {
        self.frames_of(kind).count()
    }

    /// 給使用者看的相對路徑，來源根目錄本身顯示為 `.`
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.relative_path.as_os_str().is_empty() {
            ".".to_string()
        } else {
            self.relative_path.display().to_string()
        }
    }
}
