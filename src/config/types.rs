use serde::{Deserialize, Serialize};

/// 審片階段資料夾的慣用名稱
pub const DEFAULT_BLINK_DIR: &str = "10_Blink";
/// 待處理階段資料夾的慣用名稱
pub const DEFAULT_DATA_DIR: &str = "20_Data";
pub const DEFAULT_FRAME_EXTENSIONS: [&str; 4] = ["fits", "fit", "fts", "xisf"];

/// 執行設定，可由 JSON 檔覆寫任一欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 僅供提示：來源資料夾名稱不同時記錄 debug 訊息，不影響執行
    pub blink_dir_name: String,
    /// 僅供提示：目的資料夾名稱不同時記錄 debug 訊息，不影響執行
    pub data_dir_name: String,
    /// 視為影格的副檔名（不分大小寫）
    pub frame_extensions: Vec<String>,
    /// 搬移後刪除來源中留下的空資料夾
    pub cleanup_empty_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blink_dir_name: DEFAULT_BLINK_DIR.to_string(),
            data_dir_name: DEFAULT_DATA_DIR.to_string(),
            frame_extensions: DEFAULT_FRAME_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            cleanup_empty_dirs: true,
        }
    }
}
