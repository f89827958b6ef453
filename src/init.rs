use env_logger::Env;

/// 初始化日誌；`RUST_LOG` 優先於 `--debug`
pub fn init(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    // 測試中可能重複初始化，忽略錯誤
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
