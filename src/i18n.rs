// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认回退）和西班牙文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 已提供翻译文件的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "es"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "es"）
///
/// 未知语言代码回退到 "en"
pub fn set_locale(locale: &str) {
    let normalized = locale.trim();
    if SUPPORTED_LOCALES.contains(&normalized) {
        rust_i18n::set_locale(normalized);
    } else {
        tracing::warn!(locale = %normalized, "不支持的语言代码，回退到 en");
        rust_i18n::set_locale("en");
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use otif_monitor::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use otif_monitor::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/orders.xlsx")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
