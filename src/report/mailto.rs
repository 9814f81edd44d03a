// ==========================================
// 供应商 OTIF 监控 - mailto 链接
// ==========================================

use url::form_urlencoded::byte_serialize;

/// 百分号编码（空格编码为 %20 而不是 '+'）
///
/// 原文中的 '+' 已被编码为 %2B，因此替换 '+' 只影响空格
pub fn percent_encode(text: &str) -> String {
    byte_serialize(text.as_bytes()).collect::<String>().replace('+', "%20")
}

/// mailto:{to}?subject=...&body=...
pub fn build_mailto(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        to.trim(),
        percent_encode(subject),
        percent_encode(body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode_spaces_and_newlines() {
        assert_eq!(percent_encode("a b\nc"), "a%20b%0Ac");
        assert_eq!(percent_encode("1+1=2 & más"), "1%2B1%3D2%20%26%20m%C3%A1s");
    }

    #[test]
    fn test_build_mailto() {
        let link = build_mailto(" pedidos@norte.test ", "CLAIM - 2 Pending Orders", "Hola,\nOK");
        assert_eq!(
            link,
            "mailto:pedidos@norte.test?subject=CLAIM%20-%202%20Pending%20Orders&body=Hola%2C%0AOK"
        );
    }
}
