//! 请求头取值辅助：从HeaderMap中提取User-Agent原文
use http::header::USER_AGENT;
use http::HeaderMap;

/// 提取User-Agent请求头原文
/// 缺失或含非可见ASCII字节时回退空串，空串走分类器的未知兜底语义
#[inline]
pub fn agent_from_headers(headers: &HeaderMap) -> &str {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_present_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"),
        );
        assert_eq!(
            agent_from_headers(&headers),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"
        );
    }

    #[test]
    fn test_missing_user_agent() {
        let headers = HeaderMap::new();
        assert_eq!(agent_from_headers(&headers), "");
    }

    #[test]
    fn test_opaque_bytes_fall_back_to_empty() {
        // HeaderValue允许不透明字节，但to_str会拒绝，取值侧统一回退空串
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_bytes(&[0xE4, 0xBD, 0xA0]).unwrap());
        assert_eq!(agent_from_headers(&headers), "");
    }
}
