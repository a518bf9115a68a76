//! 工具模块：版本提取、请求头取值、安全小写化
mod agent_header;
mod safe_lower;
mod version_extractor;

// 对外只导出具体内容，不导出模块名
pub use agent_header::agent_from_headers;
pub use safe_lower::safe_lowercase;
pub use version_extractor::VersionExtractor;
