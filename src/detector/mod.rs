//! 检测模块：User-Agent分类核心逻辑
pub mod detector;
pub mod global;

// 导出核心接口
pub use self::detector::{classify, classify_headers, AgentDetector};
pub use self::global::{init_global_detector, init_global_detector_with_corpus};
