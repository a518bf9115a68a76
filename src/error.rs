//! 全局错误类型定义
//! 仅规则库装载/编译阶段会产生错误；classify 本身永不失败（未识别输入降级为 unknown 字段）
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentDetectError {
    // ===================== 规则库相关错误 =====================
    /// 规则库来源不可读（文件缺失/IO失败等，携带路径上下文）
    #[error("规则库加载失败：{0}")]
    CorpusLoadError(String),

    /// 规则库JSON反序列化失败
    #[error("规则库JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    /// 规则库结构校验失败（空分组/缺失标签/重复爬虫签名/悬空覆写目标）
    #[error("规则库校验失败：{0}")]
    CorpusValidateError(String),

    // ===================== 编译相关错误 =====================
    /// 签名正则编译失败（携带分组与模式上下文）
    #[error("签名正则编译失败：{0}")]
    PatternCompileError(String),

    // ===================== 检测器相关错误 =====================
    /// 检测器未初始化（调用前未完成全局初始化）
    #[error("检测器未初始化: {0}")]
    DetectorNotInitialized(String),

    /// 检测器初始化失败
    #[error("检测器初始化失败: {0}")]
    DetectorInitError(String),

    // ===================== 基础错误 =====================
    /// 编译特性未启用（如关闭 embedded-corpus 时请求内置规则库）
    #[error("特性未启用：{0}")]
    FeatureDisabled(String),
}

// 全局Result类型
pub type AgentResult<T> = Result<T, AgentDetectError>;
