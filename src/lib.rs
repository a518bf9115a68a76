//! rsagentdetect - User-Agent 高性能分类识别库
//! 将原始User-Agent请求头分类为结构化描述：来源类型（浏览器类别/爬虫/程序库等）、
//! 设备类别、平台名与家族、浏览器名+版本或爬虫名+家族。
//! 纯字符串到结构的分类，无任何网络调用；规则库为可注入、可版本化的数据资产。

pub mod compiler;
pub mod config;
pub mod corpus;
pub mod detector;
pub mod error;
pub mod result;
pub mod utils;

// 导出全局错误类型
pub use self::error::{AgentDetectError, AgentResult};

// 导出配置模块核心结构体与构建器
pub use crate::config::{CorpusConfig, CorpusOptions, CorpusOrigin, CustomConfigBuilder};

// 导出规则库模块核心接口与数据结构
pub use crate::corpus::{
    AgentCorpus, CorpusLoader, PlatformOverride, RobotEntry, RuleGroup, SignatureRule,
};

// 导出编译模块核心结构体
pub use crate::compiler::{CompiledCorpus, CorpusCompiler, CorpusStats};

// 导出分类结果与类型/设备标签常量
pub use crate::result::{
    AgentClassification, DEVICE_OTHER, DEVICE_PERSONAL_COMPUTER, DEVICE_SMARTPHONE, TYPE_BROWSER,
    TYPE_MOBILE_BROWSER, TYPE_ROBOT, UNKNOWN_LABEL,
};

// 导出通用工具模块核心能力
pub use crate::utils::{agent_from_headers, VersionExtractor};

// 导出检测模块核心接口（包含全局单例简化封装接口）
pub use crate::detector::{
    classify, classify_headers, init_global_detector, init_global_detector_with_corpus,
    AgentDetector,
};

// 嵌入式固化规则库 - 仅在开启embedded-corpus特性时编译
#[cfg(feature = "embedded-corpus")]
pub mod embedded_corpus {
    use once_cell::sync::Lazy;
    use std::sync::Arc;

    use crate::compiler::{CompiledCorpus, CorpusCompiler};
    use crate::config::CorpusOptions;
    use crate::corpus::CorpusLoader;

    /// 内置规则库JSON原文（随crate发布，装载期解析）
    pub(crate) static EMBEDDED_CORPUS_JSON: &str = include_str!("../data/agent_corpus.json");

    /// 全局懒加载的编译后规则库单例 - 运行期首次访问初始化，内存中仅一份实例，线程安全
    pub static EMBEDDED_COMPILED_CORPUS: Lazy<Arc<CompiledCorpus>> = Lazy::new(|| {
        let corpus = CorpusLoader::load_from_str(EMBEDDED_CORPUS_JSON).unwrap_or_else(|e| {
            eprintln!("致命错误: 内置规则库解析失败 - {}", e);
            panic!("规则库数据异常，请检查data/agent_corpus.json是否符合schema");
        });

        CorpusLoader::validate(&corpus, &CorpusOptions::default()).unwrap_or_else(|e| {
            eprintln!("致命错误: 内置规则库结构校验失败 - {}", e);
            panic!("规则库结构异常，请检查data/agent_corpus.json的分组与覆写表");
        });

        let compiled = CorpusCompiler::compile(&corpus).unwrap_or_else(|e| {
            eprintln!("致命错误: 内置规则库编译失败 - {}", e);
            panic!("规则库签名正则异常，请检查data/agent_corpus.json的pattern字段");
        });

        Arc::new(compiled)
    });
}
