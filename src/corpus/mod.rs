//! 规则库模块：数据模型定义、装载与结构校验
mod loader;
mod model;

// 对外只导出具体内容，不导出模块名
pub use loader::CorpusLoader;
pub use model::{
    AgentCorpus, PlatformOverride, RobotEntry, RuleGroup, SignatureRule, CORPUS_SCHEMA_VERSION,
};
