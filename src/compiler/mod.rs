//! 编译模块：签名正则编译、准入网关构建、规则库折叠
mod compiler;
mod pattern;
mod prefilter;

// 对外只导出具体内容，不导出模块名
pub use compiler::{
    CompiledCorpus, CompiledGroup, CorpusCompiler, CorpusStats, PlatformPair, RobotSignature,
};
pub use pattern::CompiledRule;
pub use prefilter::{build_match_gate, MatchGate};
