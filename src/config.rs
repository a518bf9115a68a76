//! 全局规则库配置管理

use std::path::PathBuf;

/// 规则库来源
#[derive(Debug, Clone)]
pub enum CorpusOrigin {
    Embedded,           // 内置规则库（编译期 embed）
    LocalFile(PathBuf), // 本地文件规则库（运行时加载）
}

/// 核心校验选项
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// 覆写表一致性校验：覆写目标不存在于浏览器分组时，true=报错，false=仅告警
    pub strict_overrides: bool,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            strict_overrides: true,
        }
    }
}

/// 完整规则库配置
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub origin: CorpusOrigin,
    pub options: CorpusOptions,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            origin: CorpusOrigin::Embedded,
            options: CorpusOptions::default(),
        }
    }
}

impl CorpusConfig {
    /// 内置规则库
    pub fn embedded() -> Self {
        Self::default()
    }

    /// 本地规则库文件
    pub fn local_file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: CorpusOrigin::LocalFile(path.into()),
            options: CorpusOptions::default(),
        }
    }
}

/// 自定义构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: CorpusConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(mut self, origin: CorpusOrigin) -> Self {
        self.config.origin = origin;
        self
    }

    pub fn strict_overrides(mut self, strict: bool) -> Self {
        self.config.options.strict_overrides = strict;
        self
    }

    pub fn build(self) -> CorpusConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_embedded_origin() {
        // 默认配置：内置规则库 + 严格覆写校验
        let config = CorpusConfig::default();
        assert!(matches!(config.origin, CorpusOrigin::Embedded));
        assert!(config.options.strict_overrides);
    }

    #[test]
    fn test_builder_overrides_options() {
        // 构建器链式配置：本地文件来源 + 关闭严格校验
        let config = CustomConfigBuilder::new()
            .origin(CorpusOrigin::LocalFile("corpus.json".into()))
            .strict_overrides(false)
            .build();

        assert!(matches!(config.origin, CorpusOrigin::LocalFile(_)));
        assert!(!config.options.strict_overrides);
    }
}
