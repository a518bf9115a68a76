//! 规则库装载与结构校验
//! 核心职责：
//! 1. 按配置来源装载规则库（内置/本地文件/字符串）
//! 2. 结构校验：空分组、缺失标签、重复爬虫签名、重复/悬空覆写目标
//! 3. 坏规则一律报错，绝不静默丢弃（运行期classify永不失败，故装载期必须严格）

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::config::{CorpusConfig, CorpusOptions, CorpusOrigin};
use crate::corpus::model::{AgentCorpus, RuleGroup, CORPUS_SCHEMA_VERSION};
use crate::error::{AgentDetectError, AgentResult};

#[derive(Debug, Clone, Default)]
pub struct CorpusLoader;

impl CorpusLoader {
    pub fn new() -> Self {
        Self
    }

    /// 按配置来源装载规则库（仅解析，不做结构校验）
    /// 校验统一收口在检测器构建路径（AgentDetector::with_corpus）
    pub fn load(&self, config: &CorpusConfig) -> AgentResult<AgentCorpus> {
        match &config.origin {
            CorpusOrigin::Embedded => {
                #[cfg(feature = "embedded-corpus")]
                {
                    let corpus = Self::load_from_str(crate::embedded_corpus::EMBEDDED_CORPUS_JSON)?;
                    log::debug!(
                        "Embedded corpus parsed | Rule count: {}",
                        corpus.rule_count()
                    );
                    Ok(corpus)
                }
                #[cfg(not(feature = "embedded-corpus"))]
                {
                    Err(AgentDetectError::FeatureDisabled(
                        "embedded-corpus feature is disabled, cannot use embedded corpus. Please enable this feature or load a local corpus file.".to_string()
                    ))
                }
            }
            CorpusOrigin::LocalFile(path) => Self::load_from_path(path),
        }
    }

    /// 从本地JSON文件装载（读失败携带路径上下文）
    pub fn load_from_path(path: &Path) -> AgentResult<AgentCorpus> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentDetectError::CorpusLoadError(format!(
                "本地规则库文件[{}]读取失败: {}",
                path.display(),
                e
            ))
        })?;
        let corpus = Self::load_from_str(&content)?;
        log::debug!(
            "Local corpus file parsed | Path: {} | Rule count: {}",
            path.display(),
            corpus.rule_count()
        );
        Ok(corpus)
    }

    /// 从JSON字符串装载
    pub fn load_from_str(json: &str) -> AgentResult<AgentCorpus> {
        let corpus: AgentCorpus = serde_json::from_str(json)?;
        Ok(corpus)
    }

    /// 规则库结构校验
    /// 覆写目标缺失时按 strict_overrides 决定报错或仅告警（规则库作者可能分发不带浏览器表的子集）
    pub fn validate(corpus: &AgentCorpus, options: &CorpusOptions) -> AgentResult<()> {
        if corpus.schema_version > CORPUS_SCHEMA_VERSION {
            return Err(AgentDetectError::CorpusValidateError(format!(
                "规则库schema_version={}高于当前支持版本{}",
                corpus.schema_version, CORPUS_SCHEMA_VERSION
            )));
        }

        // 爬虫精确签名：字段非空 + 全库唯一（重复即静默丢弃风险，直接报错）
        let mut seen_robots: FxHashSet<&str> = FxHashSet::default();
        for (idx, robot) in corpus.robots.iter().enumerate() {
            if robot.agent.is_empty() || robot.name.is_empty() || robot.family.is_empty() {
                return Err(AgentDetectError::CorpusValidateError(format!(
                    "robots表第{}项存在空字段（agent/name/family均必填）",
                    idx
                )));
            }
            if !seen_robots.insert(robot.agent.as_str()) {
                return Err(AgentDetectError::CorpusValidateError(format!(
                    "robots表存在重复签名: {}",
                    robot.agent
                )));
            }
        }

        // 三类分组表：分组名/规则列表非空；浏览器与平台表规则必须携带name标签
        Self::validate_table("browsers", &corpus.browsers, true)?;
        Self::validate_table("platforms", &corpus.platforms, true)?;
        Self::validate_table("devices", &corpus.devices, false)?;

        // 覆写表一致性：目标浏览器唯一，且必须出现在浏览器表中
        let browser_labels: FxHashSet<&str> = corpus
            .browsers
            .iter()
            .flat_map(|g| g.rules.iter())
            .filter_map(|r| r.name.as_deref())
            .collect();
        let mut seen_overrides: FxHashSet<&str> = FxHashSet::default();
        for entry in &corpus.overrides {
            if entry.browser.is_empty() || entry.platform.is_empty() || entry.family.is_empty() {
                return Err(AgentDetectError::CorpusValidateError(
                    "overrides表存在空字段（browser/platform/family均必填）".to_string(),
                ));
            }
            // 重复目标编译期会被后写覆盖，等同静默丢弃，装载期直接报错
            if !seen_overrides.insert(entry.browser.as_str()) {
                return Err(AgentDetectError::CorpusValidateError(format!(
                    "overrides表存在重复目标浏览器: {}",
                    entry.browser
                )));
            }
            if !browser_labels.contains(entry.browser.as_str()) {
                if options.strict_overrides {
                    return Err(AgentDetectError::CorpusValidateError(format!(
                        "overrides表目标浏览器[{}]未出现在任何browsers分组中",
                        entry.browser
                    )));
                }
                log::warn!(
                    "Override target [{}] not found in any browser group, entry kept as-is",
                    entry.browser
                );
            }
        }

        Ok(())
    }

    /// 单表结构校验公共逻辑
    fn validate_table(
        table_name: &str,
        table: &[RuleGroup],
        label_required: bool,
    ) -> AgentResult<()> {
        for group in table {
            if group.group.is_empty() {
                return Err(AgentDetectError::CorpusValidateError(format!(
                    "{}表存在空分组名",
                    table_name
                )));
            }
            if group.rules.is_empty() {
                return Err(AgentDetectError::CorpusValidateError(format!(
                    "{}表分组[{}]规则列表为空",
                    table_name, group.group
                )));
            }
            for (idx, rule) in group.rules.iter().enumerate() {
                if rule.pattern.is_empty() {
                    return Err(AgentDetectError::CorpusValidateError(format!(
                        "{}表分组[{}]第{}条规则pattern为空",
                        table_name, group.group, idx
                    )));
                }
                if label_required && rule.name.as_deref().unwrap_or("").is_empty() {
                    return Err(AgentDetectError::CorpusValidateError(format!(
                        "{}表分组[{}]第{}条规则缺少name标签",
                        table_name, group.group, idx
                    )));
                }
            }
        }
        Ok(())
    }
}
