//! 规则库编译器：把解析后的规则库折叠为可执行签名表
//! 装载期完成全部正则编译与网关构建，运行期分类零失败
use rustc_hash::FxHashMap;

use crate::compiler::pattern::CompiledRule;
use crate::compiler::prefilter::MatchGate;
use crate::corpus::{AgentCorpus, RuleGroup};
use crate::error::AgentResult;

/// 爬虫精确签名的载荷（命中后直接产出）
#[derive(Debug, Clone)]
pub struct RobotSignature {
    pub name: String,
    pub family: String,
}

/// 平台覆写载荷：browserName命中覆写表时强制使用的平台对
#[derive(Debug, Clone)]
pub struct PlatformPair {
    pub platform: String,
    pub family: String,
}

/// 编译后的签名分组，保持规则库作者声明的规则次序
#[derive(Debug, Clone)]
pub struct CompiledGroup {
    pub name: String,
    pub rules: Vec<CompiledRule>,
}

/// 规则库编译统计
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    pub robot_count: usize,
    pub browser_group_count: usize,
    pub browser_rule_count: usize,
    pub platform_rule_count: usize,
    pub device_rule_count: usize,
    pub override_count: usize,
    /// 携带非Open网关的规则数（剪枝覆盖率观测用）
    pub gated_rule_count: usize,
}

/// 编译后的完整规则库（只读，Arc共享给所有检测线程）
#[derive(Debug, Clone)]
pub struct CompiledCorpus {
    robot_map: FxHashMap<String, RobotSignature>,
    browser_table: Vec<CompiledGroup>,
    platform_table: Vec<CompiledGroup>,
    device_table: Vec<CompiledGroup>,
    override_map: FxHashMap<String, PlatformPair>,
    stats: CorpusStats,
}

impl CompiledCorpus {
    /// 爬虫精确签名查找（大小写敏感的整串比对）
    #[inline(always)]
    pub fn robot_lookup(&self, agent: &str) -> Option<&RobotSignature> {
        self.robot_map.get(agent)
    }

    #[inline(always)]
    pub fn browser_groups(&self) -> &[CompiledGroup] {
        &self.browser_table
    }

    #[inline(always)]
    pub fn platform_groups(&self) -> &[CompiledGroup] {
        &self.platform_table
    }

    #[inline(always)]
    pub fn device_groups(&self) -> &[CompiledGroup] {
        &self.device_table
    }

    /// 平台覆写查找（key为浏览器标签）
    #[inline(always)]
    pub fn override_for(&self, browser_name: &str) -> Option<&PlatformPair> {
        self.override_map.get(browser_name)
    }

    #[inline(always)]
    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorpusCompiler;

impl CorpusCompiler {
    /// 编译完整规则库，任一签名正则非法即整体失败
    pub fn compile(corpus: &AgentCorpus) -> AgentResult<CompiledCorpus> {
        let mut robot_map =
            FxHashMap::with_capacity_and_hasher(corpus.robots.len(), Default::default());
        for robot in &corpus.robots {
            robot_map.insert(
                robot.agent.clone(),
                RobotSignature {
                    name: robot.name.clone(),
                    family: robot.family.clone(),
                },
            );
        }

        let browser_table = Self::compile_table("browsers", &corpus.browsers)?;
        let platform_table = Self::compile_table("platforms", &corpus.platforms)?;
        let device_table = Self::compile_table("devices", &corpus.devices)?;

        let mut override_map =
            FxHashMap::with_capacity_and_hasher(corpus.overrides.len(), Default::default());
        for entry in &corpus.overrides {
            override_map.insert(
                entry.browser.clone(),
                PlatformPair {
                    platform: entry.platform.clone(),
                    family: entry.family.clone(),
                },
            );
        }

        let gated_rule_count = browser_table
            .iter()
            .chain(platform_table.iter())
            .chain(device_table.iter())
            .flat_map(|g| g.rules.iter())
            .filter(|r| !matches!(r.gate_kind(), MatchGate::Open))
            .count();

        let stats = CorpusStats {
            robot_count: robot_map.len(),
            browser_group_count: browser_table.len(),
            browser_rule_count: browser_table.iter().map(|g| g.rules.len()).sum(),
            platform_rule_count: platform_table.iter().map(|g| g.rules.len()).sum(),
            device_rule_count: device_table.iter().map(|g| g.rules.len()).sum(),
            override_count: override_map.len(),
            gated_rule_count,
        };

        log::info!(
            "Corpus compiled | Robots: {} | Browser rules: {} | Platform rules: {} | Device rules: {} | Overrides: {} | Gated rules: {}",
            stats.robot_count,
            stats.browser_rule_count,
            stats.platform_rule_count,
            stats.device_rule_count,
            stats.override_count,
            stats.gated_rule_count
        );

        Ok(CompiledCorpus {
            robot_map,
            browser_table,
            platform_table,
            device_table,
            override_map,
            stats,
        })
    }

    /// 逐分组编译单张签名表，保持作者声明次序
    fn compile_table(table_name: &str, table: &[RuleGroup]) -> AgentResult<Vec<CompiledGroup>> {
        let mut compiled = Vec::with_capacity(table.len());
        for group in table {
            let context = format!("{}表分组[{}]", table_name, group.group);
            let mut rules = Vec::with_capacity(group.rules.len());
            for rule in &group.rules {
                rules.push(CompiledRule::compile(rule, &context)?);
            }
            compiled.push(CompiledGroup {
                name: group.group.clone(),
                rules,
            });
        }
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusLoader;
    use crate::error::AgentDetectError;

    fn sample_corpus() -> AgentCorpus {
        CorpusLoader::load_from_str(
            r#"{
            "robots": [
                {"agent": "Googlebot/2.1 (+http://www.google.com/bot.html)", "name": "Googlebot/2.1", "family": "Googlebot"}
            ],
            "browsers": [
                {"group": "Browser", "rules": [
                    {"pattern": "Edg/([0-9.]+)", "name": "Microsoft Edge"},
                    {"pattern": "Chrome/([0-9.]+)", "name": "Chrome"}
                ]}
            ],
            "platforms": [
                {"group": "Windows", "rules": [{"pattern": "Windows NT 10", "name": "Windows 10"}]}
            ],
            "devices": [
                {"group": "Tablet", "rules": [{"pattern": "iPad"}]}
            ],
            "overrides": [
                {"browser": "Chrome", "platform": "Windows", "family": "Windows"}
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_compile_preserves_rule_order() {
        // 分组内规则次序即优先级，编译后必须原样保留
        let compiled = CorpusCompiler::compile(&sample_corpus()).unwrap();
        let browser = &compiled.browser_groups()[0];
        assert_eq!(browser.rules[0].name(), Some("Microsoft Edge"));
        assert_eq!(browser.rules[1].name(), Some("Chrome"));
    }

    #[test]
    fn test_compile_builds_exact_and_override_maps() {
        let compiled = CorpusCompiler::compile(&sample_corpus()).unwrap();

        let robot = compiled
            .robot_lookup("Googlebot/2.1 (+http://www.google.com/bot.html)")
            .unwrap();
        assert_eq!(robot.family, "Googlebot");
        // 精确签名大小写敏感，近似串不命中
        assert!(compiled.robot_lookup("googlebot/2.1 (+http://www.google.com/bot.html)").is_none());

        let pair = compiled.override_for("Chrome").unwrap();
        assert_eq!(pair.platform, "Windows");
        assert!(compiled.override_for("Firefox").is_none());
    }

    #[test]
    fn test_compile_error_carries_group_context() {
        let corpus = CorpusLoader::load_from_str(
            r#"{"browsers": [{"group": "Browser", "rules": [{"pattern": "Chrome/(", "name": "Chrome"}]}]}"#,
        )
        .unwrap();

        match CorpusCompiler::compile(&corpus).unwrap_err() {
            AgentDetectError::PatternCompileError(msg) => {
                assert!(msg.contains("browsers表分组[Browser]"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_compile_stats() {
        let compiled = CorpusCompiler::compile(&sample_corpus()).unwrap();
        let stats = compiled.stats();
        assert_eq!(stats.robot_count, 1);
        assert_eq!(stats.browser_rule_count, 2);
        assert_eq!(stats.platform_rule_count, 1);
        assert_eq!(stats.device_rule_count, 1);
        assert_eq!(stats.override_count, 1);
        // 样例里的签名均带固定前缀，网关应全部生效
        assert_eq!(stats.gated_rule_count, 4);
    }
}
