//! 编译后的单条签名规则（核心执行单元）
//! 职责：封装「如何匹配」与「如何取版本」，分组归属由上层签名表承载
use regex::{Captures, Regex};

use crate::compiler::prefilter::{build_match_gate, MatchGate};
use crate::corpus::SignatureRule;
use crate::error::{AgentDetectError, AgentResult};
use crate::utils::VersionExtractor;

#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 原始签名正则（仅用于诊断输出）
    pattern: String,
    /// 装载期一次性编译的正则，运行期匹配零失败
    regex: Regex,
    /// 规则标签（浏览器/平台规则必填；设备规则复用分组名时可缺省）
    name: Option<String>,
    /// 版本提取模板（含 \1 或 $1 占位符，可选）
    version_template: Option<String>,
    /// 匹配准入网关（剪枝规则）
    gate: MatchGate,
}

impl CompiledRule {
    /// 编译单条签名规则，`context`用于错误信息定位（表名+分组名）
    pub fn compile(rule: &SignatureRule, context: &str) -> AgentResult<Self> {
        let regex = Regex::new(&rule.pattern).map_err(|e| {
            AgentDetectError::PatternCompileError(format!(
                "{}签名正则[{}]编译失败: {}",
                context, rule.pattern, e
            ))
        })?;
        Ok(Self {
            pattern: rule.pattern.clone(),
            regex,
            name: rule.name.clone(),
            version_template: rule.version.clone(),
            gate: build_match_gate(&rule.pattern),
        })
    }

    /// 剪枝 + 匹配核心方法（平台/设备阶段用，无需捕获）
    /// `agent_lower`为请求头的ASCII小写化副本，调用方每次请求只做一次小写化
    #[inline(always)]
    pub fn matches(&self, agent: &str, agent_lower: &str) -> bool {
        self.gate.check(agent_lower) && self.regex.is_match(agent)
    }

    /// 剪枝 + 捕获式匹配（浏览器阶段用：命中即需取版本，正则只执行一次）
    #[inline(always)]
    pub fn match_captures<'a>(&self, agent: &'a str, agent_lower: &str) -> Option<Captures<'a>> {
        if !self.gate.check(agent_lower) {
            return None;
        }
        self.regex.captures(agent)
    }

    /// 获取正则捕获组（版本提取用）
    #[inline(always)]
    pub fn captures<'a>(&self, agent: &'a str) -> Option<Captures<'a>> {
        self.regex.captures(agent)
    }

    /// 从命中的请求头中提取版本号
    pub fn extract_version(&self, agent: &str) -> Option<String> {
        let captures = self.captures(agent)?;
        self.version_from(&captures)
    }

    /// 从既有捕获结果中提取版本号（捕获复用出口，避免正则二次执行）
    /// 有模板走模板替换；无模板回退捕获分组1（去空白，空值过滤）
    pub fn version_from(&self, captures: &Captures) -> Option<String> {
        match &self.version_template {
            Some(template) => VersionExtractor::extract(template, captures),
            None => captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !v.is_empty()),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline(always)]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 网关观测（剪枝覆盖率统计用）
    #[inline(always)]
    pub fn gate_kind(&self) -> &MatchGate {
        &self.gate
    }
}
