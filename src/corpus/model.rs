//! 签名规则库核心数据模型
//! 规则库为只读数据资产：JSON数组顺序即作者声明的匹配优先级，装载后不再变更

use serde::{Deserialize, Serialize};

/// 当前支持的规则库schema版本
pub const CORPUS_SCHEMA_VERSION: u32 = 1;

/// 单条签名规则
/// pattern 为正则表达式；name 为输出标签（浏览器/平台表必填，设备表复用分组名）；
/// version 为可选版本模板（支持 \1/$1 分组引用，缺省时取捕获组1）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignatureRule {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// 有序规则分组
/// group 即分类轴上的输出名称（浏览器类别/平台家族/设备类型），组内规则先者优先
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleGroup {
    pub group: String,
    pub rules: Vec<SignatureRule>,
}

/// 爬虫精确签名（全串字面量相等，大小写敏感，不做任何归一化）
/// 签名采自真实流量日志，必须先于一切启发式模式被识别
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RobotEntry {
    pub agent: String,
    pub name: String,
    pub family: String,
}

/// 浏览器→平台覆写项
/// 适用于代理串本身无法推断平台的浏览器（嵌入式WebKit壳、无平台信息的客户端等）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformOverride {
    pub browser: String,
    pub platform: String,
    pub family: String,
}

/// 完整签名规则库（原始schema，serde直映射）
/// 四类签名表 + 覆写表；各表均可为空（测试夹具常用部分表）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentCorpus {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub robots: Vec<RobotEntry>,
    #[serde(default)]
    pub browsers: Vec<RuleGroup>,
    #[serde(default)]
    pub platforms: Vec<RuleGroup>,
    #[serde(default)]
    pub devices: Vec<RuleGroup>,
    #[serde(default)]
    pub overrides: Vec<PlatformOverride>,
}

fn default_schema_version() -> u32 {
    CORPUS_SCHEMA_VERSION
}

impl AgentCorpus {
    /// 规则库内规则总数（爬虫签名 + 三类分组规则 + 覆写项）
    pub fn rule_count(&self) -> usize {
        let grouped: usize = [&self.browsers, &self.platforms, &self.devices]
            .iter()
            .flat_map(|table| table.iter())
            .map(|g| g.rules.len())
            .sum();
        self.robots.len() + grouped + self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_deserialize_minimal_fixture() {
        // 最小夹具：仅浏览器表，其余表走serde默认
        let json = r#"{
            "browsers": [
                {"group": "Browser", "rules": [{"pattern": "Firefox/([0-9.]+)", "name": "Firefox"}]}
            ]
        }"#;
        let corpus: AgentCorpus = serde_json::from_str(json).unwrap();

        assert_eq!(corpus.schema_version, CORPUS_SCHEMA_VERSION);
        assert!(corpus.robots.is_empty());
        assert_eq!(corpus.browsers.len(), 1);
        assert_eq!(corpus.browsers[0].group, "Browser");
        assert_eq!(corpus.browsers[0].rules[0].name.as_deref(), Some("Firefox"));
        assert_eq!(corpus.rule_count(), 1);
    }

    #[test]
    fn test_corpus_roundtrip_preserves_order() {
        // 序列化往返后分组顺序必须保持作者声明顺序（数组序即优先级）
        let json = r#"{
            "platforms": [
                {"group": "Windows Mobile", "rules": [{"pattern": "Windows Phone", "name": "Windows Phone"}]},
                {"group": "Windows", "rules": [{"pattern": "Windows", "name": "Windows"}]}
            ]
        }"#;
        let corpus: AgentCorpus = serde_json::from_str(json).unwrap();
        let reparsed: AgentCorpus =
            serde_json::from_str(&serde_json::to_string(&corpus).unwrap()).unwrap();

        assert_eq!(corpus, reparsed);
        assert_eq!(reparsed.platforms[0].group, "Windows Mobile");
        assert_eq!(reparsed.platforms[1].group, "Windows");
    }

    #[test]
    fn test_rule_count_spans_all_tables() {
        let corpus = AgentCorpus {
            robots: vec![RobotEntry {
                agent: "Googlebot/2.1 (+http://www.google.com/bot.html)".into(),
                name: "Googlebot/2.1".into(),
                family: "Googlebot".into(),
            }],
            browsers: vec![RuleGroup {
                group: "Browser".into(),
                rules: vec![
                    SignatureRule {
                        pattern: "Firefox/([0-9.]+)".into(),
                        name: Some("Firefox".into()),
                        version: None,
                    },
                    SignatureRule {
                        pattern: "Chrome/([0-9.]+)".into(),
                        name: Some("Chrome".into()),
                        version: None,
                    },
                ],
            }],
            devices: vec![RuleGroup {
                group: "Tablet".into(),
                rules: vec![SignatureRule {
                    pattern: "iPad".into(),
                    name: None,
                    version: None,
                }],
            }],
            overrides: vec![PlatformOverride {
                browser: "Firefox".into(),
                platform: "Windows".into(),
                family: "Windows".into(),
            }],
            ..Default::default()
        };

        assert_eq!(corpus.rule_count(), 5);
    }
}
