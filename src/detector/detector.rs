//! Agent detector core module
//! User-Agent分类器核心
//! 核心职责：
//! 1. 规则库装载与编译（内置/本地文件）
//! 2. 五阶段分类：爬虫精确命中 → 浏览器类别 → 平台解析 → 设备解析 → 结果组装
//! 3. 提供字符串/HeaderMap两种输入口径与带耗时日志版本

use std::sync::Arc;
use std::time::Instant;

use http::HeaderMap;

use crate::compiler::{CompiledCorpus, CorpusCompiler, CorpusStats};
use crate::config::{CorpusConfig, CorpusOrigin};
use crate::corpus::{AgentCorpus, CorpusLoader};
use crate::error::AgentResult;
use crate::result::{
    AgentClassification, DEVICE_OTHER, DEVICE_PERSONAL_COMPUTER, DEVICE_SMARTPHONE,
    TYPE_ANONYMIZER, TYPE_FEED_READER, TYPE_LIBRARY, TYPE_MOBILE_BROWSER, TYPE_OTHER, TYPE_ROBOT,
    TYPE_VALIDATOR, TYPE_WAP_BROWSER,
};
use crate::utils::{agent_from_headers, safe_lowercase};
#[cfg(not(feature = "embedded-corpus"))]
use crate::error::AgentDetectError;

/// 浏览器阶段命中载荷
#[derive(Debug, Clone)]
struct BrowserMatch {
    category: String,
    name: String,
    version: Option<String>,
}

/// 平台阶段命中载荷
#[derive(Debug, Clone)]
struct PlatformMatch {
    platform: String,
    family: String,
}

/// User-Agent分类器核心结构体
/// 设计说明：
/// - compiled: 编译后的规则库（Arc共享，避免重复编译）
/// - config: 规则配置（保留配置上下文）
#[derive(Debug, Clone)]
pub struct AgentDetector {
    /// 编译后的规则库（Arc保证多线程共享）
    compiled: Arc<CompiledCorpus>,
    /// 规则配置（保留配置上下文）
    #[allow(dead_code)]
    config: CorpusConfig,
}

impl AgentDetector {
    /// 使用内存中的规则库创建分类器
    /// 适用场景：测试夹具或调用方自行拼装规则库
    /// 装载期完成结构校验与全部正则编译，任一签名非法即整体失败
    pub fn with_corpus(corpus: AgentCorpus, config: CorpusConfig) -> AgentResult<Self> {
        CorpusLoader::validate(&corpus, &config.options)?;
        let compiled = CorpusCompiler::compile(&corpus)?;

        Ok(Self {
            compiled: Arc::new(compiled),
            config,
        })
    }

    /// 使用内置规则库创建分类器（仅embedded-corpus特性开启时可用）
    /// 预编译单例直接复用，零装载耗时
    #[cfg(feature = "embedded-corpus")]
    pub fn with_embedded_corpus(config: CorpusConfig) -> AgentResult<Self> {
        Ok(Self {
            compiled: crate::embedded_corpus::EMBEDDED_COMPILED_CORPUS.clone(),
            config,
        })
    }

    /// 创建分类器（基础版，无耗时日志）
    /// 支持规则来源：
    /// 1. Embedded：内置规则库（需开启embedded-corpus特性）
    /// 2. LocalFile：运行时从本地JSON装载
    pub fn new(config: CorpusConfig) -> AgentResult<Self> {
        match &config.origin {
            // Embedded模式 - 特性守卫 + 降级处理
            CorpusOrigin::Embedded => {
                #[cfg(feature = "embedded-corpus")]
                {
                    Self::with_embedded_corpus(config)
                }
                // 关闭特性时，返回明确的错误
                #[cfg(not(feature = "embedded-corpus"))]
                {
                    return Err(AgentDetectError::FeatureDisabled(
                        "embedded-corpus feature is disabled, cannot use embedded corpus. Please enable this feature or load a local corpus file.".to_string()
                    ));
                }
            }

            // 运行时装载模式（本地规则库文件）
            CorpusOrigin::LocalFile(_) => {
                let loader = CorpusLoader::new();
                let corpus = loader.load(&config)?;
                Self::with_corpus(corpus, config)
            }
        }
    }

    /// 创建分类器（带详细耗时日志版）
    /// 分阶段计时：规则装载/结构校验/规则编译
    pub fn new_log(config: CorpusConfig) -> AgentResult<Self> {
        match &config.origin {
            CorpusOrigin::Embedded => {
                #[cfg(feature = "embedded-corpus")]
                {
                    log::info!("Using embedded agent corpus");
                    Self::with_embedded_corpus(config)
                }
                #[cfg(not(feature = "embedded-corpus"))]
                {
                    return Err(AgentDetectError::FeatureDisabled(
                        "embedded-corpus feature is disabled, cannot use embedded corpus. Please enable this feature or load a local corpus file.".to_string()
                    ));
                }
            }

            CorpusOrigin::LocalFile(_) => {
                log::info!("Using runtime corpus file, starting loading process");
                let total_start = Instant::now();

                let loader = CorpusLoader::new();
                let load_start = Instant::now();
                let corpus = loader.load(&config)?;
                log::info!(
                    "[Stage 1] Corpus loaded | Time: {}ms | Rule count: {}",
                    load_start.elapsed().as_millis(),
                    corpus.rule_count()
                );

                let validate_start = Instant::now();
                CorpusLoader::validate(&corpus, &config.options)?;
                log::info!(
                    "[Stage 2] Corpus validated | Time: {}ms | Robots: {} | Overrides: {}",
                    validate_start.elapsed().as_millis(),
                    corpus.robots.len(),
                    corpus.overrides.len()
                );

                let compile_start = Instant::now();
                let compiled = CorpusCompiler::compile(&corpus)?;
                log::info!(
                    "[Stage 3] Corpus compiled | Time: {}ms | Browser rules: {} | Gated rules: {}",
                    compile_start.elapsed().as_millis(),
                    compiled.stats().browser_rule_count,
                    compiled.stats().gated_rule_count
                );

                log::info!(
                    "[Total] Corpus load + compilation completed | Time: {}ms",
                    total_start.elapsed().as_millis()
                );

                Ok(Self {
                    compiled: Arc::new(compiled),
                    config,
                })
            }
        }
    }

    /// 核心分类方法
    /// 纯函数：相同规则库与输入必然产出相同结果，运行期永不失败
    /// 阶段次序固定：爬虫精确命中 → 浏览器类别 → 平台 → 设备 → 组装
    #[inline(always)]
    pub fn classify(&self, agent: &str) -> AgentClassification {
        // 阶段1：爬虫精确命中（大小写敏感整串比对），命中即短路
        if let Some(robot) = self.compiled.robot_lookup(agent) {
            log::debug!(
                "[爬虫]精确命中 | 名称: {} | 家族: {}",
                robot.name,
                robot.family
            );
            return AgentClassification {
                agent: agent.to_string(),
                agent_type: Some(TYPE_ROBOT.to_string()),
                device: DEVICE_OTHER.to_string(),
                platform: None,
                platform_family: None,
                browser_name: None,
                browser_version: None,
                robot_name: Some(robot.name.clone()),
                robot_family: Some(robot.family.clone()),
            };
        }

        // 每次请求只做一次小写化，供全部准入网关复用
        let agent_lower = safe_lowercase(agent);

        // 阶段2：浏览器类别首命中
        let browser = self.search_browser(agent, &agent_lower);

        // 阶段3：平台解析（覆写表优先于签名扫描）
        let platform = self.resolve_platform(agent, &agent_lower, browser.as_ref());

        // 阶段4：设备解析（独立扫描，未命中走类型兜底）
        let device = self.search_device(agent, &agent_lower).unwrap_or_else(|| {
            Self::fallback_device(browser.as_ref().map(|b| b.category.as_str()))
        });

        // 阶段5：组装
        AgentClassification {
            agent: agent.to_string(),
            agent_type: browser.as_ref().map(|b| b.category.clone()),
            device,
            platform: platform.as_ref().map(|p| p.platform.clone()),
            platform_family: platform.map(|p| p.family),
            browser_name: browser.as_ref().map(|b| b.name.clone()),
            browser_version: browser.and_then(|b| b.version),
            robot_name: None,
            robot_family: None,
        }
    }

    /// 分类（带耗时日志版）
    #[inline(always)]
    pub fn classify_log(&self, agent: &str) -> AgentClassification {
        let start = Instant::now();
        let result = self.classify(agent);
        log::info!(
            "Classification completed | Time: {:?} | {}",
            start.elapsed(),
            result
        );
        result
    }

    /// 从HeaderMap分类（User-Agent缺失时按空串处理，走未知兜底）
    #[inline(always)]
    pub fn classify_headers(&self, headers: &HeaderMap) -> AgentClassification {
        self.classify(agent_from_headers(headers))
    }

    /// 规则库编译统计
    #[inline]
    pub fn stats(&self) -> &CorpusStats {
        self.compiled.stats()
    }

    /// 浏览器类别搜索：两层声明序遍历，首命中即返回
    /// 走捕获式匹配，命中后版本复用同一捕获结果，正则只执行一次
    fn search_browser(&self, agent: &str, agent_lower: &str) -> Option<BrowserMatch> {
        for group in self.compiled.browser_groups() {
            for rule in &group.rules {
                if let Some(captures) = rule.match_captures(agent, agent_lower) {
                    let name = rule.name().unwrap_or(group.name.as_str());
                    let version = rule.version_from(&captures);
                    log::debug!(
                        "[浏览器]匹配成功 | 类别: {} | 名称: {} | 版本: {:?} | 规则: {}",
                        group.name,
                        name,
                        version,
                        rule.pattern()
                    );
                    return Some(BrowserMatch {
                        category: group.name.clone(),
                        name: name.to_string(),
                        version,
                    });
                }
            }
        }
        None
    }

    /// 平台解析：覆写命中直接采用平台对并跳过签名扫描，否则声明序首命中
    fn resolve_platform(
        &self,
        agent: &str,
        agent_lower: &str,
        browser: Option<&BrowserMatch>,
    ) -> Option<PlatformMatch> {
        if let Some(hit) = browser {
            if let Some(pair) = self.compiled.override_for(&hit.name) {
                log::debug!(
                    "[平台]覆写命中 | 浏览器: {} | 平台: {} | 家族: {}",
                    hit.name,
                    pair.platform,
                    pair.family
                );
                return Some(PlatformMatch {
                    platform: pair.platform.clone(),
                    family: pair.family.clone(),
                });
            }
        }

        for group in self.compiled.platform_groups() {
            for rule in &group.rules {
                if rule.matches(agent, agent_lower) {
                    // 分组名即平台家族，规则标签为具体平台名
                    let platform = rule.name().unwrap_or(group.name.as_str());
                    log::debug!(
                        "[平台]匹配成功 | 平台: {} | 家族: {} | 规则: {}",
                        platform,
                        group.name,
                        rule.pattern()
                    );
                    return Some(PlatformMatch {
                        platform: platform.to_string(),
                        family: group.name.clone(),
                    });
                }
            }
        }
        None
    }

    /// 设备搜索：声明序首命中，规则标签缺省时复用分组名
    fn search_device(&self, agent: &str, agent_lower: &str) -> Option<String> {
        for group in self.compiled.device_groups() {
            for rule in &group.rules {
                if rule.matches(agent, agent_lower) {
                    let device = rule.name().unwrap_or(group.name.as_str()).to_string();
                    log::debug!("[设备]匹配成功 | 设备: {} | 规则: {}", device, rule.pattern());
                    return Some(device);
                }
            }
        }
        None
    }

    /// 设备兜底启发：无设备签名命中时按来源类型归桶
    fn fallback_device(agent_type: Option<&str>) -> String {
        match agent_type {
            Some(TYPE_OTHER) | Some(TYPE_LIBRARY) | Some(TYPE_VALIDATOR)
            | Some(TYPE_ANONYMIZER) | Some(TYPE_FEED_READER) => DEVICE_OTHER.to_string(),
            Some(TYPE_MOBILE_BROWSER) | Some(TYPE_WAP_BROWSER) => DEVICE_SMARTPHONE.to_string(),
            _ => DEVICE_PERSONAL_COMPUTER.to_string(),
        }
    }
}

/// 全局单例分类接口
/// 特性：自动懒加载全局分类器（默认内置规则库）
#[inline(always)]
pub fn classify(agent: &str) -> AgentResult<AgentClassification> {
    let detector = super::global::get_global_detector()?;
    Ok(detector.classify(agent))
}

/// 全局单例分类接口（HeaderMap口径）
#[inline(always)]
pub fn classify_headers(headers: &HeaderMap) -> AgentResult<AgentClassification> {
    let detector = super::global::get_global_detector()?;
    Ok(detector.classify_headers(headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::USER_AGENT;
    use http::HeaderValue;

    const FIREFOX_WIN10: &str = "Mozilla/5.0 (Windows NT 10.0) Firefox/102.0";

    /// 覆盖四张签名表与覆写表的小型夹具
    fn fixture_detector() -> AgentDetector {
        let corpus = CorpusLoader::load_from_str(
            r#"{
            "robots": [
                {"agent": "Googlebot/2.1 (+http://www.google.com/bot.html)", "name": "Googlebot/2.1", "family": "Googlebot"},
                {"agent": "SpecialBot Chrome/99.0", "name": "SpecialBot", "family": "SpecialBot"}
            ],
            "browsers": [
                {"group": "Library", "rules": [
                    {"pattern": "^curl/([0-9.]+)", "name": "curl"}
                ]},
                {"group": "Mobile Browser", "rules": [
                    {"pattern": "Version/([0-9.]+).*Mobile.*Safari", "name": "Mobile Safari"}
                ]},
                {"group": "Browser", "rules": [
                    {"pattern": "Firefox/([0-9.]+)", "name": "Firefox"},
                    {"pattern": "Chrome/([0-9.]+)", "name": "Chrome"}
                ]}
            ],
            "platforms": [
                {"group": "Windows", "rules": [
                    {"pattern": "Windows NT 10", "name": "Windows 10"},
                    {"pattern": "Windows NT", "name": "Windows"}
                ]},
                {"group": "Android", "rules": [{"pattern": "Android ([0-9.]+)", "name": "Android"}]},
                {"group": "Linux", "rules": [{"pattern": "Linux", "name": "Linux"}]}
            ],
            "devices": [
                {"group": "Smartphone", "rules": [{"pattern": "iPhone"}]},
                {"group": "Tablet", "rules": [{"pattern": "iPad"}]}
            ],
            "overrides": [
                {"browser": "Firefox", "platform": "Windows", "family": "Windows"}
            ]
        }"#,
        )
        .unwrap();
        AgentDetector::with_corpus(corpus, CorpusConfig::default()).unwrap()
    }

    #[test]
    fn test_robot_exact_match_short_circuits() {
        let detector = fixture_detector();
        // 该签名同时含Chrome令牌，必须先于浏览器表被精确命中
        let result = detector.classify("SpecialBot Chrome/99.0");

        assert!(result.is_robot());
        assert_eq!(result.robot_name.as_deref(), Some("SpecialBot"));
        assert_eq!(result.robot_family.as_deref(), Some("SpecialBot"));
        assert_eq!(result.device, DEVICE_OTHER);
        assert!(result.browser_name.is_none());
        assert!(result.platform.is_none());
    }

    #[test]
    fn test_robot_lookup_is_case_sensitive() {
        let detector = fixture_detector();
        // 大小写不一致时精确表不命中，按普通流程继续
        let result = detector.classify("specialbot chrome/99.0");
        assert!(!result.is_robot());
    }

    #[test]
    fn test_first_match_wins_across_groups() {
        let detector = fixture_detector();
        // Library组先于Browser组声明，同时可命中时Library胜出
        let result = detector.classify("curl/8.4.0 Chrome/1.0");

        assert_eq!(result.agent_type.as_deref(), Some("Library"));
        assert_eq!(result.browser_name.as_deref(), Some("curl"));
        assert_eq!(result.browser_version.as_deref(), Some("8.4.0"));
    }

    #[test]
    fn test_first_match_wins_within_group() {
        let detector = fixture_detector();
        // 同组内Firefox规则声明在前
        let result = detector.classify("Mozilla/5.0 Firefox/102.0 Chrome/120.0");
        assert_eq!(result.browser_name.as_deref(), Some("Firefox"));
    }

    #[test]
    fn test_round_trip_with_override_precedence() {
        let detector = fixture_detector();
        // Windows NT 10同时满足平台签名，覆写表必须胜出（产出Windows而非Windows 10）
        let result = detector.classify(FIREFOX_WIN10);

        assert_eq!(result.agent_type.as_deref(), Some("Browser"));
        assert_eq!(result.browser_name.as_deref(), Some("Firefox"));
        assert_eq!(result.browser_version.as_deref(), Some("102.0"));
        assert_eq!(result.platform.as_deref(), Some("Windows"));
        assert_eq!(result.platform_family.as_deref(), Some("Windows"));
        assert_eq!(result.device, DEVICE_PERSONAL_COMPUTER);
        assert!(result.is_browser());
        assert!(result.is_windows());
    }

    #[test]
    fn test_platform_pattern_search_without_override() {
        let detector = fixture_detector();
        // Chrome无覆写条目，平台走签名扫描，组内先声明的Windows 10规则命中
        let result = detector.classify("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0");

        assert_eq!(result.browser_name.as_deref(), Some("Chrome"));
        assert_eq!(result.platform.as_deref(), Some("Windows 10"));
        assert_eq!(result.platform_family.as_deref(), Some("Windows"));
    }

    #[test]
    fn test_fallback_device_mobile_browser() {
        let detector = fixture_detector();
        // 无设备签名命中，Mobile Browser类别兜底到Smartphone
        let result = detector
            .classify("Mozilla/5.0 (Linux; Android 13) Version/17.0 Mobile Safari/604.1");

        assert_eq!(result.agent_type.as_deref(), Some(TYPE_MOBILE_BROWSER));
        assert_eq!(result.device, DEVICE_SMARTPHONE);
        assert_eq!(result.platform_family.as_deref(), Some("Android"));
        assert!(result.is_mobile_browser());
    }

    #[test]
    fn test_device_rule_beats_fallback() {
        let detector = fixture_detector();
        // iPad命中Tablet设备签名，优先于Mobile Browser的Smartphone兜底
        let result = detector
            .classify("Mozilla/5.0 (iPad; CPU OS 16_6) Version/16.6 Mobile/15E148 Safari/604.1");

        assert_eq!(result.agent_type.as_deref(), Some(TYPE_MOBILE_BROWSER));
        assert_eq!(result.device, "Tablet");
    }

    #[test]
    fn test_library_falls_back_to_other_device() {
        let detector = fixture_detector();
        let result = detector.classify("curl/8.4.0");

        assert_eq!(result.agent_type.as_deref(), Some(TYPE_LIBRARY));
        assert_eq!(result.device, DEVICE_OTHER);
    }

    #[test]
    fn test_graceful_unknown() {
        let detector = fixture_detector();

        for agent in ["", "totally-unrecognized-string-xyz"] {
            let result = detector.classify(agent);
            assert_eq!(result.type_name(), "unknown");
            assert_eq!(result.name(), "");
            assert!(result.version().is_none());
            assert!(result.platform.is_none());
            assert!(result.platform_family.is_none());
            // 未知来源按个人电脑兜底
            assert_eq!(result.device, DEVICE_PERSONAL_COMPUTER);
        }
    }

    #[test]
    fn test_anchored_rule_classifies_from_start() {
        // \A锚定规则：剪枝网关必须放行，锚定语义由正则裁决
        let corpus = CorpusLoader::load_from_str(
            r#"{"browsers": [{"group": "Browser", "rules": [{"pattern": "\\AFirefox/([0-9.]+)", "name": "Firefox"}]}]}"#,
        )
        .unwrap();
        let detector = AgentDetector::with_corpus(corpus, CorpusConfig::default()).unwrap();

        let hit = detector.classify("Firefox/102.0");
        assert_eq!(hit.browser_name.as_deref(), Some("Firefox"));
        assert_eq!(hit.browser_version.as_deref(), Some("102.0"));

        // 锚定在串首，带前缀时正常不命中
        let miss = detector.classify("Mozilla/5.0 Firefox/102.0");
        assert!(miss.browser_name.is_none());
    }

    #[test]
    fn test_classify_log_matches_classify() {
        // 带耗时日志版与核心分类必须产出完全一致的结果
        let detector = fixture_detector();
        for agent in [FIREFOX_WIN10, "curl/8.4.0", ""] {
            assert_eq!(detector.classify_log(agent), detector.classify(agent));
        }
    }

    #[test]
    fn test_classify_is_idempotent() {
        let detector = fixture_detector();
        for agent in [FIREFOX_WIN10, "curl/8.4.0", "", "Googlebot/2.1 (+http://www.google.com/bot.html)"] {
            assert_eq!(detector.classify(agent), detector.classify(agent));
        }
    }

    #[test]
    fn test_classify_headers_round_trip() {
        let detector = fixture_detector();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(FIREFOX_WIN10));
        assert_eq!(detector.classify_headers(&headers), detector.classify(FIREFOX_WIN10));

        // User-Agent缺失等价于空串输入
        let empty = HeaderMap::new();
        assert_eq!(detector.classify_headers(&empty), detector.classify(""));
    }

    #[test]
    fn test_robot_then_browser_field_exclusivity() {
        let detector = fixture_detector();

        let robot = detector.classify("Googlebot/2.1 (+http://www.google.com/bot.html)");
        assert!(robot.robot_name.is_some() && robot.browser_name.is_none());

        let browser = detector.classify(FIREFOX_WIN10);
        assert!(browser.browser_name.is_some() && browser.robot_name.is_none());
    }
}
