//! 分类结果结构与派生谓词
//! 谓词全部从存量字段实时推导，不做独立缓存，保证永不与字段脱节

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

// ===== 请求来源类型标签 =====
pub const TYPE_ROBOT: &str = "Robot";
pub const TYPE_BROWSER: &str = "Browser";
pub const TYPE_OFFLINE_BROWSER: &str = "Offline Browser";
pub const TYPE_MOBILE_BROWSER: &str = "Mobile Browser";
pub const TYPE_WAP_BROWSER: &str = "Wap Browser";
pub const TYPE_LIBRARY: &str = "Library";
pub const TYPE_VALIDATOR: &str = "Validator";
pub const TYPE_ANONYMIZER: &str = "Useragent Anonymizer";
pub const TYPE_FEED_READER: &str = "Feed Reader";
pub const TYPE_OTHER: &str = "Other";

// ===== 设备类别标签 =====
pub const DEVICE_PERSONAL_COMPUTER: &str = "Personal computer";
pub const DEVICE_SMARTPHONE: &str = "Smartphone";
pub const DEVICE_OTHER: &str = "Other";

/// 未识别字段的对外展示值
pub const UNKNOWN_LABEL: &str = "unknown";

/// 单条User-Agent的分类结果
/// browser_name与robot_name互斥，至多一个有值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentClassification {
    /// 原始请求头
    pub agent: String,
    /// 来源类型（浏览器类别名或"Robot"），未识别时为None
    pub agent_type: Option<String>,
    /// 设备类别（兜底逻辑保证恒有值）
    pub device: String,
    pub platform: Option<String>,
    pub platform_family: Option<String>,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub robot_name: Option<String>,
    pub robot_family: Option<String>,
}

impl AgentClassification {
    /// 来源类型展示值，未识别回退"unknown"
    #[inline]
    pub fn type_name(&self) -> &str {
        self.agent_type.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// 统一名称出口：浏览器名优先，其次爬虫名，都缺省时为空串
    #[inline]
    pub fn name(&self) -> &str {
        self.browser_name
            .as_deref()
            .or(self.robot_name.as_deref())
            .unwrap_or("")
    }

    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.browser_version.as_deref()
    }

    /// 爬虫家族（仅爬虫命中时有值）
    #[inline]
    pub fn family(&self) -> Option<&str> {
        self.robot_family.as_deref()
    }

    // ===== 派生谓词（纯推导，不缓存） =====

    #[inline]
    pub fn is_robot(&self) -> bool {
        self.agent_type.as_deref() == Some(TYPE_ROBOT)
    }

    #[inline]
    pub fn is_browser(&self) -> bool {
        matches!(
            self.agent_type.as_deref(),
            Some(TYPE_BROWSER)
                | Some(TYPE_OFFLINE_BROWSER)
                | Some(TYPE_MOBILE_BROWSER)
                | Some(TYPE_WAP_BROWSER)
        )
    }

    #[inline]
    pub fn is_mobile_browser(&self) -> bool {
        matches!(
            self.agent_type.as_deref(),
            Some(TYPE_MOBILE_BROWSER) | Some(TYPE_WAP_BROWSER)
        )
    }

    #[inline]
    pub fn is_windows(&self) -> bool {
        self.platform_family.as_deref() == Some("Windows")
    }

    #[inline]
    pub fn is_linux(&self) -> bool {
        self.platform_family.as_deref() == Some("Linux")
    }

    #[inline]
    pub fn is_mac(&self) -> bool {
        matches!(self.platform_family.as_deref(), Some("Mac OS") | Some("OS X"))
    }

    #[inline]
    pub fn is_googlebot(&self) -> bool {
        self.robot_family.as_deref() == Some("Googlebot")
    }

    #[inline]
    pub fn is_msnbot(&self) -> bool {
        matches!(self.robot_family.as_deref(), Some("MSNBot") | Some("bingbot"))
    }
}

impl fmt::Display for AgentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "类型[{}] 名称[{}] 版本[{}] 平台[{}] 设备[{}]",
            self.type_name(),
            self.name(),
            self.version().unwrap_or(UNKNOWN_LABEL),
            self.platform.as_deref().unwrap_or(UNKNOWN_LABEL),
            self.device
        )
    }
}

/// 对外序列化走逻辑schema：
/// - type/device恒定输出，未识别回退"unknown"
/// - version仅非爬虫输出（缺省"unknown"）；family仅爬虫输出
/// - 平台对仅命中时输出，key为 platform / platform-family
impl Serialize for AgentClassification {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut len = 5;
        if self.platform.is_some() {
            len += 1;
        }
        if self.platform_family.is_some() {
            len += 1;
        }

        let mut state = serializer.serialize_struct("AgentClassification", len)?;
        state.serialize_field("agent", &self.agent)?;
        state.serialize_field("type", self.type_name())?;
        state.serialize_field("device", &self.device)?;
        if let Some(platform) = &self.platform {
            state.serialize_field("platform", platform)?;
        }
        if let Some(platform_family) = &self.platform_family {
            state.serialize_field("platform-family", platform_family)?;
        }
        state.serialize_field("name", self.name())?;
        if self.is_robot() {
            state.serialize_field("family", self.family().unwrap_or(""))?;
        } else {
            state.serialize_field("version", self.version().unwrap_or(UNKNOWN_LABEL))?;
        }
        state.end()
    }
}
