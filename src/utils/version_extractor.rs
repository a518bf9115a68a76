//! 版本提取工具模块
//! 负责从签名正则的捕获结果中，根据版本模板提取合法的版本号
//! 支持 \1/\2 或 $1/$2 两种分组引用格式，自动过滤无效版本

use regex::Captures;

/// 版本提取工具类
/// 提供静态方法 `extract` 用于版本号提取
pub struct VersionExtractor;

impl VersionExtractor {
    /// 按版本模板从捕获结果中提取有效版本号
    ///
    /// # 参数
    /// - `template`: 版本模板，支持 \1/\2 或 $1/$2 分组引用
    /// - `captures`: 签名正则的捕获结果
    ///
    /// # 返回值
    /// - `Some(String)`: 提取到的有效版本号
    /// - `None`: 未提取到有效版本（模板空白/未替换/残留占位符）
    pub fn extract(template: &str, captures: &Captures) -> Option<String> {
        if template.trim().is_empty() {
            return None;
        }

        let mut version = template.to_string();
        // 标记是否发生过有效的分组替换，避免无替换却返回模板本身
        let mut replaced = false;

        // 分组从1开始遍历，0是整体匹配，不参与版本提取
        for group_index in 1..captures.len() {
            let placeholder_backslash = format!("\\{}", group_index);
            let placeholder_dollar = format!("${}", group_index);

            if let Some(matched) = captures.get(group_index) {
                // 清理分组值前后空白，避免将无效空白带入最终版本
                let matched_str = matched.as_str().trim();
                version = version.replace(&placeholder_backslash, matched_str);
                version = version.replace(&placeholder_dollar, matched_str);
                replaced = true;
            } else {
                // 未参与匹配的分组，占位符替换为空
                version = version.replace(&placeholder_backslash, "");
                version = version.replace(&placeholder_dollar, "");
            }
        }

        let final_version = version.trim().to_string();

        // 过滤条件：未发生替换 / 版本为空 / 残留 \ 或 $ 占位符
        let is_valid = replaced
            && !final_version.is_empty()
            && !final_version.contains('\\')
            && !final_version.contains('$');

        is_valid.then_some(final_version)
    }
}
