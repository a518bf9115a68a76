//! 正则预筛网关：编译期从签名正则提取必现字面量，运行期先做子串检查再跑正则
//! 铁律：网关只能放行，绝不误杀（正则能命中的输入，网关必须放行）
use std::borrow::Cow;

use regex_syntax::{
    hir::{Hir, HirKind, Literal},
    Parser,
};

use crate::utils::safe_lowercase;

/// 低于该长度的字面量遍地命中，做网关没有筛选价值
const MIN_GATE_LITERAL_LEN: usize = 3;
/// OR分支字面量上限，超过则子串扫描开销抵消网关收益
const MAX_GATE_ALTERNATIVES: usize = 6;

/// 匹配准入网关 - 编译期折叠后的统一剪枝规则
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchGate {
    /// 无任何准入条件，直接执行正则
    #[default]
    Open,
    /// 必须包含指定子串（精准命中单一特征）
    RequireSubstring(String),
    /// 必须包含任意一个子串（命中OR分支的任意特征，适配(?:A|B|C)结构）
    RequireAnyLiteral(Vec<String>),
}

impl MatchGate {
    /// 运行期剪枝校验 - 内联优化，短路执行
    /// 入参必须是ASCII小写化后的请求头（与编译期字面量的小写化对齐）
    #[inline(always)]
    pub fn check(&self, input_lower: &str) -> bool {
        match self {
            MatchGate::Open => true,
            MatchGate::RequireSubstring(s) => input_lower.contains(s.as_str()),
            MatchGate::RequireAnyLiteral(list) => {
                list.iter().any(|substr| input_lower.contains(substr.as_str()))
            }
        }
    }
}

/// 从签名正则构建准入网关
/// HIR解析必须在原始大小写上进行：大小写折叠不得触碰正则语法
/// （\A等大写转义折叠后语义完全改变），仅对提取出的字面量做小写化
/// 提取失败或字面量过短时回退Open，宁可少剪不可误杀
pub fn build_match_gate(pattern: &str) -> MatchGate {
    let stripped = strip_all_inline_modifiers(pattern);
    let pat = stripped.as_ref();

    // 纯字面量场景：整串即必现子串，跳过HIR解析
    if is_pure_literal(pat) {
        if pat.len() >= MIN_GATE_LITERAL_LEN {
            return MatchGate::RequireSubstring(safe_lowercase(pat));
        }
        return MatchGate::Open;
    }

    let hir = match Parser::new().parse(pat) {
        Ok(hir) => hir,
        // 解析失败不代表正则非法（编译阶段另行报错），此处仅放弃剪枝
        Err(_) => return MatchGate::Open,
    };

    match must_literals(&hir) {
        Some(lits) => {
            // 字面量小写化，与运行期小写化后的请求头对齐
            let mut lits: Vec<String> = lits.iter().map(|l| safe_lowercase(l)).collect();
            // 任一候选过短则整个析取集失效：丢弃短分支会破坏零误杀铁律
            if lits.is_empty()
                || lits.len() > MAX_GATE_ALTERNATIVES
                || lits.iter().any(|l| l.len() < MIN_GATE_LITERAL_LEN)
            {
                return MatchGate::Open;
            }
            lits.sort();
            lits.dedup();
            if lits.len() == 1 {
                MatchGate::RequireSubstring(lits.pop().unwrap_or_default())
            } else {
                MatchGate::RequireAnyLiteral(lits)
            }
        }
        None => MatchGate::Open,
    }
}

/// 递归提取「必现字面量析取集」：正则每次命中必然包含返回集合中至少一个子串
/// 关键：Concat取最强子节点，Alternation要求所有分支都有保证后取并集
fn must_literals(hir: &Hir) -> Option<Vec<String>> {
    match hir.kind() {
        HirKind::Literal(lit) => {
            let s = literal_to_string(lit)?;
            (!s.is_empty()).then(|| vec![s])
        }
        HirKind::Concat(subs) => {
            // 拼接的每一段都必然出现，任选一段的保证即可成立
            // 取最强者：析取分支最少优先，其次最短字面量最长优先
            let mut best: Option<Vec<String>> = None;
            for sub in subs {
                if let Some(cand) = must_literals(sub) {
                    let stronger = match &best {
                        None => true,
                        Some(cur) => {
                            let cand_min = cand.iter().map(|s| s.len()).min().unwrap_or(0);
                            let cur_min = cur.iter().map(|s| s.len()).min().unwrap_or(0);
                            cand.len() < cur.len()
                                || (cand.len() == cur.len() && cand_min > cur_min)
                        }
                    };
                    if stronger {
                        best = Some(cand);
                    }
                }
            }
            best
        }
        HirKind::Alternation(branches) => {
            // 所有分支必须各自给出保证，否则整体无保证
            let mut union: Vec<String> = Vec::new();
            for branch in branches {
                let branch_lits = must_literals(branch)?;
                union.extend(branch_lits);
            }
            (!union.is_empty()).then_some(union)
        }
        HirKind::Capture(cap) => must_literals(&cap.sub),
        HirKind::Repetition(rep) => {
            // 仅当最小重复数≥1时子节点必现
            if rep.min >= 1 {
                must_literals(&rep.sub)
            } else {
                None
            }
        }
        // Class/Look/Empty等：无字面量保证
        _ => None,
    }
}

/// 字面量转字符串，空内容返回None
fn literal_to_string(lit: &Literal) -> Option<String> {
    let bytes: &[u8] = &lit.0;
    (!bytes.is_empty()).then_some(String::from_utf8_lossy(bytes).into_owned())
}

/// 判断字符串是否是「纯字面量」（无任何正则元字符，可安全contains匹配）
#[inline]
pub fn is_pure_literal(s: &str) -> bool {
    s.chars().all(|c| !is_meta_char(c))
}

/// 判断字符是否是正则元字符（决定是否能作为安全字面量）
#[inline]
fn is_meta_char(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '\\'
    )
}

/// 剔除正则内联修饰符，辅助正则分析
/// 保留 (?: 非捕获分组；(?i:...) 归一化为 (?:...)；(?i) 等纯修饰符整体剔除
pub fn strip_all_inline_modifiers(pat: &str) -> Cow<'_, str> {
    if !pat.contains("(?") {
        return Cow::Borrowed(pat);
    }
    let mut chars = pat.chars().peekable();
    let mut stripped = String::with_capacity(pat.len());
    while let Some(ch) = chars.next() {
        if ch == '(' && chars.peek() == Some(&'?') {
            chars.next(); // 吃掉 ?
            // 收集候选修饰符字母，区分 (?i) / (?i:...) / (?:...) / 其他扩展语法
            let mut flags = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphabetic() || c == '-' {
                    flags.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            match chars.peek() {
                // (?flags) 纯修饰符 → 整体剔除
                Some(&')') if !flags.is_empty() => {
                    chars.next();
                }
                // (?flags: 与 (?: → 统一保留为非捕获分组
                Some(&':') => {
                    chars.next();
                    stripped.push_str("(?:");
                }
                // (?P<name> 等扩展语法原样写回
                _ => {
                    stripped.push('(');
                    stripped.push('?');
                    stripped.push_str(&flags);
                }
            }
        } else {
            stripped.push(ch);
        }
    }
    Cow::Owned(stripped)
}
