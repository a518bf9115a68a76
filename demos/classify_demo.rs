//! Embedded corpus classification demonstration for rsagentdetect
//! rsagentdetect 内置规则库User-Agent分类演示程序
//! 功能说明：
//! 1. 演示内置规则库的零配置初始化流程
//! 2. 展示浏览器/爬虫/程序库/移动端等多类User-Agent的分类能力
//! 3. 包含性能耗时统计与结构化JSON结果输出
//!
//! 运行命令：
//! cargo run --example classify_demo

use env_logger::{Builder, Env, Target};
use rsagentdetect::{AgentDetector, CorpusConfig};
use serde_json::to_string_pretty;
use std::{error::Error, time::Instant};

/// 演示用User-Agent样本（覆盖主流分类场景）
const SAMPLE_AGENTS: &[&str] = &[
    // 桌面浏览器
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:102.0) Gecko/20100101 Firefox/102.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    // 移动浏览器
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36",
    // 爬虫（精确签名）
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
    "Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)",
    // 程序库与未知输入
    "curl/8.4.0",
    "python-requests/2.31.0",
    "totally-unrecognized-string-xyz",
];

/// 主函数 - 内置规则库分类演示入口
/// 执行流程：
/// 1. 初始化结构化日志系统
/// 2. 以内置规则库初始化AgentDetector分类器
/// 3. 逐条分类样本并统计耗时
/// 4. 输出分类结果（含格式化JSON）
fn main() -> Result<(), Box<dyn Error>> {
    // ========== 1. 日志系统初始化 ==========
    // 配置日志级别为INFO，输出到标准输出
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    // ========== 2. 初始化分类器（内置规则库，零配置） ==========
    let init_start = Instant::now();
    let detector = AgentDetector::new_log(CorpusConfig::default())?;
    println!(
        "✅ 分类器初始化完成 | 耗时: {:.3} 毫秒 | 规则统计: {:?}",
        init_start.elapsed().as_secs_f64() * 1000.0,
        detector.stats()
    );

    // ========== 3. 逐条分类样本（含高精度性能统计） ==========
    let classify_start = Instant::now();
    let results: Vec<_> = SAMPLE_AGENTS
        .iter()
        .map(|agent| detector.classify(agent))
        .collect();
    let classify_duration_ms = classify_start.elapsed().as_secs_f64() * 1000.0;

    // ========== 4. 输出结构化分类结果 ==========
    println!("\n======================================= 分类结果 =======================================");
    println!(
        "✅ {}条User-Agent分类完成 | 总耗时: {:.3} 毫秒",
        results.len(),
        classify_duration_ms
    );
    println!("========================================================================================");

    for result in &results {
        println!("{}", result);
    }

    // 格式化输出JSON结果（便于后续解析和可视化）
    let result_json = to_string_pretty(&results)?;
    println!("\n📊 分类结果（结构化JSON）:\n{}", result_json);

    Ok(())
}
