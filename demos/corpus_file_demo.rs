//! Local corpus file classification demonstration for rsagentdetect
//! rsagentdetect 本地规则库文件加载演示程序
//! 功能说明：
//! 1. 演示从本地JSON文件加载规则库的完整流程（加载→校验→编译）
//! 2. 展示分阶段耗时日志输出（new_log/classify_log）
//! 3. 演示HTTP请求头分类入口classify_headers
//!
//! 运行命令：
//! cargo run --example corpus_file_demo

use env_logger::{Builder, Env, Target};
use http::{header::USER_AGENT, HeaderMap, HeaderValue};
use rsagentdetect::{AgentDetector, CorpusConfig};
use serde_json::to_string_pretty;
use std::{error::Error, time::Instant};

/// 本地规则库文件路径（相对于crate根目录）
const CORPUS_PATH: &str = "data/agent_corpus.json";

/// 主函数 - 本地规则库文件分类演示入口
fn main() -> Result<(), Box<dyn Error>> {
    // ========== 1. 日志系统初始化 ==========
    Builder::from_env(Env::default().default_filter_or("debug"))
        .target(Target::Stdout)
        .init();

    // ========== 2. 从本地文件初始化分类器（带分阶段耗时日志） ==========
    let detector = AgentDetector::new_log(CorpusConfig::local_file(CORPUS_PATH))?;

    // ========== 3. 单条User-Agent分类（classify_log带耗时日志） ==========
    let agent = "Mozilla/5.0 (Linux; Android 13; SAMSUNG SM-S918B) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/23.0 Chrome/115.0.0.0 Mobile Safari/537.36";
    let start = Instant::now();
    let classification = detector.classify_log(agent);
    println!(
        "\n✅ 分类完成 | 总耗时: {:.3} 毫秒",
        start.elapsed().as_secs_f64() * 1000.0
    );
    println!("{}", classification);
    println!(
        "📊 分类结果（结构化JSON）:\n{}",
        to_string_pretty(&classification)?
    );

    // ========== 4. HTTP请求头分类入口演示 ==========
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (compatible; YandexBot/3.0; +http://yandex.com/bots)",
        ),
    );
    let header_result = detector.classify_headers(&headers);
    println!("\n✅ 请求头分类完成: {}", header_result);
    println!(
        "📊 是否爬虫: {} | 爬虫家族: {}",
        header_result.is_robot(),
        header_result.family().unwrap_or("unknown")
    );

    Ok(())
}
