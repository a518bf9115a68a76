//! 全局分类器单例管理
//! 核心职责：
//! 1. 维护进程生命周期内唯一的AgentDetector实例
//! 2. 幂等初始化与手动注入规则库
//! 3. 统一错误处理和状态管理

use once_cell::sync::{Lazy, OnceCell};
use std::sync::Arc;

use super::detector::AgentDetector;
use crate::config::CorpusConfig;
use crate::corpus::AgentCorpus;
use crate::error::{AgentDetectError, AgentResult};

/// 全局分类器实例 - 线程安全单例
/// 设计说明：
/// - Lazy：延迟初始化，首次使用时创建
/// - Arc：多线程共享所有权
/// - OnceCell：确保实例仅初始化一次，进程内唯一
static GLOBAL_DETECTOR: Lazy<Arc<OnceCell<AgentDetector>>> =
    Lazy::new(|| Arc::new(OnceCell::new()));

/// 初始化全局分类器
/// 幂等设计：已初始化则直接返回Ok(())，不重复装载
pub fn init_global_detector(config: CorpusConfig) -> AgentResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        log::debug!("Global detector already initialized, skip reinitialization");
        return Ok(());
    }

    let detector = AgentDetector::new(config).map_err(|e| {
        AgentDetectError::DetectorInitError(format!(
            "Failed to create AgentDetector instance: {}",
            e
        ))
    })?;

    // OnceCell保证仅一次成功，并发初始化冲突时返回明确错误
    GLOBAL_DETECTOR.set(detector).map_err(|_| {
        AgentDetectError::DetectorInitError(
            "Global detector initialization failed: instance already initialized by another thread".to_string()
        )
    })?;

    log::info!("Global AgentDetector initialized successfully");
    Ok(())
}

/// 手动注入规则库，初始化全局分类器
/// 适用场景：调用方预装载或自行拼装规则库
pub fn init_global_detector_with_corpus(
    corpus: AgentCorpus,
    config: CorpusConfig,
) -> AgentResult<()> {
    if GLOBAL_DETECTOR.get().is_some() {
        log::debug!("Global detector already initialized, skip reinitialization with custom corpus");
        return Ok(());
    }

    let detector = AgentDetector::with_corpus(corpus, config).map_err(|e| {
        AgentDetectError::DetectorInitError(format!(
            "Failed to create AgentDetector with custom corpus: {}",
            e
        ))
    })?;

    GLOBAL_DETECTOR.set(detector).map_err(|_| {
        AgentDetectError::DetectorInitError(
            "Global detector initialization failed: instance already initialized by another thread".to_string()
        )
    })?;

    log::info!("Global AgentDetector initialized with custom corpus");
    Ok(())
}

/// 懒加载初始化（内部辅助函数）
fn lazy_init(config: CorpusConfig) -> AgentResult<()> {
    if GLOBAL_DETECTOR.get().is_none() {
        log::debug!("Lazy initializing global AgentDetector with default config");
        init_global_detector(config)?;
    }
    Ok(())
}

/// 获取全局分类器实例（自动懒加载，默认内置规则库）
/// 返回静态引用，进程生命周期内有效
pub(crate) fn get_global_detector() -> AgentResult<&'static AgentDetector> {
    lazy_init(Default::default())?;

    GLOBAL_DETECTOR.get().ok_or_else(|| {
        AgentDetectError::DetectorInitError(
            "Global detector initialization failed: instance not created".to_string(),
        )
    })
}

/// 获取全局分类器实例（严格版，无自动初始化）
/// 注意：调用前需确保已手动初始化，否则返回未初始化错误
#[allow(dead_code)]
pub(crate) fn get_global_detector_strict() -> AgentResult<&'static AgentDetector> {
    GLOBAL_DETECTOR.get().ok_or_else(|| {
        AgentDetectError::DetectorNotInitialized(
            "Global AgentDetector not initialized! Please call init_global_detector first"
                .to_string(),
        )
    })
}
