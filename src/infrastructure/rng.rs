//! 随机源 - 基础设施层
//!
//! 抽样与复核人分配共用同一个随机源。设置种子时结果可复现。

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

/// 创建随机源
pub fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            info!("🎲 使用固定随机种子: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    }
}
