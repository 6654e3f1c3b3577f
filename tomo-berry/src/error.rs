//! 运行时错误.

use crate::config::ContactMode;
use thiserror::Error;

/// 配置或聚类调用错误.
///
/// 形状不一致 **不是** 错误: 两个体数据会被裁剪到共同的重叠区域.
/// 全背景输入或无存活簇同样不是错误, 而是合法的空结果.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// 不支持的掩膜策略字符串.
    #[error("unsupported contact mode `{0}`")]
    UnsupportedContactMode(String),

    /// 需要掩膜的策略在调用时没有提供掩膜.
    #[error("contact mode `{0}` requires a mask volume")]
    MissingMask(ContactMode),

    /// 不支持的连通性取值. 合法取值为 6, 18, 26 (或等价的 1, 2, 3).
    #[error("unsupported connectivity {0}")]
    UnsupportedConnectivity(u32),

    /// 阈值不是有限值.
    #[error("threshold must be finite, got {0}")]
    InvalidThreshold(f32),

    /// 尺寸区间为空.
    #[error("invalid cluster size range [{min}, {max}]")]
    InvalidSizeRange {
        /// 最小簇体素数.
        min: usize,

        /// 最大簇体素数.
        max: usize,
    },

    /// 共定位距离为负或不是有限值.
    #[error("contact distance must be finite and non-negative, got {0}")]
    InvalidContactDistance(f64),

    /// 无法解析的 fold 标识. 合法取值为 `None` 或非负整数.
    #[error("invalid fold `{0}`")]
    InvalidFold(String),

    /// YAML 配置解析错误.
    #[cfg(feature = "serde")]
    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// 读取配置时的底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 聚类运行时错误.
pub type ClusterResult<T> = Result<T, ClusterError>;
