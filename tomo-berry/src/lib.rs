#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对神经网络输出的 cryo-ET 三维概率图进行后处理:
//! 阈值化, 连通域标记, 按尺寸筛选, 按掩膜 (mask) 策略选择, 最后提取每个簇的质心.
//!
//! 该 crate 不负责网络训练, 不负责 mrc/hdf 等文件格式读写,
//! 也不负责 motive list 的文本序列化. 输入是内存中的三维数组, 输出是结构化的簇记录.
//!
//! # 数据流
//!
//! ```text
//! 概率图 --threshold--> 二值图 --suppress_border--> 二值图
//!        --(crop_to 重叠区域)--> MaskPolicy --filter_by_size--> 标签图
//!        --extract--> Vec<ClusterRecord>
//! ```
//!
//! 完整流程由 [`cluster`] 一次性完成. 各阶段也分别公开, 方便单独调用或做消融实验.
//!
//! # 注意
//!
//! 1. 所有体数据均按照 `(z, y, x)` 索引, 行优先存储.
//! 2. 退化输入 (全背景, 无存活簇) 不是错误, 会得到合法的空结果.
//! 3. 内部不变量被破坏时 (例如标签数超过 `u32::MAX`), 程序会直接 panic.
//!
//! # 功能清单
//!
//! ### 阈值化与边缘抑制 ✅
//!
//! 实现位于 `tomo-berry/src/threshold.rs`.
//!
//! ### 6/18/26-邻域三维连通域标记 (并查集) ✅
//!
//! 支持按 z 方向分块的并行标记, 结果与串行完全一致.
//!
//! 实现位于 `tomo-berry/src/label`.
//!
//! ### 尺寸筛选与按尺寸降序重编号 ✅
//!
//! 实现位于 `tomo-berry/src/filter.rs`.
//!
//! ### 四种掩膜选择策略 ✅
//!
//! `none`, `intersection`, `contact`, `colocalization`.
//! 其中 `colocalization` 借助精确欧氏距离变换实现.
//!
//! 实现位于 `tomo-berry/src/policy.rs` 与 `tomo-berry/src/edt.rs`.
//!
//! ### 质心提取 ✅
//!
//! 实现位于 `tomo-berry/src/centroid.rs`.
//!
//! ### 工作流辅助 ✅
//!
//! fold 判定, snakemake 哨兵文件, 旧 motive list 归档.
//!
//! 实现位于 `tomo-berry/src/workflow.rs`.

/// 三维索引 `(z, y, x)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 三维有符号偏移量 `(dz, dy, dx)`.
type Offset3d = (isize, isize, isize);

pub mod consts;

mod error;

pub use error::{ClusterError, ClusterResult};

pub mod config;

pub use config::{BorderThickness, ClusterConfig, Connectivity, ContactMode, RawClusterConfig};

mod volume;

pub use volume::{crop_to, overlap_shape};

pub mod threshold;

pub mod label;

pub use label::Labeling;

pub mod filter;

mod edt;

pub use edt::squared_distance_to;

pub mod policy;

pub mod centroid;

pub use centroid::ClusterRecord;

mod pipeline;

pub use pipeline::{cluster, Clusters};

pub mod workflow;

pub mod prelude;
