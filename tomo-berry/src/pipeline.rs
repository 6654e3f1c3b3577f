use crate::centroid::{extract, ClusterRecord};
use crate::config::ClusterConfig;
use crate::consts::voxel::{BACKGROUND, FOREGROUND, NO_LABEL};
use crate::threshold::{foreground_count, is_background, suppress_border, threshold};
use crate::volume::{crop_to, overlap_shape};
use crate::{policy, ClusterError, ClusterResult, Idx3d};
use log::{debug, info};
use ndarray::{Array3, ArrayView3};
use num::Zero;

/// 一次聚类的完整输出.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Clusters {
    /// 标签图, 形状为预测与掩膜的重叠区域 (不使用掩膜时即预测图形状).
    /// 标签 `l` 对应 `records[l - 1]`.
    pub labels: Array3<u32>,

    /// 簇记录, 按体素个数降序.
    pub records: Vec<ClusterRecord>,
}

impl Clusters {
    /// 形状为 `shape` 的空结果.
    pub fn empty(shape: Idx3d) -> Self {
        Self {
            labels: Array3::zeros(shape),
            records: vec![],
        }
    }

    /// 簇个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否没有任何簇?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 标签图形状.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.labels.dim()
    }

    /// 存活簇的 0/1 占据图. 后处理预测文件写出的是它, 而不是标签值.
    pub fn binary_mask(&self) -> Array3<u8> {
        self.labels
            .mapv(|l| if l != NO_LABEL { FOREGROUND } else { BACKGROUND })
    }
}

/// 对一个断层图的预测概率图执行完整的后处理:
///
/// 阈值化 -> 边缘抑制 -> (裁剪到与掩膜的重叠区域) -> 掩膜策略 -> 尺寸筛选 -> 质心提取.
///
/// `mask` 仅在需要掩膜的策略下使用; `none` 策略忽略它, 也不做裁剪.
/// 需要掩膜却未提供时返回 [`ClusterError::MissingMask`], 该检查先于一切计算.
/// 预测图在阈值化与边缘抑制后若全为背景, 直接返回空结果.
pub fn cluster<M: Zero>(
    prediction: ArrayView3<'_, f32>,
    mask: Option<ArrayView3<'_, M>>,
    config: &ClusterConfig,
) -> ClusterResult<Clusters> {
    let mode = config.contact_mode();
    let mask = match (mode.requires_mask(), mask) {
        (true, None) => return Err(ClusterError::MissingMask(mode)),
        (true, mask) => mask,
        (false, _) => None,
    };

    let mut binary = binarize(prediction, config);
    suppress_border(binary.view_mut(), config.border());
    debug!(
        "{} foreground voxels above {} after border suppression",
        foreground_count(binary.view()),
        config.threshold()
    );

    let shape = match &mask {
        Some(m) => overlap_shape(binary.dim(), m.dim()),
        None => binary.dim(),
    };
    if is_background(crop_to(binary.view(), shape)) {
        info!("Prediction is empty, no clusters");
        return Ok(Clusters::empty(shape));
    }

    let labeling = policy::apply(binary.view(), mask, config)?;
    let records = extract(&labeling);
    info!("{} clusters survive `{mode}`", records.len());

    let (labels, _) = labeling.into_parts();
    Ok(Clusters { labels, records })
}

/// 按配置选择串行或并行阈值化.
fn binarize(prediction: ArrayView3<'_, f32>, config: &ClusterConfig) -> Array3<u8> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            if config.parallel() {
                return crate::threshold::threshold_par(prediction, config.threshold());
            }
        }
    }
    threshold(prediction, config.threshold())
}
