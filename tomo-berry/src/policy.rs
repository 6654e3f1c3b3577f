//! 掩膜选择策略.
//!
//! | 策略 | 行为 |
//! |---|---|
//! | `none` | 直接标记预测二值图. |
//! | `intersection` | 预测与掩膜逐体素取交, 再标记. |
//! | `contact` | 标记预测二值图, 只保留至少有一个成员体素与掩膜前景重合或相邻的连通域. |
//! | `colocalization` | 标记预测二值图, 只保留至少有一个成员体素到掩膜前景的欧氏距离不超过给定值的连通域. |
//!
//! 所有策略最后都经过 [`filter_by_size`]. 掩膜中任何非零体素都视为前景.

use crate::config::{ClusterConfig, ContactMode};
use crate::consts::voxel::*;
use crate::edt::squared_distance_to;
use crate::filter::filter_by_size;
use crate::label::label;
use crate::volume::{crop_to, neighbour_offsets, overlap_shape, shape_of, shift};
use crate::{ClusterError, ClusterResult, Idx3d, Labeling};
use log::{debug, warn};
use ndarray::{Array3, ArrayView3, Zip};
use num::Zero;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use crate::consts::defaults;
        use crate::label::label_par;
    }
}

/// 按 `config` 指定的策略, 从预测二值图 `binary` (以及可选的掩膜 `mask`) 中选出连通域,
/// 并按尺寸筛选.
///
/// 两者形状不同时, 裁剪到原点对齐的重叠区域, 返回结果的形状即为重叠区域形状.
/// `none` 策略会忽略 `mask`. 其余三种策略在 `mask` 为 `None` 时返回
/// [`ClusterError::MissingMask`]; 是否退回 `none` 由调用方决定.
pub fn apply<M: Zero>(
    binary: ArrayView3<'_, u8>,
    mask: Option<ArrayView3<'_, M>>,
    config: &ClusterConfig,
) -> ClusterResult<Labeling> {
    let mode = config.contact_mode();
    let selected = match (mode, mask) {
        (ContactMode::None, mask) => {
            if mask.is_some() {
                debug!("Contact mode `none` ignores the supplied mask");
            }
            run_labeling(binary, config)
        }
        (mode, None) => return Err(ClusterError::MissingMask(mode)),
        (ContactMode::Intersection, Some(mask)) => {
            let (binary, mask) = align(binary, mask);
            intersection(binary, mask, config)
        }
        (ContactMode::Contact, Some(mask)) => {
            let (binary, mask) = align(binary, mask);
            contact(binary, mask, config)
        }
        (ContactMode::Colocalization, Some(mask)) => {
            let (binary, mask) = align(binary, mask);
            colocalization(binary, mask, config)
        }
    };
    debug!("{} components selected by `{mode}`", selected.len());

    let (min, max) = config.size_range();
    Ok(filter_by_size(selected, min, max))
}

/// 裁剪到共同重叠区域. 重叠区域严格小于任一输入时给出警告.
fn align<'a, 'b, M>(
    binary: ArrayView3<'a, u8>,
    mask: ArrayView3<'b, M>,
) -> (ArrayView3<'a, u8>, ArrayView3<'b, M>) {
    let (sb, sm) = (shape_of(&binary), shape_of(&mask));
    let common = overlap_shape(sb, sm);
    if common != sb || common != sm {
        warn!("Prediction shape {sb:?} and mask shape {sm:?} differ; clipping to {common:?}");
    }
    (crop_to(binary, common), crop_to(mask, common))
}

/// 按配置选择串行或并行标记.
#[cfg(feature = "rayon")]
fn run_labeling(binary: ArrayView3<'_, u8>, config: &ClusterConfig) -> Labeling {
    if config.parallel() {
        label_par(binary, config.connectivity(), defaults::SLAB_DEPTH)
    } else {
        label(binary, config.connectivity())
    }
}

#[cfg(not(feature = "rayon"))]
fn run_labeling(binary: ArrayView3<'_, u8>, config: &ClusterConfig) -> Labeling {
    label(binary, config.connectivity())
}

/// `intersection`: 先逐体素取交, 再标记.
///
/// `binary` 和 `mask` 形状必须相同, 否则程序 panic.
pub fn intersection<M: Zero>(
    binary: ArrayView3<'_, u8>,
    mask: ArrayView3<'_, M>,
    config: &ClusterConfig,
) -> Labeling {
    let both: Array3<u8> = Zip::from(&binary).and(&mask).map_collect(|&b, m| {
        if is_foreground(b) && !m.is_zero() {
            FOREGROUND
        } else {
            BACKGROUND
        }
    });
    run_labeling(both.view(), config)
}

/// `contact`: 只保留至少一个成员体素自身或其邻居 (与聚类相同的邻接规则) 落在掩膜前景上的连通域.
/// 存活连通域的体素不做任何修改.
///
/// `binary` 和 `mask` 形状必须相同, 否则程序 panic.
pub fn contact<M: Zero>(
    binary: ArrayView3<'_, u8>,
    mask: ArrayView3<'_, M>,
    config: &ClusterConfig,
) -> Labeling {
    assert_eq!(binary.dim(), mask.dim(), "预测与掩膜形状不一致");
    let mut labeling = run_labeling(binary, config);
    let shape = labeling.shape();
    let offsets = neighbour_offsets(config.connectivity());
    let in_mask = |p: Idx3d| !mask[p].is_zero();

    let mut touched = vec![false; labeling.len() + 1];
    for (pos, &l) in labeling.labels().indexed_iter() {
        if l == NO_LABEL || touched[l as usize] {
            continue;
        }
        touched[l as usize] = in_mask(pos)
            || offsets
                .iter()
                .filter_map(|&off| shift(pos, off, shape))
                .any(in_mask);
    }
    labeling.retain(|l, _| touched[l as usize]);
    labeling
}

/// `colocalization`: 只保留至少一个成员体素到掩膜前景的欧氏距离不超过 `contact_distance` 的连通域.
/// 距离以体素为单位, 不做亚体素插值.
///
/// `binary` 和 `mask` 形状必须相同, 否则程序 panic.
pub fn colocalization<M: Zero>(
    binary: ArrayView3<'_, u8>,
    mask: ArrayView3<'_, M>,
    config: &ClusterConfig,
) -> Labeling {
    assert_eq!(binary.dim(), mask.dim(), "预测与掩膜形状不一致");
    let mut labeling = run_labeling(binary, config);
    if labeling.is_empty() {
        return labeling;
    }
    let d2 = squared_distance_to(mask);
    let tol2 = config.contact_distance() * config.contact_distance();

    let mut near = vec![false; labeling.len() + 1];
    for (pos, &l) in labeling.labels().indexed_iter() {
        if l != NO_LABEL && d2[pos] <= tol2 {
            near[l as usize] = true;
        }
    }
    labeling.retain(|l, _| near[l as usize]);
    labeling
}
