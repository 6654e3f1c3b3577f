//! 质心提取.

use crate::consts::voxel::NO_LABEL;
use crate::Labeling;

#[cfg(feature = "serde")]
use serde::Serialize;

/// 一个簇的对外记录: 体素坐标系下的质心以及体素个数.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClusterRecord {
    /// 质心 `[z, y, x]`, 即所有成员体素坐标的逐轴算术平均.
    pub centroid: [f64; 3],

    /// 体素个数, 至少为 1.
    pub size: usize,
}

impl ClusterRecord {
    /// 质心的 z 坐标.
    #[inline]
    pub fn z(&self) -> f64 {
        self.centroid[0]
    }

    /// 质心的 y 坐标.
    #[inline]
    pub fn y(&self) -> f64 {
        self.centroid[1]
    }

    /// 质心的 x 坐标.
    #[inline]
    pub fn x(&self) -> f64 {
        self.centroid[2]
    }
}

/// 按标签顺序 (`1..=k`) 为每个连通域计算质心与体素个数.
///
/// 对 [`filter_by_size`](crate::filter::filter_by_size) 的结果调用时,
/// 输出即按体素个数降序 (同尺寸按原标签升序). 没有连通域时返回空向量.
pub fn extract(labeling: &Labeling) -> Vec<ClusterRecord> {
    if labeling.is_empty() {
        return vec![];
    }

    // 坐标和用整数累加, 最后只做一次除法.
    let mut sums = vec![[0u64; 3]; labeling.len()];
    for ((z, y, x), &l) in labeling.labels().indexed_iter() {
        if l == NO_LABEL {
            continue;
        }
        let s = &mut sums[l as usize - 1];
        s[0] += z as u64;
        s[1] += y as u64;
        s[2] += x as u64;
    }

    sums.iter()
        .zip(labeling.sizes())
        .map(|(s, &size)| {
            let n = size as f64;
            ClusterRecord {
                centroid: [s[0] as f64 / n, s[1] as f64 / n, s[2] as f64 / n],
                size,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Connectivity;
    use crate::filter::filter_by_size;
    use crate::label::label;
    use ndarray::{s, Array3};

    #[test]
    fn test_cube_at_origin() {
        let mut b = Array3::<u8>::zeros((6, 6, 6));
        b.slice_mut(s![0..3, 0..3, 0..3]).fill(1);
        let records = extract(&label(b.view(), Connectivity::Face6));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].centroid, [1.0, 1.0, 1.0]);
        assert_eq!(records[0].size, 27);
    }

    #[test]
    fn test_axes_independent() {
        // L 形: (0, 0, 0), (0, 0, 1), (0, 0, 2), (0, 1, 0)
        let mut b = Array3::<u8>::zeros((2, 3, 4));
        b.slice_mut(s![0, 0, 0..3]).fill(1);
        b[(0, 1, 0)] = 1;
        let records = extract(&label(b.view(), Connectivity::Face6));
        let r = records[0];
        assert_eq!(r.size, 4);
        assert_eq!(r.z(), 0.0);
        assert!((r.y() - 0.25).abs() < 1e-12);
        assert!((r.x() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_follows_size_order() {
        let mut b = Array3::<u8>::zeros((1, 1, 12));
        b.slice_mut(s![0, 0, 0..2]).fill(1);
        b.slice_mut(s![0, 0, 4..9]).fill(1);
        let l = filter_by_size(label(b.view(), Connectivity::Corner26), 1, 100);
        let records = extract(&l);
        assert_eq!(records.iter().map(|r| r.size).collect::<Vec<_>>(), vec![5, 2]);
        assert_eq!(records[0].x(), 6.0);
        assert_eq!(records[1].x(), 0.5);
    }

    #[test]
    fn test_empty() {
        let l = Labeling::empty((3, 3, 3));
        assert!(extract(&l).is_empty());
    }
}
