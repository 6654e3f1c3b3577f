//! 三维体数据的通用操作: 形状对齐, 邻域偏移, 越界检查.

use crate::config::Connectivity;
use crate::{Idx3d, Offset3d};
use itertools::iproduct;
use ndarray::{s, ArrayView3};

/// 获取体数据形状 `(z, y, x)`.
#[inline]
pub(crate) fn shape_of<T>(v: &ArrayView3<'_, T>) -> Idx3d {
    v.dim()
}

/// 两个体数据在原点对齐后的重叠区域形状, 即逐轴取最小值.
#[inline]
pub fn overlap_shape((z0, y0, x0): Idx3d, (z1, y1, x1): Idx3d) -> Idx3d {
    (z0.min(z1), y0.min(y1), x0.min(x1))
}

/// 将 `v` 裁剪到从原点开始、形状为 `shape` 的子区域.
///
/// `shape` 的任一分量大于 `v` 对应轴的长度时, 程序 panic.
#[inline]
pub fn crop_to<'a, T>(v: ArrayView3<'a, T>, (z, y, x): Idx3d) -> ArrayView3<'a, T> {
    v.slice_move(s![..z, ..y, ..x])
}

/// 给定连通性下 `(0, 0, 0)` 的全部邻居偏移量. 顺序为字典序.
pub(crate) fn neighbour_offsets(connectivity: Connectivity) -> Vec<Offset3d> {
    let rank = connectivity.rank() as usize;
    iproduct!(-1isize..=1, -1isize..=1, -1isize..=1)
        .filter(|&(dz, dy, dx)| {
            let manhattan = dz.unsigned_abs() + dy.unsigned_abs() + dx.unsigned_abs();
            (1..=rank).contains(&manhattan)
        })
        .collect()
}

/// 给定连通性下, 行优先扫描时已经访问过的那一半邻居偏移量.
///
/// 即字典序小于 `(0, 0, 0)` 的偏移量, 共 `neighbours / 2` 个.
pub(crate) fn backward_offsets(connectivity: Connectivity) -> Vec<Offset3d> {
    neighbour_offsets(connectivity)
        .into_iter()
        .filter(|off| *off < (0, 0, 0))
        .collect()
}

/// 计算 `pos + off`. 若结果落在 `shape` 以外, 返回 `None`.
#[inline]
pub(crate) fn shift((z, y, x): Idx3d, (dz, dy, dx): Offset3d, shape: Idx3d) -> Option<Idx3d> {
    let nz = z.checked_add_signed(dz).filter(|v| *v < shape.0)?;
    let ny = y.checked_add_signed(dy).filter(|v| *v < shape.1)?;
    let nx = x.checked_add_signed(dx).filter(|v| *v < shape.2)?;
    Some((nz, ny, nx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_offset_counts() {
        for c in [Connectivity::Face6, Connectivity::Edge18, Connectivity::Corner26] {
            let all = neighbour_offsets(c);
            let back = backward_offsets(c);
            assert_eq!(all.len() as u32, c.neighbours());
            assert_eq!(back.len() * 2, all.len());
            // 后向偏移量取反后恰为前向偏移量.
            for &(dz, dy, dx) in back.iter() {
                assert!(all.contains(&(-dz, -dy, -dx)));
                assert!(!back.contains(&(-dz, -dy, -dx)));
            }
        }
    }

    #[test]
    fn test_shift() {
        let shape = (2, 3, 4);
        assert_eq!(shift((0, 0, 0), (-1, 0, 0), shape), None);
        assert_eq!(shift((1, 2, 3), (0, 0, 1), shape), None);
        assert_eq!(shift((1, 2, 3), (-1, -1, -1), shape), Some((0, 1, 2)));
    }

    #[test]
    fn test_overlap_and_crop() {
        let a = Array3::<u8>::ones((4, 5, 6));
        let sh = overlap_shape(a.dim(), (6, 3, 6));
        assert_eq!(sh, (4, 3, 6));
        let c = crop_to(a.view(), sh);
        assert_eq!(shape_of(&c), (4, 3, 6));
        assert_eq!(c.iter().count(), 4 * 3 * 6);
    }
}
