//! 阈值化与边缘抑制.

use crate::config::BorderThickness;
use crate::consts::voxel::{self, BACKGROUND, FOREGROUND};
use ndarray::{s, Array3, ArrayView3, ArrayViewMut3, Axis};

/// 将概率图/强度图转换为二值图: 体素值严格大于 `t` 时为 [`FOREGROUND`], 否则为 [`BACKGROUND`].
///
/// NaN 与任何值比较均为假, 因此总被视为背景.
pub fn threshold<T: Copy + PartialOrd>(volume: ArrayView3<'_, T>, t: T) -> Array3<u8> {
    volume.mapv(|v| if v > t { FOREGROUND } else { BACKGROUND })
}

/// 借助 `rayon`, 并行地执行 [`threshold`]. 结果与串行版本完全相同.
#[cfg(feature = "rayon")]
pub fn threshold_par<T>(volume: ArrayView3<'_, T>, t: T) -> Array3<u8>
where
    T: Copy + PartialOrd + Send + Sync,
{
    ndarray::Zip::from(&volume).par_map_collect(|&v| if v > t { FOREGROUND } else { BACKGROUND })
}

/// 就地将二值图的边缘置为背景.
///
/// 依次处理 z 轴首尾各 `iz` 层, y 轴首尾各 `iy` 行, x 轴首尾各 `ix` 列.
/// 厚度为 0 的轴不做处理. 厚度不小于该轴长度时, 整个体数据被清空, 这是预期行为而非错误.
pub fn suppress_border(mut binary: ArrayViewMut3<'_, u8>, border: BorderThickness) {
    let (ix, iy, iz) = border.per_axis();
    for (axis, thickness) in [(0, iz), (1, iy), (2, ix)] {
        if thickness == 0 {
            continue;
        }
        let len = binary.len_of(Axis(axis));
        let t = thickness.min(len);
        match axis {
            0 => {
                binary.slice_mut(s![..t, .., ..]).fill(BACKGROUND);
                binary.slice_mut(s![len - t.., .., ..]).fill(BACKGROUND);
            }
            1 => {
                binary.slice_mut(s![.., ..t, ..]).fill(BACKGROUND);
                binary.slice_mut(s![.., len - t.., ..]).fill(BACKGROUND);
            }
            _ => {
                binary.slice_mut(s![.., .., ..t]).fill(BACKGROUND);
                binary.slice_mut(s![.., .., len - t..]).fill(BACKGROUND);
            }
        }
    }
}

/// 该二值图是否为全背景?
#[inline]
pub fn is_background(binary: ArrayView3<'_, u8>) -> bool {
    binary.iter().copied().all(voxel::is_background)
}

/// 统计二值图中的前景体素个数.
#[inline]
pub fn foreground_count(binary: ArrayView3<'_, u8>) -> usize {
    binary.iter().filter(|p| voxel::is_foreground(**p)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_threshold_strict() {
        let v = Array3::from_shape_vec((1, 1, 4), vec![0.2f32, 0.5, 0.51, f32::NAN]).unwrap();
        let b = threshold(v.view(), 0.5);
        assert_eq!(b.as_slice().unwrap(), &[0, 0, 1, 0]);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_threshold_par_eq() {
        let v = Array3::from_shape_fn((7, 9, 11), |(z, y, x)| {
            ((z * 31 + y * 7 + x) % 10) as f32 / 10.0
        });
        assert_eq!(threshold(v.view(), 0.45), threshold_par(v.view(), 0.45));
    }

    #[test]
    fn test_border_leaves_core() {
        let mut b = Array3::<u8>::ones((5, 5, 5));
        suppress_border(b.view_mut(), BorderThickness::from([1, 1, 1]));
        assert_eq!(foreground_count(b.view()), 27);
        assert!(b.slice(s![1..4, 1..4, 1..4]).iter().all(|p| *p == FOREGROUND));
    }

    #[test]
    fn test_border_per_axis() {
        let mut b = Array3::<u8>::ones((6, 6, 6));
        // ix = 0, iy = 1, iz = 2
        suppress_border(b.view_mut(), BorderThickness::from([0, 1, 2]));
        assert_eq!(foreground_count(b.view()), 2 * 4 * 6);
        assert_eq!(b[(2, 1, 0)], FOREGROUND);
        assert_eq!(b[(1, 1, 0)], BACKGROUND);
        assert_eq!(b[(2, 0, 3)], BACKGROUND);
    }

    #[test]
    fn test_border_thicker_than_volume() {
        let mut b = Array3::<u8>::ones((3, 10, 10));
        suppress_border(b.view_mut(), BorderThickness::PerAxis { x: 0, y: 0, z: 7 });
        assert!(is_background(b.view()));

        let mut b = Array3::<u8>::ones((3, 3, 3));
        suppress_border(b.view_mut(), BorderThickness::default());
        assert_eq!(foreground_count(b.view()), 27);
    }
}
