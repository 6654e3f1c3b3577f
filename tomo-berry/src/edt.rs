//! 精确的平方欧氏距离变换.
//!
//! 对每个轴依次做一维 "抛物线下包络" 变换 (Felzenszwalb & Huttenlocher),
//! 总复杂度与体素个数成线性关系. 距离以体素为单位, 各向同性.

use ndarray::{Array3, ArrayView3, ArrayViewMut1, Axis};
use num::Zero;

/// 代替无穷大参与包络计算, 避免 `inf - inf`.
const FAR: f64 = 1e20;

/// 计算每个体素到 `mask` 中最近的非零体素的平方欧氏距离.
///
/// 非零体素自身的距离为 0. 如果 `mask` 没有任何非零体素, 则所有距离均为 `f64::INFINITY`.
pub fn squared_distance_to<T: Zero>(mask: ArrayView3<'_, T>) -> Array3<f64> {
    let mut d = mask.map(|v| if v.is_zero() { FAR } else { 0.0 });
    if d.iter().all(|v| *v >= FAR) {
        d.fill(f64::INFINITY);
        return d;
    }
    for axis in 0..3 {
        transform_axis(&mut d, Axis(axis));
    }
    d
}

/// 沿 `axis` 对每一条一维 lane 做变换.
fn transform_axis(d: &mut Array3<f64>, axis: Axis) {
    if d.len_of(axis) <= 1 {
        return;
    }
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            ndarray::Zip::from(d.lanes_mut(axis)).par_for_each(transform_lane);
        } else {
            d.lanes_mut(axis).into_iter().for_each(transform_lane);
        }
    }
}

/// 一维平方距离变换, 就地写回.
fn transform_lane(mut lane: ArrayViewMut1<'_, f64>) {
    let f = lane.to_vec();
    let n = f.len();

    // `v[..=k]`: 下包络中各抛物线的顶点; `z[..=k + 1]`: 相邻抛物线的分界.
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for q in 0..n {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        lane[q] = dq * dq + f[v[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    fn brute_force(mask: &Array3<u8>) -> Array3<f64> {
        let fg: Vec<_> = mask
            .indexed_iter()
            .filter_map(|(p, v)| (*v != 0).then_some(p))
            .collect();
        Array3::from_shape_fn(mask.dim(), |(z, y, x)| {
            fg.iter()
                .map(|&(a, b, c)| {
                    let dz = z as f64 - a as f64;
                    let dy = y as f64 - b as f64;
                    let dx = x as f64 - c as f64;
                    dz * dz + dy * dy + dx * dx
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    #[test]
    fn test_single_voxel() {
        let mut m = Array3::<u8>::zeros((5, 5, 5));
        m[(2, 2, 2)] = 1;
        let d = squared_distance_to(m.view());
        assert_eq!(d[(2, 2, 2)], 0.0);
        assert_eq!(d[(0, 2, 2)], 4.0);
        assert_eq!(d[(0, 0, 0)], 12.0);
        assert_eq!(d[(3, 1, 2)], 2.0);
    }

    #[test]
    fn test_matches_brute_force() {
        let m = Array3::from_shape_fn((6, 7, 8), |(z, y, x)| {
            u8::from((z * 13 + y * 5 + x * 3) % 17 == 0)
        });
        let fast = squared_distance_to(m.view());
        let slow = brute_force(&m);
        for pos in iproduct!(0..6, 0..7, 0..8) {
            assert!((fast[pos] - slow[pos]).abs() < 1e-6, "{pos:?}");
        }
    }

    #[test]
    fn test_empty_mask() {
        let m = Array3::<f32>::zeros((3, 4, 5));
        let d = squared_distance_to(m.view());
        assert!(d.iter().all(|v| v.is_infinite()));
    }
}
