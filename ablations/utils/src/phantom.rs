//! 合成测试体. 代替真实断层图的预测概率图和膜掩膜.

use ndarray::{s, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tomo_berry::Idx3d;

/// 一对合成的预测概率图与掩膜.
#[derive(Clone, Debug)]
pub struct Phantom {
    /// 预测概率图, 取值在 `[0, 1)` 内.
    pub prediction: Array3<f32>,

    /// 膜掩膜, 0/1.
    pub mask: Array3<u8>,

    /// 放入的球心.
    pub centers: Vec<Idx3d>,
}

/// 将以 `center` 为心, 半径为 `radius` 的实心球内的体素都置为 `value`.
/// 球超出体数据的部分被忽略.
pub fn stamp_ball(volume: &mut Array3<f32>, center: Idx3d, radius: usize, value: f32) {
    let (d, h, w) = volume.dim();
    let (cz, cy, cx) = center;
    let r2 = (radius * radius) as isize;
    let lo = |c: usize| c.saturating_sub(radius);
    let hi = |c: usize, n: usize| (c + radius + 1).min(n);

    let mut block = volume.slice_mut(s![lo(cz)..hi(cz, d), lo(cy)..hi(cy, h), lo(cx)..hi(cx, w)]);
    let origin = (lo(cz), lo(cy), lo(cx));
    for ((z, y, x), v) in block.indexed_iter_mut() {
        let dz = (z + origin.0) as isize - cz as isize;
        let dy = (y + origin.1) as isize - cy as isize;
        let dx = (x + origin.2) as isize - cx as isize;
        if dz * dz + dy * dy + dx * dx <= r2 {
            *v = value;
        }
    }
}

/// 生成形状为 `shape` 的随机测试体: `n` 个半径 1~4 的球 (模拟颗粒) 外加低幅噪声,
/// 掩膜为 z 方向中间厚度为 3 的平板 (模拟膜).
///
/// 相同 `seed` 总是得到相同结果.
pub fn random(shape: Idx3d, n: usize, seed: u64) -> Phantom {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut prediction = Array3::from_shape_simple_fn(shape, || rng.random_range(0.0..0.4f32));

    let (d, h, w) = shape;
    let mut centers = Vec::with_capacity(n);
    if d > 0 && h > 0 && w > 0 {
        for _ in 0..n {
            let c = (
                rng.random_range(0..d),
                rng.random_range(0..h),
                rng.random_range(0..w),
            );
            let r = rng.random_range(1..=4);
            let p = rng.random_range(0.6..1.0f32);
            stamp_ball(&mut prediction, c, r, p);
            centers.push(c);
        }
    }

    let mut mask = Array3::zeros(shape);
    let mid = d / 2;
    mask.slice_mut(s![mid.saturating_sub(1)..(mid + 2).min(d), .., ..])
        .fill(1);

    Phantom {
        prediction,
        mask,
        centers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_ball() {
        let mut v = Array3::<f32>::zeros((7, 7, 7));
        stamp_ball(&mut v, (3, 3, 3), 1, 1.0);
        assert_eq!(v.iter().filter(|p| **p == 1.0).count(), 7);

        // 越界部分被裁掉.
        let mut v = Array3::<f32>::zeros((7, 7, 7));
        stamp_ball(&mut v, (0, 0, 0), 1, 1.0);
        assert_eq!(v.iter().filter(|p| **p == 1.0).count(), 4);
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = random((16, 20, 24), 10, 42);
        let b = random((16, 20, 24), 10, 42);
        assert_eq!(a.prediction, b.prediction);
        assert_eq!(a.centers, b.centers);
        assert_eq!(a.mask.iter().filter(|p| **p == 1).count(), 3 * 20 * 24);
        assert!(a.prediction.iter().all(|p| (0.0..1.0).contains(p)));
    }
}
