//! 算法运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间 (以微秒为单位).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 一种策略在全部测试体上的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 没有任何存活簇的运行次数.
    trivial: u64,

    /// 至少有一个存活簇的运行次数.
    target: u64,

    /// 所有运行的存活簇总数.
    clusters: u64,

    /// 聚类本身花费的总时间.
    run_time: AccTimer,

    /// 整个任务花费的总时间 (包括串行/并行对比).
    real_time: AccTimer,

    /// 最耗时的一次运行.
    most: Option<Duration>,

    /// 串行与并行结果不一致的次数. 应当恒为 0.
    mismatched: u64,
}

impl Profile {
    /// 初始化. 同时开始总计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            trivial: 0,
            target: 0,
            clusters: 0,
            run_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
            mismatched: 0,
        }
    }

    /// 开始一次聚类计时.
    #[inline]
    pub fn run_start(&mut self) {
        self.run_time.start();
    }

    /// 结束一次聚类计时, 并记录其存活簇个数.
    pub fn run_elapsed(&mut self, clusters: usize) {
        let d = self.run_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
        match clusters {
            0 => self.trivial += 1,
            n => {
                self.target += 1;
                self.clusters += n as u64;
            }
        }
    }

    /// 记录一次串行/并行结果不一致.
    #[inline]
    pub fn count_mismatch(&mut self) {
        self.mismatched += 1;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 获得无存活簇的运行次数.
    #[inline]
    pub fn get_trivial(&self) -> u64 {
        self.trivial
    }

    /// 获得有存活簇的运行次数.
    #[inline]
    pub fn get_target(&self) -> u64 {
        self.target
    }

    /// 获得不一致次数.
    #[inline]
    pub fn get_mismatched(&self) -> u64 {
        self.mismatched
    }

    /// 以微秒为单位获得聚类总耗时.
    #[inline]
    pub fn get_run_time_us(&self) -> u64 {
        self.run_time.get_total_us()
    }

    /// 以微秒为单位获得任务总耗时.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 以微秒为单位获得单次聚类的平均耗时.
    pub fn get_avg_run_time_us(&self) -> Option<f64> {
        match self.trivial + self.target {
            0 => None,
            runs => Some(self.get_run_time_us() as f64 / runs as f64),
        }
    }

    /// 获得有存活簇的运行中, 平均每次的簇个数.
    pub fn get_avg_clusters(&self) -> Option<f64> {
        match self.target {
            0 => None,
            target => Some(self.clusters as f64 / target as f64),
        }
    }

    /// 获取最耗时的一次运行. 如果没有运行过, 则返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
