//! 通用常量.

/// 二值体素取值.
pub mod voxel {
    /// 二值图中背景体素的值.
    pub const BACKGROUND: u8 = 0;

    /// 二值图中前景体素的值.
    pub const FOREGROUND: u8 = 1;

    /// 标签图中背景 (非任何簇成员) 的标签.
    pub const NO_LABEL: u32 = 0;

    /// 体素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != BACKGROUND
    }

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        p == BACKGROUND
    }
}

/// 默认参数. 配置文件缺少对应键时使用.
pub mod defaults {
    /// 默认概率阈值.
    pub const THRESHOLD: f32 = 0.5;

    /// 默认最小簇体素数 (含).
    pub const MIN_CLUSTER_SIZE: usize = 1;

    /// 默认最大簇体素数 (含).
    pub const MAX_CLUSTER_SIZE: usize = usize::MAX;

    /// 默认连通性.
    pub const CONNECTIVITY: u32 = 26;

    /// 默认掩膜策略.
    pub const CONTACT_MODE: &str = "none";

    /// 并行标记时每个 z 方向分块的默认厚度.
    pub const SLAB_DEPTH: usize = 32;
}

/// 工作流文件命名.
pub mod naming {
    /// 后处理预测结果的文件名后缀. 哨兵文件名形如 `.{fold}.post_processed_prediction.mrc`.
    pub const POST_PROCESSED_SUFFIX: &str = "post_processed_prediction.mrc";

    /// motive list 文件名前缀.
    pub const MOTL_PREFIX: &str = "motl_";

    /// 归档旧 motive list 时添加的前缀.
    pub const ARCHIVE_PREFIX: &str = "prev_";
}
