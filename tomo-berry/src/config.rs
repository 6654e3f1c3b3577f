//! 聚类参数.
//!
//! 分两层: [`RawClusterConfig`] 只负责承载 (可从 YAML 反序列化);
//! [`ClusterConfig`] 是校验后的版本, 非法取值在构造时即被拒绝.

use crate::consts::defaults;
use crate::ClusterError;
use std::fmt;
use std::str::FromStr;

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use crate::ClusterResult;
        use serde::Deserialize;
        use std::path::Path;
    }
}

/// 体素邻接规则.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Connectivity {
    /// 6-邻域, 仅共面.
    Face6,

    /// 18-邻域, 共面或共棱.
    Edge18,

    /// 26-邻域, 共面, 共棱或共顶点.
    Corner26,
}

impl Connectivity {
    /// 邻居个数: 6, 18 或 26.
    #[inline]
    pub const fn neighbours(&self) -> u32 {
        match self {
            Self::Face6 => 6,
            Self::Edge18 => 18,
            Self::Corner26 => 26,
        }
    }

    /// 邻居偏移量允许的最大曼哈顿距离: 1, 2 或 3.
    #[inline]
    pub const fn rank(&self) -> u32 {
        match self {
            Self::Face6 => 1,
            Self::Edge18 => 2,
            Self::Corner26 => 3,
        }
    }
}

/// 同时接受 `6 | 18 | 26` 和秩写法 `1 | 2 | 3`.
impl TryFrom<u32> for Connectivity {
    type Error = ClusterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 | 6 => Ok(Self::Face6),
            2 | 18 => Ok(Self::Edge18),
            3 | 26 => Ok(Self::Corner26),
            other => Err(ClusterError::UnsupportedConnectivity(other)),
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.neighbours())
    }
}

/// 掩膜选择策略.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ContactMode {
    /// 不使用掩膜, 直接对预测结果聚类.
    None,

    /// 预测与掩膜逐体素取交后再聚类.
    Intersection,

    /// 只保留与掩膜前景 (在同一邻接规则下) 相邻的簇.
    Contact,

    /// 只保留与掩膜前景的欧氏距离不超过 `contact_distance` 的簇.
    Colocalization,
}

impl ContactMode {
    /// 该策略是否需要掩膜?
    #[inline]
    pub const fn requires_mask(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// 配置文件中的名字.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Intersection => "intersection",
            Self::Contact => "contact",
            Self::Colocalization => "colocalization",
        }
    }
}

impl FromStr for ContactMode {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "intersection" => Ok(Self::Intersection),
            "contact" => Ok(Self::Contact),
            "colocalization" => Ok(Self::Colocalization),
            _ => Err(ClusterError::UnsupportedContactMode(s.to_string())),
        }
    }
}

impl fmt::Display for ContactMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 边缘抑制厚度. 单个整数作用于三个轴, 或者按 `[ix, iy, iz]` 分别指定.
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawBorder"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BorderThickness {
    /// 三个轴使用同一厚度.
    Uniform(usize),

    /// 三个轴分别指定厚度.
    PerAxis {
        /// x 轴 (宽) 厚度.
        x: usize,

        /// y 轴 (高) 厚度.
        y: usize,

        /// z 轴 (切片方向) 厚度.
        z: usize,
    },
}

impl BorderThickness {
    /// 按 `(ix, iy, iz)` 顺序展开.
    #[inline]
    pub const fn per_axis(&self) -> (usize, usize, usize) {
        match *self {
            Self::Uniform(t) => (t, t, t),
            Self::PerAxis { x, y, z } => (x, y, z),
        }
    }

    /// 是否三个轴都不做抑制?
    #[inline]
    pub const fn is_noop(&self) -> bool {
        matches!(self.per_axis(), (0, 0, 0))
    }
}

impl Default for BorderThickness {
    #[inline]
    fn default() -> Self {
        Self::Uniform(0)
    }
}

impl From<usize> for BorderThickness {
    #[inline]
    fn from(t: usize) -> Self {
        Self::Uniform(t)
    }
}

/// `[ix, iy, iz]`.
impl From<[usize; 3]> for BorderThickness {
    #[inline]
    fn from([x, y, z]: [usize; 3]) -> Self {
        Self::PerAxis { x, y, z }
    }
}

/// YAML 中 `ignore_border_thickness` 的两种写法.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBorder {
    Uniform(usize),
    PerAxis([usize; 3]),
}

#[cfg(feature = "serde")]
impl From<RawBorder> for BorderThickness {
    fn from(raw: RawBorder) -> Self {
        match raw {
            RawBorder::Uniform(t) => t.into(),
            RawBorder::PerAxis(arr) => arr.into(),
        }
    }
}

/// 未经校验的聚类参数.
///
/// 字段名即 YAML 配置键, 缺失的键取默认值.
/// 通过 `ClusterConfig::try_from` 校验后才能交给算法使用.
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct RawClusterConfig {
    /// 概率阈值. 体素值严格大于它时记为前景.
    pub threshold: f32,

    /// 最小簇体素数 (含).
    pub min_cluster_size: usize,

    /// 最大簇体素数 (含).
    pub max_cluster_size: usize,

    /// 连通性, `6 | 18 | 26` 或 `1 | 2 | 3`.
    #[cfg_attr(feature = "serde", serde(alias = "connectivity"))]
    pub clustering_connectivity: u32,

    /// 掩膜策略名.
    pub contact_mode: String,

    /// 共定位距离 (体素单位). 仅 `colocalization` 使用.
    pub contact_distance: f64,

    /// 边缘抑制厚度.
    pub ignore_border_thickness: BorderThickness,

    /// 是否需要输出 motive list. 由外部写出者使用.
    pub calculate_motl: bool,

    /// 数据集表中掩膜所在的列名. 由外部配置组装层使用.
    pub region_mask: Option<String>,
}

impl Default for RawClusterConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::THRESHOLD,
            min_cluster_size: defaults::MIN_CLUSTER_SIZE,
            max_cluster_size: defaults::MAX_CLUSTER_SIZE,
            clustering_connectivity: defaults::CONNECTIVITY,
            contact_mode: defaults::CONTACT_MODE.to_string(),
            contact_distance: 0.0,
            ignore_border_thickness: BorderThickness::default(),
            calculate_motl: true,
            region_mask: None,
        }
    }
}

/// 校验后的聚类参数. 只能通过 `TryFrom<RawClusterConfig>` 或 `Default` 获得.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterConfig {
    threshold: f32,
    min_cluster_size: usize,
    max_cluster_size: usize,
    connectivity: Connectivity,
    contact_mode: ContactMode,
    contact_distance: f64,
    border: BorderThickness,
    calculate_motl: bool,
    region_mask: Option<String>,
    parallel: bool,
}

impl TryFrom<RawClusterConfig> for ClusterConfig {
    type Error = ClusterError;

    fn try_from(raw: RawClusterConfig) -> Result<Self, Self::Error> {
        if !raw.threshold.is_finite() {
            return Err(ClusterError::InvalidThreshold(raw.threshold));
        }
        if raw.min_cluster_size > raw.max_cluster_size {
            return Err(ClusterError::InvalidSizeRange {
                min: raw.min_cluster_size,
                max: raw.max_cluster_size,
            });
        }
        let connectivity = Connectivity::try_from(raw.clustering_connectivity)?;
        let contact_mode: ContactMode = raw.contact_mode.parse()?;

        // 其它策略不读取该值, 不做约束.
        if contact_mode == ContactMode::Colocalization
            && !(raw.contact_distance.is_finite() && raw.contact_distance >= 0.0)
        {
            return Err(ClusterError::InvalidContactDistance(raw.contact_distance));
        }

        Ok(Self {
            threshold: raw.threshold,
            min_cluster_size: raw.min_cluster_size,
            max_cluster_size: raw.max_cluster_size,
            connectivity,
            contact_mode,
            contact_distance: raw.contact_distance,
            border: raw.ignore_border_thickness,
            calculate_motl: raw.calculate_motl,
            region_mask: raw.region_mask,
            parallel: cfg!(feature = "rayon"),
        })
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::THRESHOLD,
            min_cluster_size: defaults::MIN_CLUSTER_SIZE,
            max_cluster_size: defaults::MAX_CLUSTER_SIZE,
            connectivity: Connectivity::Corner26,
            contact_mode: ContactMode::None,
            contact_distance: 0.0,
            border: BorderThickness::default(),
            calculate_motl: true,
            region_mask: None,
            parallel: cfg!(feature = "rayon"),
        }
    }
}

impl ClusterConfig {
    /// 从 YAML 文本加载并校验.
    #[cfg(feature = "serde")]
    pub fn from_yaml_str(s: &str) -> ClusterResult<Self> {
        let raw: RawClusterConfig = serde_yaml::from_str(s)?;
        raw.try_into()
    }

    /// 从 YAML 读取流加载并校验.
    #[cfg(feature = "serde")]
    pub fn from_yaml_reader<R: std::io::Read>(reader: R) -> ClusterResult<Self> {
        let raw: RawClusterConfig = serde_yaml::from_reader(reader)?;
        raw.try_into()
    }

    /// 打开 YAML 配置文件. `path` 为本地路径.
    #[cfg(feature = "serde")]
    pub fn open<P: AsRef<Path>>(path: P) -> ClusterResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_yaml_reader(std::io::BufReader::new(file))
    }

    /// 概率阈值.
    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// 尺寸区间 `[min, max]`, 两端均包含.
    #[inline]
    pub fn size_range(&self) -> (usize, usize) {
        (self.min_cluster_size, self.max_cluster_size)
    }

    /// 连通性.
    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// 掩膜策略.
    #[inline]
    pub fn contact_mode(&self) -> ContactMode {
        self.contact_mode
    }

    /// 共定位距离 (体素单位).
    #[inline]
    pub fn contact_distance(&self) -> f64 {
        self.contact_distance
    }

    /// 边缘抑制厚度.
    #[inline]
    pub fn border(&self) -> BorderThickness {
        self.border
    }

    /// 是否需要输出 motive list.
    #[inline]
    pub fn calculate_motl(&self) -> bool {
        self.calculate_motl
    }

    /// 掩膜列名.
    #[inline]
    pub fn region_mask(&self) -> Option<&str> {
        self.region_mask.as_deref()
    }

    /// 是否走并行路径. 未开启 `rayon` feature 时恒为 `false`.
    #[inline]
    pub fn parallel(&self) -> bool {
        self.parallel && cfg!(feature = "rayon")
    }

    /// 设定是否走并行路径.
    #[inline]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 退回 `none` 策略. 当某个断层图没有可用掩膜时, 由调用方决定是否这样做.
    #[inline]
    pub fn without_mask(mut self) -> Self {
        self.contact_mode = ContactMode::None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawClusterConfig {
        RawClusterConfig::default()
    }

    #[test]
    fn test_connectivity_parse() {
        assert_eq!(Connectivity::try_from(6).unwrap(), Connectivity::Face6);
        assert_eq!(Connectivity::try_from(1).unwrap(), Connectivity::Face6);
        assert_eq!(Connectivity::try_from(18).unwrap(), Connectivity::Edge18);
        assert_eq!(Connectivity::try_from(3).unwrap(), Connectivity::Corner26);
        assert!(matches!(
            Connectivity::try_from(8),
            Err(ClusterError::UnsupportedConnectivity(8))
        ));
    }

    #[test]
    fn test_contact_mode_parse() {
        assert_eq!("none".parse::<ContactMode>().unwrap(), ContactMode::None);
        assert_eq!(
            " Colocalization ".parse::<ContactMode>().unwrap(),
            ContactMode::Colocalization
        );
        assert!(matches!(
            "overlap".parse::<ContactMode>(),
            Err(ClusterError::UnsupportedContactMode(s)) if s == "overlap"
        ));
        assert!(!ContactMode::None.requires_mask());
        assert!(ContactMode::Contact.requires_mask());
    }

    #[test]
    fn test_border_thickness() {
        assert_eq!(BorderThickness::from(2).per_axis(), (2, 2, 2));
        assert_eq!(BorderThickness::from([1, 2, 3]).per_axis(), (1, 2, 3));
        assert!(BorderThickness::default().is_noop());
    }

    #[test]
    fn test_validation() {
        assert!(ClusterConfig::try_from(raw()).is_ok());

        let mut r = raw();
        r.threshold = f32::NAN;
        assert!(matches!(
            ClusterConfig::try_from(r),
            Err(ClusterError::InvalidThreshold(_))
        ));

        let mut r = raw();
        r.min_cluster_size = 10;
        r.max_cluster_size = 5;
        assert!(matches!(
            ClusterConfig::try_from(r),
            Err(ClusterError::InvalidSizeRange { min: 10, max: 5 })
        ));

        let mut r = raw();
        r.contact_mode = "colocalization".to_string();
        r.contact_distance = -1.0;
        assert!(matches!(
            ClusterConfig::try_from(r),
            Err(ClusterError::InvalidContactDistance(_))
        ));

        // 非共定位策略不检查距离.
        let mut r = raw();
        r.contact_mode = "contact".to_string();
        r.contact_distance = -1.0;
        assert!(ClusterConfig::try_from(r).is_ok());
    }

    #[test]
    fn test_without_mask() {
        let mut r = raw();
        r.contact_mode = "intersection".to_string();
        let c = ClusterConfig::try_from(r).unwrap().without_mask();
        assert_eq!(c.contact_mode(), ContactMode::None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_yaml() {
        let text = "\
threshold: 0.3
min_cluster_size: 5
max_cluster_size: 100
clustering_connectivity: 1
contact_mode: colocalization
contact_distance: 2.5
ignore_border_thickness: [4, 5, 6]
region_mask: membranes
";
        let c = ClusterConfig::from_yaml_str(text).unwrap();
        assert_eq!(c.threshold(), 0.3);
        assert_eq!(c.size_range(), (5, 100));
        assert_eq!(c.connectivity(), Connectivity::Face6);
        assert_eq!(c.contact_mode(), ContactMode::Colocalization);
        assert_eq!(c.contact_distance(), 2.5);
        assert_eq!(c.border().per_axis(), (4, 5, 6));
        assert_eq!(c.region_mask(), Some("membranes"));
        assert!(c.calculate_motl());

        let c = ClusterConfig::from_yaml_str("connectivity: 18\nignore_border_thickness: 3\n")
            .unwrap();
        assert_eq!(c.connectivity(), Connectivity::Edge18);
        assert_eq!(c.border(), BorderThickness::Uniform(3));
        assert_eq!(c.contact_mode(), ContactMode::None);

        assert!(matches!(
            ClusterConfig::from_yaml_str("contact_mode: overlap\n"),
            Err(ClusterError::UnsupportedContactMode(_))
        ));
        assert!(matches!(
            ClusterConfig::from_yaml_str("threshold: [1, 2]\n"),
            Err(ClusterError::Yaml(_))
        ));
    }
}
