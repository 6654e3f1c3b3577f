//! 🍇欢迎光临🍓
//!
//! 涵盖了聚类流程中一系列常用的类型与函数.

pub use crate::centroid::{extract, ClusterRecord};
pub use crate::config::{BorderThickness, ClusterConfig, Connectivity, ContactMode, RawClusterConfig};
pub use crate::filter::filter_by_size;
pub use crate::label::{label, Labeling};
pub use crate::threshold::{suppress_border, threshold};
pub use crate::workflow::Fold;
pub use crate::{cluster, ClusterError, ClusterResult, Clusters, Idx3d};

#[cfg(feature = "rayon")]
pub use crate::{label::label_par, threshold::threshold_par};
