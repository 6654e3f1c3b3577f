//! 批处理工作流辅助函数.
//!
//! 聚类本身不关心这些: 是否处理某个断层图, 完成后写哪个哨兵文件,
//! 以及如何为新的 motive list 腾出位置, 都由外部批处理驱动决定.
//! 这里只提供路径约定和相应的文件操作.

use crate::consts::naming::{ARCHIVE_PREFIX, MOTL_PREFIX, POST_PROCESSED_SUFFIX};
use crate::ClusterError;
use log::info;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 交叉验证的 fold.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Fold {
    /// 不做划分, 所有断层图都处理. 文本形式为 `None`.
    #[default]
    All,

    /// 第 `n` 个 fold, 只处理其测试集中的断层图.
    Index(u32),
}

impl FromStr for Fold {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "None" => Ok(Self::All),
            t => t
                .parse()
                .map(Self::Index)
                .map_err(|_| ClusterError::InvalidFold(s.to_string())),
        }
    }
}

impl fmt::Display for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("None"),
            Self::Index(n) => write!(f, "{n}"),
        }
    }
}

/// 断层图 `tomo_name` 在 `fold` 下是否需要聚类?
///
/// [`Fold::All`] 时总是需要; 否则仅当它属于该 fold 的测试集 `testing_list`.
pub fn should_process<S: AsRef<str>>(tomo_name: &str, fold: Fold, testing_list: &[S]) -> bool {
    match fold {
        Fold::All => true,
        Fold::Index(_) => testing_list.iter().any(|t| t.as_ref() == tomo_name),
    }
}

/// 后处理完成后写出的哨兵文件路径:
/// `{output_dir}/predictions/{model_name}/{tomo_name}/{pred_class}/.{fold}.post_processed_prediction.mrc`.
pub fn sentinel_path<P: AsRef<Path>>(
    output_dir: P,
    model_name: &str,
    tomo_name: &str,
    pred_class: &str,
    fold: Fold,
) -> PathBuf {
    output_dir
        .as_ref()
        .join("predictions")
        .join(model_name)
        .join(tomo_name)
        .join(pred_class)
        .join(format!(".{fold}.{POST_PROCESSED_SUFFIX}"))
}

/// 写出空的哨兵文件, 必要时创建上级目录. 文件已存在时将其截断为空.
pub fn touch_sentinel<P: AsRef<Path>>(path: P) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path)?;
    info!("Created sentinel {}", path.display());
    Ok(())
}

/// 含 `n` 个簇的 motive list 文件名, 即 `motl_{n}.csv`.
pub fn motl_file_name(n: usize) -> String {
    format!("{MOTL_PREFIX}{n}.csv")
}

/// 在写出新的 motive list 之前, 将 `dir` 中所有文件名含 `motl` 的条目重命名为 `prev_{name}`.
///
/// 返回重命名后的路径, 按原文件名排序.
///
/// # 注意
///
/// 已经归档过的 `prev_motl_*` 也含 `motl`, 因此会再被加一层前缀, 这与重复运行的历史保持一致.
pub fn archive_previous_motls<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.contains("motl"))
        .collect();
    names.sort_unstable();

    let mut archived = Vec::with_capacity(names.len());
    for name in names {
        let to = dir.join(format!("{ARCHIVE_PREFIX}{name}"));
        info!("A motive list already exists: {name}");
        fs::rename(dir.join(&name), &to)?;
        archived.push(to);
    }
    Ok(archived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_parse() {
        assert_eq!("None".parse::<Fold>().unwrap(), Fold::All);
        assert_eq!(" 3 ".parse::<Fold>().unwrap(), Fold::Index(3));
        assert!(matches!(
            "-1".parse::<Fold>(),
            Err(ClusterError::InvalidFold(s)) if s == "-1"
        ));
        assert_eq!(Fold::All.to_string(), "None");
        assert_eq!(Fold::Index(2).to_string(), "2");
    }

    #[test]
    fn test_should_process() {
        let testing = ["tomo_a", "tomo_b"];
        assert!(should_process("tomo_c", Fold::All, &testing));
        assert!(should_process("tomo_b", Fold::Index(0), &testing));
        assert!(!should_process("tomo_c", Fold::Index(0), &testing));
        assert!(!should_process::<String>("tomo_a", Fold::Index(1), &[]));
    }

    #[test]
    fn test_sentinel_path() {
        let p = sentinel_path("/out", "unet_d4", "180426_004", "ribo", Fold::Index(1));
        assert_eq!(
            p,
            PathBuf::from("/out/predictions/unet_d4/180426_004/ribo/.1.post_processed_prediction.mrc")
        );
        let p = sentinel_path("/out", "m", "t", "c", Fold::All);
        assert!(p.ends_with(".None.post_processed_prediction.mrc"));
    }

    #[test]
    fn test_touch_sentinel() {
        let tmp = tempfile::tempdir().unwrap();
        let p = sentinel_path(tmp.path(), "m", "t", "c", Fold::All);
        touch_sentinel(&p).unwrap();
        assert!(p.is_file());
        assert_eq!(fs::metadata(&p).unwrap().len(), 0);
        // 重复写出不报错.
        touch_sentinel(&p).unwrap();
    }

    #[test]
    fn test_archive_previous_motls() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        for name in [motl_file_name(12), motl_file_name(3), "prediction.mrc".to_string()] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let moved = archive_previous_motls(dir).unwrap();
        assert_eq!(
            moved,
            vec![dir.join("prev_motl_12.csv"), dir.join("prev_motl_3.csv")]
        );
        assert!(!dir.join("motl_3.csv").exists());
        assert!(dir.join("prediction.mrc").exists());

        assert!(archive_previous_motls(dir.join("missing")).is_err());
    }
}
