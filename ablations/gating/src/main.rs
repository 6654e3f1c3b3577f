//! 掩膜选择策略消融实验.
//!
//! 在同一批合成测试体上, 分别以四种掩膜策略和三种连通性运行完整聚类流程,
//! 比较耗时与存活簇个数, 并检查串行与并行标记的结果是否一致.

mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::init_with_level(log::Level::Warn).expect("Logger initialization error");
    println!("Available cores: {}", utils::cpus());
    runner::run().analyze();
}
