use anyhow::Result;
use crate::config::{Config, MAX_THREAD_COUNT};
use crate::core::target::Target;

/// 目标描述符必须是 `<主机>/<路径>`
pub fn validate_target(descriptor: &str) -> Result<()> {
    if Target::parse(descriptor).is_err() {
        anyhow::bail!("无效的目标 {:?}，格式应为 <主机>/<路径>", descriptor);
    }
    Ok(())
}

pub fn validate_thread_count(threads: usize) -> Result<()> {
    if threads == 0 {
        anyhow::bail!("线程数必须大于0");
    }
    if threads > MAX_THREAD_COUNT {
        anyhow::bail!("线程数不能超过{}", MAX_THREAD_COUNT);
    }
    Ok(())
}

pub fn validate_output_path(path: &str) -> Result<()> {
    if path.is_empty() {
        anyhow::bail!("输出路径不能为空");
    }
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<()> {
    validate_thread_count(config.thread_count)?;
    validate_output_path(&config.download_dir)?;
    config.validate()?;
    Ok(())
}
