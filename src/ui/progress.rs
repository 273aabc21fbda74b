use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const WORKER_TEMPLATE: &str = "{msg} [{bar:30}] {pos}/{len} 线程完成";

// 结构体：ProgressManager
// 为并行下载的目标创建进度条，每个线程结束时前进一格
#[derive(Clone)]
pub struct ProgressManager {
    multi: MultiProgress,
    hidden: bool,
}

impl ProgressManager {
    pub fn new() -> Self {
        ProgressManager {
            multi: MultiProgress::new(),
            hidden: false,
        }
    }

    /// 不输出任何内容，用于测试和非终端环境
    pub fn hidden() -> Self {
        ProgressManager {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            hidden: true,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    // 新增：为一个目标添加进度条，长度为线程数
    pub fn worker_bar(&self, label: &str, workers: usize) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(workers as u64));
        if let Ok(style) = ProgressStyle::with_template(WORKER_TEMPLATE) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(label.to_string());
        pb
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
