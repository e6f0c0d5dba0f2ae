// ==========================================
// 产能场景仿真系统 - 预览调度器
// ==========================================
// 职责: 把连续编辑合并为每个静默期一次重算请求,
//       并以序列号守卫丢弃乱序到达的过期响应
// 红线: 最近一次"发出"的请求获胜; 切换场景或进入
//       对比模式必须 cancel() 使旧上下文全部失效
// 并发模型: 协作式异步; 锁从不跨越 await 点
// ==========================================

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use std::future::Future;
use tracing::debug;

/// 预览静默期时长
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(400);

// ==========================================
// ScheduleOutcome - 调度结果
// ==========================================
/// 一次调度的三种结局
///
/// Superseded 与 Stale 都不是错误: 前者在静默期内被更
/// 新的编辑取代 (未发出请求), 后者的响应到达时已不是
/// 最近发出的请求 (静默丢弃)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome<T> {
    /// 请求发出且响应仍为最新, 携带结果值
    Completed(T),
    /// 静默期内被新编辑取代, 未发出请求
    Superseded,
    /// 响应到达时已有更新的请求发出, 丢弃
    Stale,
}

#[derive(Debug)]
struct SchedulerState {
    /// 编辑纪元: 每次编辑/取消递增, 使旧计时器失效
    edit_epoch: u64,
    /// 最近发出的请求序列号
    issued_seq: u64,
}

// ==========================================
// PreviewScheduler - 预览调度器
// ==========================================
pub struct PreviewScheduler {
    debounce: Duration,
    state: Mutex<SchedulerState>,
}

impl PreviewScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: Mutex::new(SchedulerState {
                edit_epoch: 0,
                issued_seq: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // 锁内无 panic 路径, 中毒时直接接管内部状态
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 登记一次编辑并等待静默期
    ///
    /// 返回 false 表示等待期间出现了新的编辑或取消,
    /// 本次调用方不应发出请求。
    pub async fn quiet_period(&self) -> bool {
        let my_epoch = {
            let mut state = self.lock();
            state.edit_epoch += 1;
            state.edit_epoch
        };

        tokio::time::sleep(self.debounce).await;

        self.lock().edit_epoch == my_epoch
    }

    /// 发出请求: 分配单调递增的序列号
    pub fn issue(&self) -> u64 {
        let mut state = self.lock();
        state.issued_seq += 1;
        state.issued_seq
    }

    /// 响应序列号是否仍为最近发出的
    pub fn is_latest(&self, seq: u64) -> bool {
        self.lock().issued_seq == seq
    }

    /// 最近发出的序列号
    pub fn last_issued(&self) -> u64 {
        self.lock().issued_seq
    }

    /// 取消: 杀掉未触发的计时器并使所有在途响应失效
    ///
    /// 场景加载 / 对比模式进出 / 会话销毁时调用
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.edit_epoch += 1;
        state.issued_seq += 1;
        debug!(
            epoch = state.edit_epoch,
            seq = state.issued_seq,
            "预览调度器已取消, 旧上下文失效"
        );
    }

    /// 完整调度一次: 静默期 → 发出请求 → 序列号守卫
    ///
    /// `issue_request` 接收分配的序列号并返回响应 future;
    /// 服务错误原样向上传播, 过期结局以值返回。
    pub async fn schedule<T, E, F, Fut>(&self, issue_request: F) -> Result<ScheduleOutcome<T>, E>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.quiet_period().await {
            debug!("静默期内被新编辑取代, 不发出请求");
            return Ok(ScheduleOutcome::Superseded);
        }

        let seq = self.issue();
        let value = issue_request(seq).await?;

        if !self.is_latest(seq) {
            debug!(seq, latest = self.last_issued(), "丢弃过期响应");
            return Ok(ScheduleOutcome::Stale);
        }

        Ok(ScheduleOutcome::Completed(value))
    }
}

impl Default for PreviewScheduler {
    fn default() -> Self {
        Self::new(PREVIEW_DEBOUNCE)
    }
}
