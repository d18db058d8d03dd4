//! # 等待循环中断处理
//!
//! 只在等待循环期间接管 SIGINT：进入时安装处理函数，退出时恢复原处理方式。
//! 处理函数只设置一个原子标志，由等待循环在睡眠间隙检查。
//! 守卫可以嵌套（多个协调器同时等待），最后一个守卫释放时才恢复。
//!
//! ## 依赖关系
//! - 被 `scheduler/coordinator.rs` 使用
//! - 使用 `nix` 的 sigaction

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// (活动守卫数, 安装前的处理方式)
static INSTALLED: Mutex<Option<(usize, SigAction)>> = Mutex::new(None);

extern "C" fn on_sigint(_: nix::libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
}

/// 进程内取消句柄，可克隆后交给其他组件
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求停止等待
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 是否已请求停止（包括收到 SIGINT）
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || SIGINT_RECEIVED.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
        SIGINT_RECEIVED.store(false, Ordering::SeqCst);
    }
}

/// SIGINT 接管守卫，最后一个守卫 drop 时恢复原处理方式
pub struct SigintGuard {
    _private: (),
}

impl SigintGuard {
    /// 安装处理函数；失败时返回 None，此时 Ctrl-C 保持默认行为
    pub fn install() -> Option<Self> {
        let mut installed = INSTALLED.lock().unwrap_or_else(|e| e.into_inner());
        match installed.as_mut() {
            Some((count, _)) => *count += 1,
            None => {
                let action = SigAction::new(
                    SigHandler::Handler(on_sigint),
                    SaFlags::SA_RESTART,
                    SigSet::empty(),
                );
                // 处理函数只写一个原子变量，是异步信号安全的
                let previous = unsafe { sigaction(Signal::SIGINT, &action) }.ok()?;
                *installed = Some((1, previous));
            }
        }
        Some(SigintGuard { _private: () })
    }
}

impl Drop for SigintGuard {
    fn drop(&mut self) {
        let mut installed = INSTALLED.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((count, previous)) = installed.as_mut() {
            *count -= 1;
            if *count == 0 {
                unsafe {
                    let _ = sigaction(Signal::SIGINT, previous);
                }
                *installed = None;
            }
        }
    }
}

/// 串行化读写进程级 SIGINT 状态的测试
#[cfg(test)]
pub(crate) fn signal_test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
