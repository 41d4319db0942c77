//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 同步原语 (Synchronization Primitives)
//!
//! 参考 Linux 内核的同步机制设计：
//! - `include/linux/spinlock.h` - 自旋锁
//! - `include/linux/semaphore.h` - 信号量
//! - `kernel/locking/` - 锁实现
//!
//! 核心概念：
//! - 自旋锁：忙等互斥，获取失败时自旋而不挂起线程
//! - 信号量：许可计数，P 操作 (down) 获取、V 操作 (up) 释放，
//!   无许可时挂起线程等待唤醒
//!
//! 两个原语相互独立，实例级作用域，没有任何全局状态。
//! 调用方通过共享引用（`Arc` 或 static）在线程间共用。

extern crate log;

pub mod errno;
pub mod semaphore;
pub mod spinlock;

pub use errno::SyncError;
pub use semaphore::{Semaphore, SemaphoreGuard};
pub use spinlock::{Spinlock, SpinlockGuard};

#[cfg(test)]
mod tests;
