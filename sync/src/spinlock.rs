//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 自旋锁 (Spinlock) 机制
//!
//! 参考 Linux 内核的自旋锁设计：
//! - `include/linux/spinlock.h` - 自旋锁接口
//! - `kernel/locking/qspinlock.c` - 自旋锁实现
//!
//! 核心概念：
//! - 获取失败时忙等（自旋），不让出调度资源
//! - 标志位的所有访问都是原子的，状态转换由 CAS 完成
//! - 只适合保护非常短的临界区

use core::sync::atomic::{AtomicBool, Ordering};

/// 连续 CAS 失败多少次后主动让出一次 CPU
///
/// 纯自旋在核数少于竞争者数时会饿死持锁线程，
/// 周期性 yield 保证持锁线程总能被调度到。
const SPIN_YIELD_THRESHOLD: u32 = 64;

/// 自旋锁
///
/// 状态只有一个原子布尔标志：`false` = 空闲，`true` = 被持有。
/// 锁本身不拥有、也不感知任何被保护的数据，
/// 调用者负责在 acquire/release 之间访问自己的共享状态。
///
/// # 示例
/// ```
/// use ksync::Spinlock;
///
/// static LOCK: Spinlock = Spinlock::new();
///
/// LOCK.acquire();
/// // ... 临界区 ...
/// LOCK.release();
/// ```
pub struct Spinlock {
    /// 锁标志
    /// `false` 表示空闲，`true` 表示被持有
    locked: AtomicBool,
}

impl Spinlock {
    /// 创建新自旋锁（初始为空闲状态）
    ///
    /// const fn，可用于 static：
    /// ```
    /// use ksync::Spinlock;
    /// static LOCK: Spinlock = Spinlock::new();
    /// ```
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// 获取锁（忙等）
    ///
    /// # 行为
    /// - 通过 CAS 尝试把标志从 `false` 置为 `true`
    /// - 失败则自旋重试，不挂起当前线程
    /// - 返回时保证当前线程独占持有锁，直到调用 [`release`](Self::release)
    ///
    /// Acquire 序保证进入临界区后能看到上一个持有者
    /// release 之前的全部写入。
    pub fn acquire(&self) {
        let mut failures: u32 = 0;
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }

            failures = failures.wrapping_add(1);
            if failures % SPIN_YIELD_THRESHOLD == 0 {
                std::thread::yield_now();
            } else {
                core::hint::spin_loop();
            }
        }
    }

    /// 尝试获取锁（非阻塞）
    ///
    /// # 返回
    /// - `true` - 成功获取锁
    /// - `false` - 锁已被占用
    pub fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// 释放锁
    ///
    /// 只有当前持有者可以调用。单个原子 store 即可，
    /// 不需要 CAS。在未持有锁的情况下调用属于调用方
    /// 契约违规，锁本身不检测（见 [`Spinlock`] 文档）。
    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// 检查锁当前是否被持有
    ///
    /// # 注意
    /// 此值仅供参考，实际状态可能在返回后立即改变
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// 获取锁守护（RAII）
    ///
    /// 守护离开作用域时自动释放锁，包括提前 return
    /// 和 panic 展开路径。
    ///
    /// # 示例
    /// ```
    /// use ksync::Spinlock;
    /// let lock = Spinlock::new();
    /// {
    ///     let _guard = lock.guard();
    ///     // ... 临界区 ...
    /// } // 自动释放锁
    /// ```
    pub fn guard(&self) -> SpinlockGuard<'_> {
        SpinlockGuard::new(self)
    }
}

impl Default for Spinlock {
    fn default() -> Self {
        Self::new()
    }
}

/// 自旋锁守护（RAII）
///
/// 构造时获取锁，析构时释放锁
pub struct SpinlockGuard<'a> {
    lock: &'a Spinlock,
}

impl<'a> SpinlockGuard<'a> {
    /// 创建锁守护
    ///
    /// # 参数
    /// * `lock` - 关联的自旋锁
    pub fn new(lock: &'a Spinlock) -> Self {
        lock.acquire();
        Self { lock }
    }
}

impl<'a> Drop for SpinlockGuard<'a> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
