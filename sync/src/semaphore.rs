//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 信号量 (Semaphore) 机制
//!
//! 参考 Linux 内核的信号量设计：
//! - `include/linux/semaphore.h` - 信号量接口
//! - `kernel/locking/semaphore.c` - 信号量操作
//!
//! 核心概念：
//! - 信号量维护一个许可计数，最多允许 capacity 个并发持有者
//! - P 操作 (down): 获取许可，计数为 0 时阻塞（挂起线程，不自旋）
//! - V 操作 (up): 归还许可，唤醒一个等待的线程
//!
//! 计数和等待集合由同一把互斥锁保护，
//! 减一判零、加一唤醒各自都是不可分割的事务。

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::errno::SyncError;

/// 信号量
///
/// 计数信号量，创建时固定容量 `capacity >= 1`，
/// 初始所有许可都可用。未释放的许可数恒等于
/// `capacity - count()`，计数永远不会超出 `[0, capacity]`。
///
/// # 示例
/// ```
/// use ksync::Semaphore;
///
/// // 互斥信号量（二值信号量）
/// let mutex = Semaphore::new(1).unwrap();
///
/// // 计数信号量（资源池）
/// let pool = Semaphore::new(10).unwrap();
///
/// pool.down();   // 获取许可
/// // ... 使用资源 ...
/// pool.up().unwrap();  // 归还许可
/// ```
pub struct Semaphore {
    /// 剩余可用许可数
    /// 由互斥锁保护，与等待集合的操作构成单一原子事务
    available: Mutex<usize>,
    /// 等待集合
    /// 计数为 0 时，等待的线程在此挂起
    waiters: Condvar,
    /// 许可容量，构造后不可变
    capacity: usize,
}

impl Semaphore {
    /// 创建新信号量
    ///
    /// # 参数
    /// * `capacity` - 许可容量，必须 >= 1
    ///
    /// # 返回
    /// - `Ok(sem)` - 创建成功，所有许可初始可用
    /// - `Err(SyncError::InvalidCapacity)` - `capacity == 0`
    ///
    /// 容量非法时直接拒绝而不是收敛到 1，
    /// 避免掩盖调用方的 bug。
    pub fn new(capacity: usize) -> Result<Self, SyncError> {
        if capacity == 0 {
            return Err(SyncError::InvalidCapacity);
        }
        Ok(Self {
            available: Mutex::new(capacity),
            waiters: Condvar::new(),
            capacity,
        })
    }

    /// P 操作（阻塞）
    ///
    /// 也称为 down 操作或 wait 操作
    ///
    /// # 行为
    /// - 如果有可用许可，立即减一并返回
    /// - 如果计数为 0，挂起当前线程（不消耗 CPU），
    ///   直到某次 up 唤醒并把许可交给它
    ///
    /// 唤醒路径上重新检查计数，虚假唤醒不会导致
    /// 许可超发。
    ///
    /// # 示例
    /// ```
    /// use ksync::Semaphore;
    /// let sem = Semaphore::new(1).unwrap();
    /// sem.down();  // 获取许可
    /// // ... 临界区 ...
    /// sem.up().unwrap();  // 归还许可
    /// ```
    pub fn down(&self) {
        let mut available = self.lock_count();
        while *available == 0 {
            log::trace!("semaphore: no permit available, suspending (capacity={})", self.capacity);
            available = self
                .waiters
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
    }

    /// 尝试 P 操作（非阻塞）
    ///
    /// 也称为 down_trylock 操作
    ///
    /// # 返回
    /// - `Ok(())` - 成功获取一个许可
    /// - `Err(SyncError::WouldBlock)` - 当前没有可用许可，计数不变
    pub fn down_trylock(&self) -> Result<(), SyncError> {
        let mut available = self.lock_count();
        if *available == 0 {
            return Err(SyncError::WouldBlock);
        }
        *available -= 1;
        Ok(())
    }

    /// 限时 P 操作
    ///
    /// # 参数
    /// * `timeout` - 最长等待时间
    ///
    /// # 返回
    /// - `Ok(())` - 在截止时间内获取到许可
    /// - `Err(SyncError::TimedOut)` - 超时，未消耗任何许可，
    ///   计数保持一致
    pub fn down_timeout(&self, timeout: Duration) -> Result<(), SyncError> {
        // 超出时钟可表示范围的超时退化为无限等待
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => {
                self.down();
                return Ok(());
            }
        };
        let mut available = self.lock_count();
        while *available == 0 {
            let now = Instant::now();
            if now >= deadline {
                return Err(SyncError::TimedOut);
            }
            let (guard, result) = self
                .waiters
                .wait_timeout(available, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            available = guard;
            if result.timed_out() && *available == 0 {
                return Err(SyncError::TimedOut);
            }
        }
        *available -= 1;
        Ok(())
    }

    /// V 操作（归还许可）
    ///
    /// 也称为 up 操作或 signal 操作
    ///
    /// # 行为
    /// - 计数加一，如果有线程在等待，唤醒其中一个
    /// - 计数已达容量时拒绝本次释放，计数保持在容量上限，
    ///   后续的 down/up 记账不受影响
    ///
    /// # 返回
    /// - `Ok(())` - 成功归还一个许可
    /// - `Err(SyncError::Overflow)` - 释放次数超过获取次数
    pub fn up(&self) -> Result<(), SyncError> {
        {
            let mut available = self.lock_count();
            if *available < self.capacity {
                *available += 1;
                self.waiters.notify_one();
                return Ok(());
            }
        }
        // 日志在释放内部锁之后发出，慢日志器不会把并发的
        // down/up 串行在它后面
        log::warn!(
            "semaphore: unbalanced up rejected (capacity={})",
            self.capacity
        );
        Err(SyncError::Overflow)
    }

    /// 获取当前可用许可数
    ///
    /// # 注意
    /// 此值仅供参考，实际值可能在返回后立即改变
    pub fn count(&self) -> usize {
        *self.lock_count()
    }

    /// 获取许可容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 获取许可守护（RAII）
    ///
    /// 构造时执行 down，守护离开作用域时自动 up，
    /// 保证所有退出路径上 P/V 配对。
    ///
    /// # 示例
    /// ```
    /// use ksync::Semaphore;
    /// let sem = Semaphore::new(4).unwrap();
    /// {
    ///     let _permit = sem.access();
    ///     // ... 使用受限资源 ...
    /// } // 自动归还许可
    /// ```
    pub fn access(&self) -> SemaphoreGuard<'_> {
        SemaphoreGuard::new(self)
    }

    /// 锁住内部计数
    ///
    /// 持锁期间唯一会执行的外部代码是 down 慢路径上的
    /// trace 日志——condvar 等待必须持锁，这条移不出临界区。
    /// 日志回调 panic 会让锁中毒，但计数更新总在任何
    /// panic 可达点之前完成，中毒的锁里保存的计数仍然一致，
    /// 直接恢复使用，信号量不会因此卡死。
    fn lock_count(&self) -> MutexGuard<'_, usize> {
        self.available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// 信号量许可守护（RAII）
///
/// 持有期间占用一个许可，析构时归还
pub struct SemaphoreGuard<'a> {
    sem: &'a Semaphore,
}

impl<'a> SemaphoreGuard<'a> {
    /// 创建许可守护
    ///
    /// # 参数
    /// * `sem` - 关联的信号量
    pub fn new(sem: &'a Semaphore) -> Self {
        sem.down();
        Self { sem }
    }
}

impl<'a> Drop for SemaphoreGuard<'a> {
    fn drop(&mut self) {
        // 守护保证 down/up 配对，这里的 up 不可能越过容量
        let result = self.sem.up();
        debug_assert!(result.is_ok());
    }
}
