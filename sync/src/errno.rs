//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 同步原语错误代码定义
//!
//! 对应 include/uapi/asm-generic/errno.h 中的标准错误号

use core::fmt;

/// 同步原语错误
///
/// 使用方法：
/// ```
/// use ksync::SyncError;
///
/// fn check(capacity: usize) -> Result<(), SyncError> {
///     if capacity == 0 {
///         return Err(SyncError::InvalidCapacity);
///     }
///     Ok(())
/// }
/// ```
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Try again (EAGAIN, 11)
    ///
    /// 非阻塞获取失败，当前没有可用的许可
    WouldBlock = 11,

    /// Invalid argument (EINVAL, 22)
    ///
    /// 信号量容量必须 >= 1
    InvalidCapacity = 22,

    /// Value too large (EOVERFLOW, 75)
    ///
    /// 释放次数超过对应的获取次数，计数将超出容量
    Overflow = 75,

    /// Connection timed out (ETIMEDOUT, 110)
    ///
    /// 限时获取在截止时间内未得到许可
    TimedOut = 110,
}

impl SyncError {
    /// 获取对应的 errno 值
    pub fn errno(&self) -> i32 {
        *self as i32
    }

    /// 获取错误描述字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncError::WouldBlock => "no permit available (EAGAIN)",
            SyncError::InvalidCapacity => "semaphore capacity must be at least 1 (EINVAL)",
            SyncError::Overflow => "release without matching acquire (EOVERFLOW)",
            SyncError::TimedOut => "timed out waiting for a permit (ETIMEDOUT)",
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for SyncError {}
