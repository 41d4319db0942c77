//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 单元测试模块
//!
//! 所有单元测试都在这个模块中，使用标准测试框架运行：
//! ```bash
//! cargo test --package ksync
//! ```
