//! 应用配置
//!
//! 配置按以下顺序叠加：内置默认值 → `config.toml` → `config.{APP_ENV}.toml` →
//! `LMS_*` 环境变量 → 常用环境变量覆盖（`DATABASE_URL`、`SESSION_SECRET` 等）。

mod loader;
mod structs;

pub use structs::*;
