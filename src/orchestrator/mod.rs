//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<query>)
//!     ↓
//! workflow::QueryFlow (处理单个查询)
//!     ↓
//! workflow::extract_loop (单个组件的点击采集循环)
//!     ↓
//! services (能力层：locator / extractor / challenge / captcha / checkpoint / export)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，QueryFlow 管单个查询
//! 2. **资源隔离**：只有编排层持有 Browser 和 JsExecutor
//! 3. **无业务逻辑**：只做调度、计数和进度保护

pub mod batch_processor;

pub use batch_processor::{App, ChallengeGate};
