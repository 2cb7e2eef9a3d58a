use std::collections::BTreeSet;

use colored::Color;
use serde::Serialize;

/// 默认关注的HTTP状态码
pub const DEFAULT_ALLOWED_STATUS: [u16; 3] = [200, 403, 404];

/// 状态码的展示类别，只影响输出颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Success,
    Forbidden,
    NotFound,
    Other,
}

impl StatusCategory {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => StatusCategory::Success,
            403 => StatusCategory::Forbidden,
            404 => StatusCategory::NotFound,
            _ => StatusCategory::Other,
        }
    }

    pub fn color(self) -> Color {
        match self {
            StatusCategory::Success => Color::Green,
            StatusCategory::Forbidden => Color::Yellow,
            StatusCategory::NotFound => Color::Red,
            StatusCategory::Other => Color::White,
        }
    }
}

/// 状态码分类器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    allowed: BTreeSet<u16>,
}

impl Classifier {
    pub fn new(allowed: BTreeSet<u16>) -> Self {
        Classifier { allowed }
    }

    /// 返回 (是否输出, 展示类别)
    pub fn classify(&self, status: u16) -> (bool, StatusCategory) {
        (
            self.allowed.contains(&status),
            StatusCategory::from_status(status),
        )
    }

    pub fn allowed(&self) -> &BTreeSet<u16> {
        &self.allowed
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(DEFAULT_ALLOWED_STATUS.into_iter().collect())
    }
}
