use std::fs;
use std::path::Path;

use log::debug;

use crate::error::ScanError;
use crate::model::Candidate;

/// 默认字典文件（相对当前工作目录）
pub const DEFAULT_WORDLIST: &str = "wordlist.txt";

/// 子域名字典
///
/// 保存原始行，`candidates` 每次调用都会按文件顺序重新生成候选域名。
#[derive(Debug, Clone, Default)]
pub struct Wordlist {
    lines: Vec<String>,
}

impl Wordlist {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Wordlist {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// 从文件加载字典，非法UTF-8字节被丢弃
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ScanError::WordlistUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let text = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");
        let wordlist = Self::parse(&text);
        debug!("字典加载完成: {} ({} 行)", path.display(), wordlist.lines.len());
        Ok(wordlist)
    }

    /// 按字典顺序生成候选域名，跳过空行
    pub fn candidates<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = Candidate> + 'a {
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|label| !label.is_empty())
            .map(move |label| Candidate::new(label, domain))
    }

    /// 字典原始行数（包含空行）
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
