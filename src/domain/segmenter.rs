//! 文本分段器
//!
//! 将长文本分割为适合 TTS 后端处理的短段落，按标点优先级寻找分割点

/// 默认每段最大字符数
pub const DEFAULT_MAX_CHARS: usize = 500;

/// 句末标点（最高优先级分割点）
#[inline]
fn is_sentence_delimiter(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '。' | '！' | '？')
}

/// 句中标点（次优先级分割点）
#[inline]
fn is_clause_delimiter(ch: char) -> bool {
    matches!(ch, ',' | ';' | ':' | '，' | '；' | '：')
}

/// 空白（最低优先级分割点）
#[inline]
fn is_whitespace_delimiter(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

/// 在窗口内寻找分割点
///
/// 按优先级尝试三类分隔符，取首个有匹配的类别中最后一次出现的位置。
/// 返回分隔符之后的位置（分隔符归前段），找不到则返回 None。
fn find_split_pos(window: &[char]) -> Option<usize> {
    let classes: [fn(char) -> bool; 3] = [
        is_sentence_delimiter,
        is_clause_delimiter,
        is_whitespace_delimiter,
    ];

    for class in classes {
        let last = window.iter().rposition(|&ch| class(ch));
        if let Some(pos) = last {
            return Some(pos + 1);
        }
    }

    None
}

/// 将长文本分割成适合 TTS 处理的短段落
///
/// 分割策略：
/// 1. 文本长度（字符数）不超过 `max_chars` 时原样返回
/// 2. 否则在前 `max_chars` 个字符的窗口内，按
///    句末标点 > 句中标点 > 空白 的优先级从后向前寻找分割点
/// 3. 任何分隔符都找不到时在 `max_chars` 处硬切（可能切断单词）
///
/// 每段两端去除空白；去除后为空的段落被丢弃。纯函数，输出可复现。
pub fn split(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }

    let mut segments = Vec::new();
    let mut remaining: &[char] = &chars;

    while remaining.len() > max_chars {
        let window = &remaining[..max_chars];
        let split_pos = find_split_pos(window).unwrap_or(max_chars);

        let segment: String = remaining[..split_pos].iter().collect();
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            segments.push(trimmed.to_string());
        }

        remaining = trim_chars(&remaining[split_pos..]);
    }

    // 最后一段
    let tail: String = remaining.iter().collect();
    let tail = tail.trim();
    if !tail.is_empty() {
        segments.push(tail.to_string());
    }

    segments
}

/// 去除字符切片两端的空白
fn trim_chars(chars: &[char]) -> &[char] {
    let start = chars
        .iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(chars.len());
    let end = chars
        .iter()
        .rposition(|c| !c.is_whitespace())
        .map(|p| p + 1)
        .unwrap_or(start);
    &chars[start..end]
}
