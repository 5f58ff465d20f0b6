//! 文本过滤器
//!
//! 在合成前剔除不适合朗读的编辑性内容：引用资料块（`<details>` 标签）、
//! 思考过程标记、孤立的 Link 行等。规则可通过配置扩展。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::FilterConfig;

/// 一条过滤规则：匹配到的内容整体删除
#[derive(Debug)]
struct FilterRule {
    name: &'static str,
    pattern: Regex,
}

/// 自定义规则（来自配置）
#[derive(Debug)]
struct CustomFilterRule {
    name: String,
    pattern: Regex,
}

// 清理阶段的正则
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static DOI_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"DOI:[^\n]*").unwrap());
static ISSUE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Issue\s+\d+[^\n]*").unwrap());
static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// 内置规则集
///
/// 顺序即应用顺序：先移除完整的块，再处理残缺的开/闭标签。
fn default_rules() -> Vec<FilterRule> {
    let sources: [(&'static str, &'static str); 6] = [
        ("完整 details 块", r"(?s)<details>.*?</details>"),
        ("summary 标签", r"(?s)<summary>.*?</summary>"),
        ("未闭合的 details", r"(?s)<details>.*\z"),
        ("孤立的 details 闭标签", r"(?s)\A.*?</details>"),
        // regex crate 不支持前瞻，此规则连同结尾空行一起吞掉，
        // 差异会被后续的空行折叠抹平
        ("思考过程块", r"(?s)思考过程：.*?(?:\n\n|\z)"),
        ("孤立 Link 行", r"Link[ \t]*\n"),
    ];

    sources
        .into_iter()
        .map(|(name, pattern)| FilterRule {
            name,
            pattern: Regex::new(pattern).expect("builtin filter rule must compile"),
        })
        .collect()
}

/// 文本过滤器
///
/// 未启用时 `filter` 原样返回输入
pub struct TextFilter {
    enabled: bool,
    rules: Vec<FilterRule>,
    custom_rules: Vec<CustomFilterRule>,
}

impl TextFilter {
    /// 关闭状态的过滤器（透传）
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            rules: Vec::new(),
            custom_rules: Vec::new(),
        }
    }

    /// 从配置构建过滤器
    ///
    /// 无效的自定义规则记录错误日志后跳过，不影响其他规则
    pub fn from_config(config: &FilterConfig) -> Self {
        if !config.enabled {
            tracing::info!("text filter disabled");
            return Self::disabled();
        }

        let rules = if config.use_default_rules {
            default_rules()
        } else {
            Vec::new()
        };

        let mut custom_rules = Vec::new();
        for rule in &config.custom_rules {
            let source = if rule.is_regex {
                rule.pattern.clone()
            } else {
                regex::escape(&rule.pattern)
            };
            match Regex::new(&source) {
                Ok(pattern) => custom_rules.push(CustomFilterRule {
                    name: rule.name.clone(),
                    pattern,
                }),
                Err(e) => {
                    tracing::error!(rule = %rule.name, error = %e, "invalid custom filter rule, skipped");
                }
            }
        }

        tracing::info!(
            builtin_rules = rules.len(),
            custom_rules = custom_rules.len(),
            "text filter enabled"
        );

        Self {
            enabled: true,
            rules,
            custom_rules,
        }
    }

    /// 过滤文本中不需要 TTS 的内容
    pub fn filter(&self, text: &str) -> String {
        if !self.enabled || text.is_empty() {
            return text.to_string();
        }

        let mut filtered = text.to_string();
        let mut removed = 0usize;

        for rule in &self.rules {
            let (next, count) = apply_rule(&filtered, &rule.pattern);
            if count > 0 {
                tracing::debug!(rule = rule.name, matches = count, "filter rule applied");
                removed += count;
            }
            filtered = next;
        }
        for rule in &self.custom_rules {
            let (next, count) = apply_rule(&filtered, &rule.pattern);
            if count > 0 {
                tracing::debug!(rule = %rule.name, matches = count, "custom filter rule applied");
                removed += count;
            }
            filtered = next;
        }

        let cleaned = final_cleanup(&filtered);

        if removed > 0 {
            tracing::info!(
                removed,
                original_len = text.chars().count(),
                filtered_len = cleaned.chars().count(),
                "text filter removed content"
            );
        }

        cleaned
    }
}

fn apply_rule(text: &str, pattern: &Regex) -> (String, usize) {
    let count = pattern.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (pattern.replace_all(text, "").into_owned(), count)
}

/// 最终清理：剩余 HTML 标签、DOI/Issue 引用行、多余空行
fn final_cleanup(text: &str) -> String {
    let cleaned = HTML_TAG.replace_all(text, "");
    let cleaned = DOI_LINE.replace_all(&cleaned, "");
    let cleaned = ISSUE_LINE.replace_all(&cleaned, "");
    let cleaned = EXCESS_BLANK_LINES.replace_all(&cleaned, "\n\n");
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomRuleConfig;

    fn enabled_filter() -> TextFilter {
        TextFilter::from_config(&FilterConfig {
            enabled: true,
            use_default_rules: true,
            custom_rules: Vec::new(),
        })
    }

    #[test]
    fn test_disabled_filter_passes_through() {
        let filter = TextFilter::disabled();
        let text = "<details>引用资料</details>正文";
        assert_eq!(filter.filter(text), text);
    }

    #[test]
    fn test_details_block_removed() {
        let filter = enabled_filter();
        let text = "前文。<details><summary>资料[1]: 来源</summary>引用内容</details>后文。";
        assert_eq!(filter.filter(text), "前文。后文。");
    }

    #[test]
    fn test_multiple_details_blocks_removed() {
        let filter = enabled_filter();
        let text = "<details>a</details>中间<details>b</details>结尾";
        assert_eq!(filter.filter(text), "中间结尾");
    }

    #[test]
    fn test_unterminated_details_removed_to_end() {
        let filter = enabled_filter();
        let text = "正文。<details><summary>资料</summary>没有闭合";
        assert_eq!(filter.filter(text), "正文。");
    }

    #[test]
    fn test_reasoning_block_removed() {
        let filter = enabled_filter();
        let text = "思考过程：让我想一想这个问题\n分几步走\n\n最终答案在这里。";
        assert_eq!(filter.filter(text), "最终答案在这里。");
    }

    #[test]
    fn test_link_line_removed() {
        let filter = enabled_filter();
        let text = "第一段\nLink\n第二段";
        assert_eq!(filter.filter(text), "第一段\n第二段");
    }

    #[test]
    fn test_stray_html_tags_stripped() {
        let filter = enabled_filter();
        assert_eq!(filter.filter("粗体<b>文字</b>结束"), "粗体文字结束");
    }

    #[test]
    fn test_excess_blank_lines_collapsed() {
        let filter = enabled_filter();
        assert_eq!(filter.filter("段落一\n\n\n\n段落二"), "段落一\n\n段落二");
    }

    #[test]
    fn test_custom_literal_rule_escaped() {
        let filter = TextFilter::from_config(&FilterConfig {
            enabled: true,
            use_default_rules: false,
            custom_rules: vec![CustomRuleConfig {
                name: "广告".to_string(),
                pattern: "[广告]".to_string(),
                is_regex: false,
            }],
        });
        // 字面模式中的方括号被转义，不作为字符类匹配
        assert_eq!(filter.filter("正文[广告]继续"), "正文继续");
        assert_eq!(filter.filter("广告两个字保留"), "广告两个字保留");
    }

    #[test]
    fn test_invalid_custom_rule_skipped() {
        let filter = TextFilter::from_config(&FilterConfig {
            enabled: true,
            use_default_rules: true,
            custom_rules: vec![CustomRuleConfig {
                name: "坏规则".to_string(),
                pattern: "([unclosed".to_string(),
                is_regex: true,
            }],
        });
        // 坏规则被跳过，内置规则仍然生效
        assert_eq!(filter.filter("<details>x</details>ok"), "ok");
    }
}
