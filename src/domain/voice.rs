//! 音色表与音色解析
//!
//! 静态表来自火山引擎浏览器插件（info.json / main.js），
//! 提供 话者名/话者ID → (speaker_id, 后端语言码) 的解析。

use serde::Serialize;

/// 全局默认话者（中文）
pub const DEFAULT_SPEAKER: &str = "zh_male_xiaoming";
/// 全局默认后端语言码
pub const DEFAULT_LANGUAGE: &str = "zh";

/// 一次请求的音色选择，解析后不再变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelector {
    /// 后端话者 ID
    pub speaker: String,
    /// 后端语言码
    pub language: String,
}

impl Default for VoiceSelector {
    fn default() -> Self {
        Self {
            speaker: DEFAULT_SPEAKER.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// 话者表条目
#[derive(Debug, Clone, Copy)]
pub struct VoiceEntry {
    pub id: &'static str,
    pub name: &'static str,
}

/// 语言分组 → 后端语言码
static LANGUAGE_MAP: &[(&str, &str)] = &[
    ("zh_cn", "zh"),
    ("zh_tw", "zh"),
    ("en", "en"),
    ("ja", "jp"),
    ("ko", "kr"),
    ("fr", "fr"),
    ("es", "es"),
    ("ru", "ru"),
    ("de", "de"),
    ("it", "it"),
    ("tr", "tr"),
    ("pt_pt", "pt"),
    ("pt_br", "pt"),
    ("vi", "vi"),
    ("ms", "ms"),
    ("ar", "ar"),
    ("hi", "id"),
];

/// 各语言分组的默认话者
static DEFAULT_SPEAKERS: &[(&str, &str)] = &[
    ("zh_cn", "zh_male_xiaoming"),
    ("zh_tw", "zh_male_xiaoming"),
    ("en", "en_male_adam"),
    ("ja", "jp_male_satoshi"),
    ("ko", "kr_male_gye"),
    ("fr", "fr_male_enzo"),
    ("es", "es_male_george"),
    ("ru", "tts.other.BV068_streaming"),
    ("de", "de_female_sophie"),
    ("it", "tts.other.BV087_streaming"),
    ("tr", "tts.other.BV083_streaming"),
    ("pt_pt", "pt_female_alice"),
    ("pt_br", "pt_female_alice"),
    ("vi", "tts.other.BV074_streaming"),
    ("ms", "tts.other.BV092_streaming"),
    ("ar", "tts.other.BV570_streaming"),
    ("hi", "id_female_noor"),
];

/// 完整话者表（语言分组 → 话者列表）
static VOICE_CATALOG: &[(&str, &[VoiceEntry])] = &[
    (
        "zh_cn",
        &[
            VoiceEntry { id: "zh_male_rap", name: "嘻哈歌手" },
            VoiceEntry { id: "zh_female_sichuan", name: "四川女声" },
            VoiceEntry { id: "tts.other.BV021_streaming", name: "东北男声" },
            VoiceEntry { id: "tts.other.BV026_streaming", name: "粤语男声" },
            VoiceEntry { id: "tts.other.BV025_streaming", name: "台湾女声" },
            VoiceEntry { id: "zh_male_xiaoming", name: "影视配音" },
            VoiceEntry { id: "zh_male_zhubo", name: "男主播" },
            VoiceEntry { id: "zh_female_zhubo", name: "女主播" },
            VoiceEntry { id: "zh_female_qingxin", name: "清新女声" },
            VoiceEntry { id: "zh_female_story", name: "少儿故事" },
        ],
    ),
    (
        "en",
        &[
            VoiceEntry { id: "en_male_adam", name: "美式男声" },
            VoiceEntry { id: "tts.other.BV027_streaming", name: "美式女声" },
            VoiceEntry { id: "en_male_bob", name: "英式男声" },
            VoiceEntry { id: "tts.other.BV032_TOBI_streaming", name: "英式女声" },
            VoiceEntry { id: "tts.other.BV516_streaming", name: "澳洲男声" },
            VoiceEntry { id: "en_female_sarah", name: "澳洲女声" },
        ],
    ),
    (
        "ja",
        &[
            VoiceEntry { id: "jp_male_satoshi", name: "日语男声" },
            VoiceEntry { id: "jp_female_mai", name: "日语女声" },
        ],
    ),
    (
        "ko",
        &[
            VoiceEntry { id: "kr_male_gye", name: "韩语男声" },
            VoiceEntry { id: "tts.other.BV059_streaming", name: "韩语女声" },
        ],
    ),
    (
        "fr",
        &[
            VoiceEntry { id: "fr_male_enzo", name: "法语男声" },
            VoiceEntry { id: "tts.other.BV078_streaming", name: "法语女声" },
        ],
    ),
    (
        "es",
        &[
            VoiceEntry { id: "es_male_george", name: "西语男声" },
            VoiceEntry { id: "tts.other.BV065_streaming", name: "西语女声" },
        ],
    ),
    ("ru", &[VoiceEntry { id: "tts.other.BV068_streaming", name: "俄语女声" }]),
    ("de", &[VoiceEntry { id: "de_female_sophie", name: "德语女声" }]),
    ("it", &[VoiceEntry { id: "tts.other.BV087_streaming", name: "意语男声" }]),
    ("tr", &[VoiceEntry { id: "tts.other.BV083_streaming", name: "土耳其男声" }]),
    (
        "pt_pt",
        &[
            VoiceEntry { id: "tts.other.BV531_streaming", name: "葡语男声" },
            VoiceEntry { id: "pt_female_alice", name: "葡语女声" },
        ],
    ),
    (
        "pt_br",
        &[
            VoiceEntry { id: "tts.other.BV531_streaming", name: "葡语男声" },
            VoiceEntry { id: "pt_female_alice", name: "葡语女声" },
        ],
    ),
    (
        "vi",
        &[
            VoiceEntry { id: "tts.other.BV075_streaming", name: "越南男声" },
            VoiceEntry { id: "tts.other.BV074_streaming", name: "越南女声" },
        ],
    ),
    ("ms", &[VoiceEntry { id: "tts.other.BV092_streaming", name: "马来女声" }]),
    ("ar", &[VoiceEntry { id: "tts.other.BV570_streaming", name: "阿语男声" }]),
    (
        "hi",
        &[
            VoiceEntry { id: "tts.other.BV160_streaming", name: "印尼男声" },
            VoiceEntry { id: "id_female_noor", name: "印尼女声" },
        ],
    ),
];

/// 语言分组码映射为后端语言码
pub fn backend_language(lang_group: &str) -> &'static str {
    LANGUAGE_MAP
        .iter()
        .find(|(group, _)| *group == lang_group)
        .map(|(_, lang)| *lang)
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// 解析调用方传入的音色（话者名或话者 ID）
///
/// 查找顺序固定为：先按话者名匹配，再按话者 ID 匹配。
/// 都未命中时回退到默认话者（zh_male_xiaoming / zh）。
pub fn resolve(voice: &str) -> VoiceSelector {
    // 1. 按话者名查找
    for (lang_group, entries) in VOICE_CATALOG {
        for entry in *entries {
            if entry.name == voice {
                return VoiceSelector {
                    speaker: entry.id.to_string(),
                    language: backend_language(lang_group).to_string(),
                };
            }
        }
    }

    // 2. 按话者 ID 查找
    for (lang_group, entries) in VOICE_CATALOG {
        if entries.iter().any(|entry| entry.id == voice) {
            return VoiceSelector {
                speaker: voice.to_string(),
                language: backend_language(lang_group).to_string(),
            };
        }
    }

    tracing::warn!(voice = %voice, "voice not found, using default voice");
    VoiceSelector::default()
}

/// 话者的对外视图（OpenAI 兼容）
#[derive(Debug, Clone, Serialize)]
pub struct VoiceView {
    pub id: &'static str,
    pub name: &'static str,
    pub model: &'static str,
    pub voice_id: &'static str,
    pub preview_url: Option<&'static str>,
    pub language: &'static str,
    pub language_code: &'static str,
    pub description: &'static str,
    pub is_default: bool,
}

/// 列出所有可用话者
pub fn all_voices() -> Vec<VoiceView> {
    let mut voices = Vec::new();
    for (lang_group, entries) in VOICE_CATALOG {
        let default_id = DEFAULT_SPEAKERS
            .iter()
            .find(|(group, _)| group == lang_group)
            .map(|(_, id)| *id);
        for entry in *entries {
            voices.push(VoiceView {
                id: entry.id,
                name: entry.name,
                model: "tts-1",
                voice_id: entry.id,
                preview_url: None,
                language: lang_group,
                language_code: backend_language(lang_group),
                description: entry.name,
                is_default: default_id == Some(entry.id),
            });
        }
    }
    voices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_display_name() {
        let selector = resolve("影视配音");
        assert_eq!(selector.speaker, "zh_male_xiaoming");
        assert_eq!(selector.language, "zh");
    }

    #[test]
    fn test_resolve_by_speaker_id() {
        let selector = resolve("en_male_adam");
        assert_eq!(selector.speaker, "en_male_adam");
        assert_eq!(selector.language, "en");
    }

    #[test]
    fn test_resolve_japanese_language_mapping() {
        // 语言分组 ja 映射到后端码 jp
        let selector = resolve("jp_female_mai");
        assert_eq!(selector.language, "jp");
    }

    #[test]
    fn test_unknown_voice_falls_back_to_default() {
        let selector = resolve("no_such_voice");
        assert_eq!(selector, VoiceSelector::default());
        assert_eq!(selector.speaker, "zh_male_xiaoming");
    }

    #[test]
    fn test_name_lookup_wins_over_id_lookup() {
        // 名字命中时直接返回，不再尝试 ID 匹配
        let selector = resolve("四川女声");
        assert_eq!(selector.speaker, "zh_female_sichuan");
    }

    #[test]
    fn test_all_voices_catalog() {
        let voices = all_voices();
        assert!(voices.len() >= 30);
        let default = voices
            .iter()
            .find(|v| v.id == "zh_male_xiaoming" && v.language == "zh_cn")
            .unwrap();
        assert!(default.is_default);
        assert_eq!(default.language_code, "zh");
    }

    #[test]
    fn test_language_map_covers_defaults() {
        for (group, _) in DEFAULT_SPEAKERS {
            assert!(
                LANGUAGE_MAP.iter().any(|(g, _)| g == group),
                "default speaker group {} missing from language map",
                group
            );
        }
    }
}
