//! Output locales and the localized message vocabulary.
//!
//! A [`Locale`] is chosen once by the caller (CLI flag or stored config) and
//! passed by value to whatever needs localized text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported output locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
    Zh,
    Ja,
}

impl Locale {
    pub fn all() -> &'static [Locale] {
        &[Locale::En, Locale::Ko, Locale::Zh, Locale::Ja]
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ko => "ko",
            Locale::Zh => "zh",
            Locale::Ja => "ja",
        }
    }

    /// Name of the language in that language.
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ko => "한국어",
            Locale::Zh => "中文",
            Locale::Ja => "日本語",
        }
    }

    /// Parse a code, falling back to English for anything unknown.
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    pub fn messages(self) -> Messages {
        Messages { locale: self }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ko" => Ok(Self::Ko),
            "zh" => Ok(Self::Zh),
            "ja" => Ok(Self::Ja),
            _ => Err(format!("Unknown locale: {}", s)),
        }
    }
}

/// Localized strings for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn default_pr_title(&self) -> &'static str {
        match self.locale {
            Locale::En => "Pull Request",
            Locale::Ko => "풀 리퀘스트",
            Locale::Zh => "拉取请求",
            Locale::Ja => "プルリクエスト",
        }
    }

    pub fn no_changes(&self) -> &'static str {
        match self.locale {
            Locale::En => "No changes.",
            Locale::Ko => "변경 사항이 없습니다.",
            Locale::Zh => "没有变更。",
            Locale::Ja => "変更はありません。",
        }
    }

    /// Sentence naming how many commits a change set contains.
    pub fn commit_summary(&self, count: usize) -> String {
        match self.locale {
            Locale::En if count == 1 => "This change includes 1 commit.".to_string(),
            Locale::En => format!("This change includes {count} commits."),
            Locale::Ko => format!("이 변경에는 {count}개의 커밋이 포함되어 있습니다."),
            Locale::Zh => format!("此变更包含 {count} 个提交。"),
            Locale::Ja => format!("この変更には {count} 件のコミットが含まれています。"),
        }
    }

    /// Suffix listing the participating authors.
    pub fn participants(&self, authors: &str) -> String {
        match self.locale {
            Locale::En => format!(" Contributors: {authors}"),
            Locale::Ko => format!(" 참여자: {authors}"),
            Locale::Zh => format!(" 参与者：{authors}"),
            Locale::Ja => format!(" 参加者: {authors}"),
        }
    }

    pub fn no_commits(&self) -> &'static str {
        match self.locale {
            Locale::En => "No commits found for the selected range.",
            Locale::Ko => "선택한 범위에서 커밋을 찾을 수 없습니다.",
            Locale::Zh => "所选范围内没有找到提交。",
            Locale::Ja => "選択した範囲にコミットが見つかりません。",
        }
    }

    pub fn analyzing_commits(&self, count: usize) -> String {
        match self.locale {
            Locale::En => format!("Analyzing {count} commits..."),
            Locale::Ko => format!("{count}개의 커밋을 분석하는 중..."),
            Locale::Zh => format!("正在分析 {count} 个提交..."),
            Locale::Ja => format!("{count} 件のコミットを分析しています..."),
        }
    }

    pub fn template_detected(&self, path: &str) -> String {
        match self.locale {
            Locale::En => format!("Using GitHub PR template: {path}"),
            Locale::Ko => format!("GitHub PR 템플릿을 사용합니다: {path}"),
            Locale::Zh => format!("使用 GitHub PR 模板：{path}"),
            Locale::Ja => format!("GitHub PR テンプレートを使用します: {path}"),
        }
    }

    pub fn config_saved(&self) -> &'static str {
        match self.locale {
            Locale::En => "Configuration saved.",
            Locale::Ko => "설정이 저장되었습니다.",
            Locale::Zh => "配置已保存。",
            Locale::Ja => "設定を保存しました。",
        }
    }

    pub fn config_reset(&self) -> &'static str {
        match self.locale {
            Locale::En => "Configuration reset to defaults.",
            Locale::Ko => "설정이 초기화되었습니다.",
            Locale::Zh => "配置已重置为默认值。",
            Locale::Ja => "設定を初期化しました。",
        }
    }

    pub fn not_set(&self) -> &'static str {
        match self.locale {
            Locale::En => "not set",
            Locale::Ko => "설정되지 않음",
            Locale::Zh => "未设置",
            Locale::Ja => "未設定",
        }
    }
}
