//! Error Category - Stable error tags
//!
//! Defines the [`ErrorCategory`] enum carried by every [`AppError`](super::app_error::AppError).

use serde::Serialize;

/// エラーカテゴリの列挙体
///
/// HTTP ステータスとは独立した、クライアントに公開される安定したタグです。
/// 同じ 403 でも CSRF 失敗と権限不足を区別できます。
///
/// ## Examples
/// ```rust
/// use kernel::error::category::ErrorCategory;
///
/// assert_eq!(ErrorCategory::Csrf.as_str(), "csrf");
/// assert_eq!(ErrorCategory::default(), ErrorCategory::General);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCategory {
    /// 分類なし
    #[default]
    General,
    /// 入力値の検証エラー
    Validation,
    /// 認証・認可エラー
    Auth,
    /// CSRF トークン検証エラー
    Csrf,
    /// レート制限
    RateLimit,
    /// サーバー内部エラー
    Internal,
}

impl ErrorCategory {
    /// タグ文字列を取得
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::General => "general",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Csrf => "csrf",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable() {
        assert_eq!(ErrorCategory::General.as_str(), "general");
        assert_eq!(ErrorCategory::Csrf.as_str(), "csrf");
        assert_eq!(ErrorCategory::RateLimit.as_str(), "rate_limit");
        assert_eq!(ErrorCategory::Internal.to_string(), "internal");
    }

    #[test]
    fn test_serialize_matches_tag() {
        let json = serde_json::to_string(&ErrorCategory::RateLimit).unwrap();
        assert_eq!(json, r#""rate_limit""#);
        let json = serde_json::to_string(&ErrorCategory::Csrf).unwrap();
        assert_eq!(json, r#""csrf""#);
    }
}
