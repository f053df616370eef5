//! # 绑定领域类型

use chrono::NaiveDateTime;
use entity::oauth_bind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{GatewayError, Result};

/// 支持的第三方平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Discord,
    Gmail,
    StackExchange,
}

impl Provider {
    pub const ALL: [Self; 4] = [Self::Github, Self::Discord, Self::Gmail, Self::StackExchange];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Discord => "discord",
            Self::Gmail => "gmail",
            Self::StackExchange => "stackexchange",
        }
    }

    /// 存放平台账号的列
    #[must_use]
    pub const fn account_column(self) -> oauth_bind::Column {
        match self {
            Self::Github => oauth_bind::Column::Github,
            Self::Discord => oauth_bind::Column::Discord,
            Self::Gmail => oauth_bind::Column::Gmail,
            Self::StackExchange => oauth_bind::Column::Stackexchange,
        }
    }

    /// 存放展示名的列，gmail 没有
    #[must_use]
    pub const fn display_name_column(self) -> Option<oauth_bind::Column> {
        match self {
            Self::Github => Some(oauth_bind::Column::GithubName),
            Self::Discord => Some(oauth_bind::Column::DiscordName),
            Self::Gmail => None,
            Self::StackExchange => Some(oauth_bind::Column::StackexchangeName),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            "discord" => Ok(Self::Discord),
            "gmail" => Ok(Self::Gmail),
            "stackexchange" | "stackoverflow" => Ok(Self::StackExchange),
            other => Err(GatewayError::validation_field(
                format!("平台不支持: {other}"),
                "type",
            )),
        }
    }
}

/// 可被 f64 精确表示的最大整数（2^53）
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_992.0;

/// 平台范围内唯一的账号标识
///
/// 数值型账号统一为十进制字符串，避免整型与浮点表示不一致。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::validation_field("账号标识不能为空", "account_id"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 从平台返回的 JSON 字段解析
    ///
    /// 字符串去除首尾空白；整数直接格式化；整值浮点数（如 `1234.0`）按整数格式化，
    /// 超出 2^53 的浮点数已丢失精度，不予接受。其余形态返回 `None`。
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()).ok(),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Some(Self(u.to_string()))
                } else if let Some(i) = n.as_i64() {
                    Some(Self(i.to_string()))
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_ID)
                        .map(|f| Self(format!("{f:.0}")))
                }
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 已验证的本地身份（address）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LocalIdentity(String);

impl LocalIdentity {
    /// 去除首尾空白后保存
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::validation_field("本地身份不能为空", "address"));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 平台适配器解析出的账号声明，只在单次请求内存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderClaim {
    pub provider: Provider,
    pub account_id: AccountId,
    pub display_name: Option<String>,
}

impl ProviderClaim {
    #[must_use]
    pub fn new(provider: Provider, account_id: AccountId, display_name: Option<String>) -> Self {
        let display_name = display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Self {
            provider,
            account_id,
            display_name,
        }
    }
}

/// 某平台上已绑定的账号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// 一个本地身份的绑定快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub address: String,
    pub accounts: BTreeMap<Provider, LinkedAccount>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Binding {
    #[must_use]
    pub fn account(&self, provider: Provider) -> Option<&LinkedAccount> {
        self.accounts.get(&provider)
    }
}

impl From<oauth_bind::Model> for Binding {
    fn from(model: oauth_bind::Model) -> Self {
        let slots = [
            (Provider::Github, model.github, model.github_name),
            (Provider::Discord, model.discord, model.discord_name),
            (Provider::Gmail, model.gmail, None),
            (
                Provider::StackExchange,
                model.stackexchange,
                model.stackexchange_name,
            ),
        ];

        let accounts = slots
            .into_iter()
            .filter_map(|(provider, account_id, display_name)| {
                account_id.filter(|id| !id.is_empty()).map(|account_id| {
                    (
                        provider,
                        LinkedAccount {
                            account_id,
                            display_name,
                        },
                    )
                })
            })
            .collect();

        Self {
            address: model.addr,
            accounts,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// 冲突原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// 平台账号已绑定到其他本地身份
    AccountLinkedElsewhere,
    /// 本地身份在该平台已绑定其他账号，且不允许覆盖
    IdentityAlreadyLinked,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountLinkedElsewhere => f.write_str("already bound to another identity"),
            Self::IdentityAlreadyLinked => {
                f.write_str("identity already holds a different account for this provider")
            }
        }
    }
}

/// 绑定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Success { binding: Binding, changed: bool },
    Conflict(ConflictReason),
}

impl BindOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
