//! # 跳转状态编解码
//!
//! 把 `variant`、成功/失败回跳地址拼成一个 `state` 参数，穿过第三方平台的
//! 授权跳转后再还原。格式为 `variant$success=<url>$fail=<url>`，整体做
//! 百分号编码。

use thiserror::Error;

/// 分隔符
pub const DELIMITER: char = '$';
const SUCCESS_PREFIX: &str = "success=";
const FAIL_PREFIX: &str = "fail=";

/// 解码后的跳转状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectState {
    pub variant: String,
    pub success_url: String,
    pub fail_url: String,
}

/// 状态解码错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateDecodeError {
    #[error("state 转义无效: {0}")]
    InvalidEscaping(String),
    #[error("state 格式错误: {0}")]
    Malformed(String),
}

/// 编码跳转状态
#[must_use]
pub fn encode(variant: &str, success_url: &str, fail_url: &str) -> String {
    let joined =
        format!("{variant}{DELIMITER}{SUCCESS_PREFIX}{success_url}{DELIMITER}{FAIL_PREFIX}{fail_url}");
    urlencoding::encode(&joined).into_owned()
}

/// 解码跳转状态
///
/// 只切分前两个分隔符，之后出现的分隔符归入失败地址。
pub fn decode(state: &str) -> Result<RedirectState, StateDecodeError> {
    let decoded = unescape(state)?;

    let parts: Vec<&str> = decoded.splitn(3, DELIMITER).collect();
    let [variant, success, fail] = parts.as_slice() else {
        return Err(StateDecodeError::Malformed(format!(
            "需要 3 段，实际 {} 段",
            parts.len()
        )));
    };

    let success_url = success
        .strip_prefix(SUCCESS_PREFIX)
        .ok_or_else(|| StateDecodeError::Malformed(format!("第 2 段缺少 `{SUCCESS_PREFIX}` 前缀")))?;
    let fail_url = fail
        .strip_prefix(FAIL_PREFIX)
        .ok_or_else(|| StateDecodeError::Malformed(format!("第 3 段缺少 `{FAIL_PREFIX}` 前缀")))?;

    Ok(RedirectState {
        variant: (*variant).to_string(),
        success_url: success_url.to_string(),
        fail_url: fail_url.to_string(),
    })
}

/// 解码后第一段，用于 state 结构不完整时判断调用方
pub fn leading_segment(state: &str) -> Result<String, StateDecodeError> {
    let decoded = unescape(state)?;
    Ok(decoded
        .split(DELIMITER)
        .next()
        .unwrap_or_default()
        .to_string())
}

/// 查询参数式反转义：`+` 视为空格，`%XX` 必须是合法的十六进制且结果为 UTF-8
fn unescape(state: &str) -> Result<String, StateDecodeError> {
    let bytes = state.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(StateDecodeError::InvalidEscaping(
                    String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = state.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| StateDecodeError::InvalidEscaping(e.to_string()))
}
