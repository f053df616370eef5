//! # 回跳地址构造
//!
//! 放入 URL 的查询值一律经过百分号编码。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use crate::error::{GatewayError, Result};

/// 透传跳转：`{pass_url}?type=..&code=..`
pub fn passthrough(pass_url: &str, kind: &str, code: &str) -> Result<String> {
    let mut url = Url::parse(pass_url)?;
    url.query_pairs_mut()
        .append_pair("type", kind)
        .append_pair("code", code);
    Ok(url.into())
}

/// 带 `source` 的 GitHub 回调：`{transformer_url}/{source}?type=github&code=..`
pub fn transformer(transformer_url: &str, source: &str, code: &str) -> Result<String> {
    let mut url = Url::parse(transformer_url)?;
    url.path_segments_mut()
        .map_err(|()| GatewayError::config(format!("转发地址不能作为基础URL: {transformer_url}")))?
        .pop_if_empty()
        .push(source);
    url.query_pairs_mut()
        .append_pair("type", "github")
        .append_pair("code", code);
    Ok(url.into())
}

/// cohort 成功回跳：附加 `j=<base64(令牌)>`
pub fn with_token(success_url: &str, token: &[u8]) -> Result<String> {
    let mut url = Url::parse(success_url).map_err(|e| {
        GatewayError::validation_field(format!("成功回跳地址无效: {e}"), "state")
    })?;
    url.query_pairs_mut().append_pair("j", &STANDARD.encode(token));
    Ok(url.into())
}

/// 校验由 state 带回的回跳地址，校验通过后原样返回
pub fn callback_target(raw: &str) -> Result<String> {
    if raw.chars().any(char::is_control) {
        return Err(GatewayError::validation_field("回跳地址包含控制字符", "state"));
    }
    let url = Url::parse(raw)
        .map_err(|e| GatewayError::validation_field(format!("回跳地址无效: {e}"), "state"))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(GatewayError::validation_field(
            format!("回跳地址协议不支持: {other}"),
            "state",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_encodes_code() {
        let url = passthrough("https://topscore.social/pass", "gmail", "4/0A&x=y").unwrap();
        assert_eq!(
            url,
            "https://topscore.social/pass?type=gmail&code=4%2F0A%26x%3Dy"
        );
    }

    #[test]
    fn test_transformer_appends_source_segment() {
        let url = transformer("https://transformer.knn3.xyz", "ens", "c1").unwrap();
        assert_eq!(url, "https://transformer.knn3.xyz/ens?type=github&code=c1");

        let url = transformer("https://t.example.com/base/", "a/b", "c1").unwrap();
        assert_eq!(url, "https://t.example.com/base/a%2Fb?type=github&code=c1");
    }

    #[test]
    fn test_with_token_base64() {
        let url = with_token("https://knexus.xyz/done", b"tok").unwrap();
        assert_eq!(url, "https://knexus.xyz/done?j=dG9r");
    }

    #[test]
    fn test_callback_target_rejects_other_schemes() {
        assert_eq!(
            callback_target("https://knexus.xyz").unwrap(),
            "https://knexus.xyz"
        );
        assert!(callback_target("https://knexus.xyz/\nx").is_err());
        assert!(callback_target("javascript:alert(1)").is_err());
        assert!(callback_target("not a url").is_err());
    }
}
