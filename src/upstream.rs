//! # 上游业务服务
//!
//! 第三方登录换取本地令牌，以及 cohort 流程的访问令牌交接

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::{GatewayError, Result};

/// 未配置时在转发地址下使用的第三方登录路径
const THIRD_PARTY_LOGIN_PATH: &str = "/api/users/thirdPartyLogin";

#[derive(Debug, Serialize)]
struct ThirdPartyLoginRequest<'a> {
    third_party_type: &'a str,
    third_party_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ThirdPartyLoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct CohortTokenRequest<'a> {
    gmail: &'a str,
    #[serde(rename = "type")]
    cohort: &'a str,
}

/// 上游业务服务客户端
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    third_party_login_url: String,
    cohort_token_url: Option<String>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        config: &UpstreamConfig,
        transformer_url: &str,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let third_party_login_url = config.third_party_login_url.clone().unwrap_or_else(|| {
            format!(
                "{}{THIRD_PARTY_LOGIN_PATH}",
                transformer_url.trim_end_matches('/')
            )
        });
        url::Url::parse(&third_party_login_url)?;
        if let Some(cohort_url) = &config.cohort_token_url {
            url::Url::parse(cohort_url)?;
        }

        Ok(Self {
            http_client,
            third_party_login_url,
            cohort_token_url: config.cohort_token_url.clone(),
            timeout: Duration::from_secs(config.request_timeout),
        })
    }

    /// 用第三方账号换取本地令牌
    pub async fn third_party_login(&self, third_party_type: &str, third_party_id: &str) -> Result<String> {
        let response = self
            .http_client
            .post(&self.third_party_login_url)
            .timeout(self.timeout)
            .json(&ThirdPartyLoginRequest {
                third_party_type,
                third_party_id,
            })
            .send()
            .await
            .map_err(|e| GatewayError::upstream_with_source("第三方登录请求发送失败", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(format!(
                "第三方登录返回 HTTP {status}"
            )));
        }

        let body: ThirdPartyLoginResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::upstream_with_source("第三方登录响应解析失败", e))?;

        if body.token.is_empty() {
            return Err(GatewayError::upstream("第三方登录响应缺少 token"));
        }
        Ok(body.token)
    }

    /// cohort 流程：提交 gmail 地址，响应体原样作为访问令牌
    pub async fn cohort_access_token(&self, gmail: &str, cohort: &str) -> Result<Vec<u8>> {
        let url = self
            .cohort_token_url
            .as_deref()
            .ok_or_else(|| GatewayError::config("upstream.cohort_token_url 未配置"))?;

        let response = self
            .http_client
            .post(url)
            .timeout(self.timeout)
            .json(&CohortTokenRequest { gmail, cohort })
            .send()
            .await
            .map_err(|e| GatewayError::upstream_with_source("cohort 令牌请求发送失败", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::upstream(format!(
                "cohort 令牌接口返回 HTTP {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::upstream_with_source("cohort 令牌读取失败", e))?;
        if body.is_empty() {
            return Err(GatewayError::upstream("cohort 令牌为空"));
        }
        Ok(body.to_vec())
    }
}
