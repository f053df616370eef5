//! # 平台回调处理器
//!
//! 各平台授权完成后回调到这里，按规则跳转到最终地址；
//! 另提供授权 URL 的构造接口。

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::new_request_id;
use crate::binding::Provider;
use crate::error::{GatewayError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::redirect::{codec, targets};
use crate::server::{response, server::AppState};
use crate::{ensure, ldebug};

/// 回调查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub source: Option<String>,
}

impl CallbackQuery {
    fn code(&self) -> Result<&str> {
        self.code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| GatewayError::validation_field("No authorization code provided.", "code"))
    }
}

/// 授权 URL 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeQuery {
    pub variant: Option<String>,
    pub success: Option<String>,
    pub fail: Option<String>,
}

/// 授权 URL 及其 state
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

fn redirect_or_error(result: Result<String>) -> Response {
    match result {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(err) => {
            err.log();
            response::app_error(err)
        }
    }
}

fn json_or_error(result: Result<AuthorizeUrl>) -> Response {
    match result {
        Ok(authorize) => response::success(authorize),
        Err(err) => {
            err.log();
            response::app_error(err)
        }
    }
}

/// GitHub 回调：带 `source` 时转发到转换服务，否则透传
pub async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let result = query.code().and_then(|code| {
        let redirect = &state.config.redirect;
        match query.source.as_deref().filter(|source| !source.is_empty()) {
            Some(source) => targets::transformer(&redirect.transformer_url, source, code),
            None => targets::passthrough(&redirect.pass_url, Provider::Github.as_str(), code),
        }
    });
    redirect_or_error(result)
}

/// Discord 回调
pub async fn discord_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let result = query.code().and_then(|code| {
        targets::passthrough(
            &state.config.redirect.pass_url,
            Provider::Discord.as_str(),
            code,
        )
    });
    redirect_or_error(result)
}

/// StackExchange 回调
pub async fn stackoverflow_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let result = query.code().and_then(|code| {
        targets::passthrough(
            &state.config.redirect.pass_url,
            Provider::StackExchange.as_str(),
            code,
        )
    });
    redirect_or_error(result)
}

/// Gmail 回调：cohort variant 走令牌交接，其余透传
pub async fn gmail_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let request_id = new_request_id();
    let result = state
        .gmail_flow
        .handle(
            &request_id,
            query.code.as_deref().unwrap_or_default(),
            query.state.as_deref().unwrap_or_default(),
        )
        .await;
    redirect_or_error(result)
}

/// StackExchange 授权 URL
pub async fn stackoverflow_authcode_url(State(state): State<AppState>) -> impl IntoResponse {
    let result = state
        .providers
        .get(Provider::StackExchange)
        .and_then(|adapter| adapter.authorize_url(&plain_state()))
        .map(|url| AuthorizeUrl { url, state: None });
    json_or_error(result)
}

/// 任意平台的授权 URL，可携带 variant 与回跳地址
pub async fn authorize_url(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<AuthorizeQuery>,
) -> impl IntoResponse {
    json_or_error(build_authorize_url(&state, &provider, &query))
}

fn build_authorize_url(
    state: &AppState,
    provider: &str,
    query: &AuthorizeQuery,
) -> Result<AuthorizeUrl> {
    let provider: Provider = provider.parse()?;
    let variant = query.variant.as_deref().filter(|variant| !variant.is_empty());

    let oauth_state = match variant {
        Some(variant) => {
            let success = required(query.success.as_deref(), "success")?;
            let fail = required(query.fail.as_deref(), "fail")?;
            targets::callback_target(success)?;
            targets::callback_target(fail)?;
            ensure!(
                ![variant, success, fail]
                    .iter()
                    .any(|part| part.contains(codec::DELIMITER)),
                validation,
                "variant 与回跳地址不能包含 `{}`",
                codec::DELIMITER
            );
            codec::encode(variant, success, fail)
        }
        None => plain_state(),
    };

    let cohort = provider == Provider::Gmail
        && variant.is_some_and(|variant| state.gmail_flow.variants().is_cohort(variant));
    let adapter = if cohort {
        state.providers.cohort_gmail()?
    } else {
        state.providers.get(provider)?
    };

    ldebug!(
        "system",
        LogStage::Response,
        LogComponent::StateCodec,
        "authorize_url",
        "构造授权 URL",
        provider = provider.as_str(),
        cohort = cohort
    );

    Ok(AuthorizeUrl {
        url: adapter.authorize_url(&oauth_state)?,
        state: Some(oauth_state),
    })
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GatewayError::validation_field(format!("缺少参数: {field}"), field))
}

fn plain_state() -> String {
    Uuid::new_v4().simple().to_string()
}
