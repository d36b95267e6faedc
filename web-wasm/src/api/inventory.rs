//! 在庫API連携
//!
//! - GET   {base}/chemicals?locationName=..&page=..&pageSize=..  在庫レコード取得
//! - PATCH {base}/chemicals/{id}                                 監査の送信
//! - GET   {base}/auth/session                                   セッション（ロール）

use inventory_table_common::{
    decode_records, AuditAck, AuditPayload, AuditTransport, Error, InventoryRecord,
    InventorySource, LocationFilter, Result, Role, RoleResolver, RowId,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, RequestMode, Response};

/// 監査送信のリクエストボディ
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuditBody<'a> {
    #[serde(rename = "chemicalID")]
    chemical_id: RowId,
    #[serde(flatten)]
    payload: &'a AuditPayload,
}

/// セッションレスポンス（未ログイン時は `{}`）
#[derive(Deserialize, Default)]
#[serde(default)]
struct Session {
    user: Option<SessionUser>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SessionUser {
    role: Option<String>,
}

/// JsValueをエラーメッセージに変換
fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

#[derive(Debug, Clone)]
pub struct InventoryApi {
    base_url: String,
}

impl InventoryApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 取得URL
    pub fn chemicals_url(
        &self,
        filter: &LocationFilter,
        page_index: usize,
        page_size: usize,
    ) -> String {
        let location: String = js_sys::encode_uri_component(&filter.location_name).into();
        format!(
            "{}/chemicals?locationName={}&page={}&pageSize={}",
            self.base_url, location, page_index, page_size
        )
    }

    /// API呼び出し（共通処理）
    ///
    /// 成功時はレスポンス本文を返す。
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> std::result::Result<String, String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_credentials(RequestCredentials::SameOrigin);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        let window = web_sys::window().ok_or_else(|| "window is not available".to_string())?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let resp: Response = resp_value.dyn_into().map_err(js_error)?;

        if !resp.ok() {
            return Err(format!("API error: {} {}", resp.status(), url));
        }

        let text = JsFuture::from(resp.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;
        Ok(text.as_string().unwrap_or_default())
    }
}

impl InventorySource for InventoryApi {
    async fn fetch_page(
        &self,
        filter: &LocationFilter,
        page_index: usize,
        page_size: usize,
    ) -> Result<Vec<InventoryRecord>> {
        let url = self.chemicals_url(filter, page_index, page_size);
        let text = self
            .send("GET", &url, None)
            .await
            .map_err(Error::FetchFailure)?;

        let decoded = decode_records(&text).map_err(|e| Error::FetchFailure(e.to_string()))?;
        for issue in &decoded.issues {
            tracing::warn!(error = %issue, "record skipped");
        }
        Ok(decoded.records)
    }
}

impl AuditTransport for InventoryApi {
    async fn submit_audit(&self, id: RowId, payload: &AuditPayload) -> Result<AuditAck> {
        let failure = |reason: String| Error::MutationFailure { id, reason };

        let body = serde_json::to_string(&AuditBody {
            chemical_id: id,
            payload,
        })
        .map_err(|e| failure(e.to_string()))?;

        let url = format!("{}/chemicals/{}", self.base_url, id);
        self.send("PATCH", &url, Some(body)).await.map_err(failure)?;
        Ok(AuditAck { id })
    }
}

impl RoleResolver for InventoryApi {
    async fn resolve_role(&self) -> Result<Role> {
        let url = format!("{}/auth/session", self.base_url);
        let text = self
            .send("GET", &url, None)
            .await
            .map_err(Error::RoleResolution)?;

        let session: Session = if text.trim().is_empty() {
            Session::default()
        } else {
            serde_json::from_str(&text).map_err(|e| Error::RoleResolution(e.to_string()))?
        };

        let role = session.user.and_then(|u| u.role);
        Ok(Role::from_session_role(role.as_deref()))
    }
}
