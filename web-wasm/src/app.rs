//! メインアプリケーションコンポーネント

use crate::api::InventoryApi;
use crate::components::{
    pagination::TablePagination, table_body::TableBody, table_head::TableHead,
    toolbar::TableToolbar,
};
use inventory_table_common::{
    AuditTransport, ColumnId, Error, FetchRequest, InventorySource, LocationFilter, RoleResolver,
    RowId, TableConfig, TableController,
};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// APIの配置先
const API_BASE: &str = "/api";

/// `?location=` で表示するロケーションを受け取る
fn location_from_url() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
        .and_then(|params| params.get("location"))
        .unwrap_or_default()
}

fn report(error: &Error) {
    web_sys::console::error_1(&error.to_string().into());
}

/// 送信中の監査への連打は無視してよい
fn is_ignorable(error: &Error) -> bool {
    matches!(error, Error::AuditPending(_))
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let api = InventoryApi::new(API_BASE);
    let filter = LocationFilter::new(location_from_url());

    let controller = match TableController::new(TableConfig::default(), filter) {
        Ok(controller) => StoredValue::new_local(controller),
        Err(e) => {
            report(&e);
            return view! { <p class="error">{e.to_string()}</p> }.into_any();
        }
    };

    let (state, set_state) = signal(controller.with_value(|c| c.state()));
    let sync = move || {
        if let Some(next) = controller.try_with_value(|c| c.state()) {
            set_state.set(next);
        }
    };

    // 取得（古い応答はコントローラ側で捨てる）
    let run_fetch = {
        let api = api.clone();
        move |request: FetchRequest| {
            sync();
            let api = api.clone();
            spawn_local(async move {
                let result = api
                    .fetch_page(&request.filter, request.page_index, request.page_size)
                    .await;
                if let Some(Err(e)) =
                    controller.try_update_value(|c| c.apply_fetch(request.generation, result))
                {
                    report(&e);
                }
                sync();
            });
        }
    };

    let on_page = {
        let run_fetch = run_fetch.clone();
        move |page_index: usize| match controller.try_update_value(|c| c.change_page(page_index)) {
            Some(Ok(request)) => run_fetch(request),
            Some(Err(e)) => report(&e),
            None => {}
        }
    };

    let on_page_size = {
        let run_fetch = run_fetch.clone();
        move |page_size: usize| {
            match controller.try_update_value(|c| c.change_page_size(page_size)) {
                Some(Ok(request)) => run_fetch(request),
                Some(Err(e)) => report(&e),
                None => {}
            }
        }
    };

    let on_sort = move |key: ColumnId| {
        controller.update_value(|c| c.request_sort(key));
        sync();
    };

    let on_toggle = move |id: RowId| {
        if let Some(Err(e)) = controller.try_update_value(|c| c.toggle_selection(id)) {
            report(&e);
        }
        sync();
    };

    let on_select_all = move |_: ()| {
        controller.update_value(|c| c.select_all());
        sync();
    };

    // 監査（楽観的に表示を更新し、失敗したら戻す）
    let on_audit = {
        let api = api.clone();
        move |id: RowId| {
            let now = chrono::Utc::now();
            let request = match controller.try_update_value(|c| c.perform_audit(id, now)) {
                Some(Ok(request)) => request,
                Some(Err(e)) if is_ignorable(&e) => {
                    tracing::debug!(id, "audit already in flight");
                    return;
                }
                Some(Err(e)) => {
                    report(&e);
                    return;
                }
                None => return,
            };
            sync();

            let api = api.clone();
            spawn_local(async move {
                let outcome = api.submit_audit(request.id, &request.payload).await;
                let settled =
                    controller.try_update_value(|c| c.settle_audit(request.id, outcome));
                if let Some(Err(e)) = settled {
                    report(&e);
                }
                sync();
            });
        }
    };

    let on_dismiss = move |_: leptos::ev::MouseEvent| {
        controller.update_value(|c| c.dismiss_error());
        sync();
    };

    // 初回：ロール解決と取得
    {
        let api = api.clone();
        spawn_local(async move {
            let result = api.resolve_role().await;
            let role = controller.try_update_value(|c| c.apply_role(result));
            tracing::debug!(?role, "role resolved");
            sync();
        });
    }
    if let Some(request) = controller.try_update_value(|c| c.refresh()) {
        run_fetch(request);
    }

    view! {
        <div class="container">
            <header class="header">
                <h1>"Chemical Inventory"</h1>
                <p class="text-muted">{move || state.get().role.as_str().to_string()}</p>
            </header>

            <Show when=move || state.get().last_error.is_some()>
                <div class="error-banner">
                    <span>
                        {move || state.get().last_error.map(|e| e.to_string()).unwrap_or_default()}
                    </span>
                    <button class="btn" on:click=on_dismiss>"閉じる"</button>
                </div>
            </Show>

            <div class="table-paper">
                <TableToolbar state=state />
                <table class="inventory-table">
                    <TableHead state=state on_select_all=on_select_all on_sort=on_sort />
                    <TableBody state=state on_toggle=on_toggle on_audit=on_audit />
                </table>
                <TablePagination state=state on_page=on_page on_page_size=on_page_size />
            </div>

            <Show when=move || state.get().loading>
                <p class="text-muted">"読み込み中..."</p>
            </Show>
        </div>
    }
    .into_any()
}
