use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::{
    application::{
        ChartSession, DataAcquisitionService, DatasetCache, SessionUpdate, StoredPreferences,
    },
    config::AppConfig,
    domain::{
        chart::ChartLayoutEngine,
        errors::AppError,
        logging::{LogComponent, LogEntry, Logger, get_logger},
    },
    infrastructure::{
        http::HttpStockDataSource,
        rendering::EChartsSurface,
        services::{BrowserTimeProvider, ConsoleLogger},
        storage::LocalStorageStore,
    },
};

const MAX_LOG_LINES: usize = 100;

// Bridge from domain::logging to the debug console
thread_local! {
    static GLOBAL_LOGS: RwSignal<Vec<String>> = create_rw_signal(Vec::new());
    static IS_LOG_PAUSED: RwSignal<bool> = create_rw_signal(false);
}

/// Writes to the browser console and mirrors every entry into the on-page
/// debug console.
pub struct LeptosLogger {
    console: ConsoleLogger,
}

impl LeptosLogger {
    pub fn new(console: ConsoleLogger) -> Self {
        Self { console }
    }
}

impl Logger for LeptosLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.console.min_level() {
            return;
        }
        let line = entry.format_line();
        self.console.log(entry);

        GLOBAL_LOGS.with(|logs| {
            IS_LOG_PAUSED.with(|paused| {
                if !paused.get_untracked() {
                    logs.update(|lines| {
                        lines.push(line);
                        let overflow = lines.len().saturating_sub(MAX_LOG_LINES);
                        if overflow > 0 {
                            lines.drain(..overflow);
                        }
                    });
                }
            });
        });
    }
}

type PagePreferences = StoredPreferences<LocalStorageStore>;
type PageSession = ChartSession<EChartsSurface, PagePreferences>;
type PageAcquisition =
    DataAcquisitionService<HttpStockDataSource, LocalStorageStore, PagePreferences>;

/// Setters the session writes back into after every transition
#[derive(Clone, Copy)]
struct SessionView {
    set_panel_count: WriteSignal<usize>,
    set_selections: WriteSignal<Vec<String>>,
    set_options: WriteSignal<Vec<String>>,
    set_chart_height: WriteSignal<u32>,
    set_status: WriteSignal<String>,
}

impl SessionView {
    fn sync(&self, session: &PageSession, result: Result<SessionUpdate, AppError>) {
        let selector = session.selector();
        self.set_panel_count.set(selector.panel_count());
        self.set_selections.set(selector.selections());
        self.set_options.set(selector.options().to_vec());

        match result {
            Ok(update) => {
                if !update.changes.is_empty() {
                    get_logger().debug(
                        LogComponent::Presentation("Selectors"),
                        &format!("{:?}", update.changes),
                    );
                }
                if let Some(report) = update.report {
                    self.set_chart_height.set(report.container_height);
                    let status = if report.skipped_panels.is_empty() {
                        format!("{} series", report.series_count)
                    } else {
                        format!(
                            "{} series, {} panel(s) without data",
                            report.series_count,
                            report.skipped_panels.len()
                        )
                    };
                    self.set_status.set(status);
                }
            }
            Err(e) => {
                get_logger().error(LogComponent::Presentation("App"), &e.to_string());
                self.set_status.set(e.user_message());
            }
        }
    }
}

/// `None` for anything that is not a non-negative integer.
fn parse_panel_count(raw: &str) -> Option<usize> {
    raw.trim().parse().ok()
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Stock chart page: search box, panel controls, chart and debug console
#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_page();
    let store = LocalStorageStore::new();
    let preferences = StoredPreferences::new(store, &config.storage_prefix);

    let engine = ChartLayoutEngine::new(config.layout.clone()).with_title(config.title.clone());
    let mut session = ChartSession::new(
        EChartsSurface::new(config.container_id.clone()),
        preferences.clone(),
        engine,
        config.max_panels,
    );
    let saved = session.init();

    let acquisition: Rc<PageAcquisition> = Rc::new(DataAcquisitionService::new(
        HttpStockDataSource::new(config.endpoint.clone(), config.query_param.clone()),
        DatasetCache::new(store, config.storage_prefix.clone(), config.cache_ttl_ms),
        preferences,
        Arc::new(BrowserTimeProvider::new()),
    ));

    let (stock_code, set_stock_code) =
        create_signal(saved.last_stock_code.clone().unwrap_or_default());
    let (panel_count, set_panel_count) = create_signal(session.selector().panel_count());
    let (selections, set_selections) = create_signal(session.selector().selections());
    let (options, set_options) = create_signal(session.selector().options().to_vec());
    let (chart_height, set_chart_height) =
        create_signal(config.layout.container_height(session.selector().panel_count()));
    let (status, set_status) = create_signal(String::new());

    let view_state = SessionView {
        set_panel_count,
        set_selections,
        set_options,
        set_chart_height,
        set_status,
    };
    let session: Rc<RefCell<PageSession>> = Rc::new(RefCell::new(session));

    let search = {
        let session = Rc::clone(&session);
        move |raw: String| {
            let session = Rc::clone(&session);
            let acquisition = Rc::clone(&acquisition);
            wasm_bindgen_futures::spawn_local(async move {
                set_status.set(format!("Loading {}...", raw.trim()));
                match acquisition.resolve(&raw).await {
                    Ok(dataset) => {
                        let result = session.borrow_mut().replace_dataset(dataset);
                        view_state.sync(&session.borrow(), result);
                    }
                    Err(e) => {
                        set_status.set(e.to_string());
                        alert(&e.user_message());
                    }
                }
            });
        }
    };

    if let Some(code) = saved.last_stock_code {
        search(code);
    }

    let on_panel_count = {
        let session = Rc::clone(&session);
        move |ev: ev::Event| {
            let Some(count) = parse_panel_count(&event_target_value(&ev)) else {
                // put the current count back into the input
                set_panel_count.set(session.borrow().selector().panel_count());
                return;
            };
            let result = session.borrow_mut().set_panel_count(count);
            view_state.sync(&session.borrow(), result);
        }
    };

    {
        let session = Rc::clone(&session);
        on_cleanup(move || session.borrow_mut().dispose());
    }

    let search_on_enter = search.clone();
    let container_id = config.container_id.clone();
    let max_panels = config.max_panels;

    view! {
        <div class="stock-chart-app">
            <div class="controls">
                <input
                    type="text"
                    placeholder="Stock code, e.g. 000001.SZ"
                    prop:value=move || stock_code.get()
                    on:input=move |ev| set_stock_code.set(event_target_value(&ev))
                    on:keydown=move |ev: ev::KeyboardEvent| {
                        if ev.key() == "Enter" {
                            search_on_enter(stock_code.get_untracked());
                        }
                    }
                />
                <button on:click=move |_| search(stock_code.get_untracked())>"Search"</button>
                <label>
                    "Sub-panels "
                    <input
                        type="number"
                        min="0"
                        max=max_panels
                        prop:value=move || panel_count.get()
                        on:change=on_panel_count
                    />
                </label>
            </div>
            <div class="panel-selectors">
                <For
                    each={move || selections.get().into_iter().enumerate().collect::<Vec<_>>()}
                    key=|(slot, name)| (*slot, name.clone())
                    children=move |(slot, selected)| {
                        let session = Rc::clone(&session);
                        view! {
                            <PanelSelect
                                panel=slot + 1
                                selected=selected
                                options=options
                                on_select=move |panel, name: String| {
                                    let result = session.borrow_mut().set_selection(panel, &name);
                                    view_state.sync(&session.borrow(), result);
                                }
                            />
                        }
                    }
                />
            </div>
            <div
                id=container_id
                style=move || format!("width: 100%; height: {}px;", chart_height.get())
            ></div>
            <div class="status">{move || status.get()}</div>
            <DebugConsole />
        </div>
    }
}

/// One `<select>` per sub-panel
#[component]
fn PanelSelect<F>(
    panel: usize,
    selected: String,
    options: ReadSignal<Vec<String>>,
    on_select: F,
) -> impl IntoView
where
    F: Fn(usize, String) + 'static,
{
    let none_selected = selected.is_empty();
    view! {
        <label class="panel-select">
            {format!("Panel {} ", panel)}
            <select on:change=move |ev| on_select(panel, event_target_value(&ev))>
                <option value="" selected=none_selected>"None"</option>
                {move || {
                    let selected = selected.clone();
                    options
                        .get()
                        .into_iter()
                        .map(|name| {
                            let is_selected = name == selected;
                            view! {
                                <option value=name.clone() selected=is_selected>{name}</option>
                            }
                        })
                        .collect_view()
                }}
            </select>
        </label>
    }
}

/// Debug console fed by the logger bridge
#[component]
fn DebugConsole() -> impl IntoView {
    let logs = GLOBAL_LOGS.with(|logs| *logs);
    let is_paused = IS_LOG_PAUSED.with(|paused| *paused);

    view! {
        <div class="debug-console">
            <div class="debug-header">
                <span>"Log"</span>
                <button
                    on:click=move |_| {
                        is_paused.update(|p| *p = !*p);
                        let state = if is_paused.get_untracked() { "paused" } else { "resumed" };
                        get_logger().info(
                            LogComponent::Presentation("DebugConsole"),
                            &format!("logging {}", state),
                        );
                    }
                    class="debug-btn"
                >
                    {move || if is_paused.get() { "Resume" } else { "Pause" }}
                </button>
                <button
                    on:click=move |_| logs.set(Vec::new())
                    class="debug-btn"
                >
                    "Clear"
                </button>
            </div>
            <div class="debug-log">
                <For
                    each={move || logs.get().into_iter().enumerate().collect::<Vec<_>>()}
                    key=|(index, line)| (*index, line.clone())
                    children=move |(_, line)| {
                        view! { <div class="log-line">{line}</div> }
                    }
                />
            </div>
        </div>
    }
}
