#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod host;
mod updater;

use std::sync::Arc;
use std::thread;

use dashprint_app::{
    AppError, BRIDGE_CAPABILITY_ID, MAIN_WINDOW_LABEL, PRODUCT_NAME, ShellConfig, WINDOW_HEIGHT,
    WINDOW_WIDTH, about_info, app_version, bridge_origin_pattern, build_timestamp,
    default_log_dir, install_run_logger, keep_running_without_windows,
};
use dashprint_bridge::{BRIDGE_GLOBAL, BridgeCapability, PrintBridge, initialization_script};
use dashprint_print::{DispatchWorker, PrintDispatcher, SpoolDirectory};
use dashprint_ui::{DialogPresenter, MenuAction, WindowHost, menu_template};
use dashprint_update::{UpdateController, UpdatePhase, UpdateTrigger};
use serde_json::Value;
use tauri::ipc::CapabilityBuilder;
use tauri::menu::{Menu, MenuItem, Submenu};
use tauri::{
    AppHandle, Manager, RunEvent, Runtime, State, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};

use crate::host::TauriHost;
use crate::updater::TauriUpdateClient;

const LOG_TARGET: &str = "dashprint::app";

/// Long-lived services shared by commands, menu handlers and run events.
struct Shell {
    config: ShellConfig,
    host: Arc<TauriHost>,
    updates: Arc<UpdateController>,
}

#[tauri::command]
fn bridge_print(bridge: State<'_, PrintBridge>, printer_name: Value, copies: Value) {
    bridge.print(&printer_name, &copies);
}

#[tauri::command]
fn bridge_print_html_content(bridge: State<'_, PrintBridge>, html: String, printer_name: Value) {
    bridge.print_html_content(html, &printer_name);
}

#[tauri::command]
fn bridge_print_bytes(bridge: State<'_, PrintBridge>, bytes: Vec<u8>, printer_name: Value) {
    bridge.print_bytes(bytes, &printer_name);
}

fn main() {
    match install_run_logger(&default_log_dir()) {
        Ok(path) => log::info!(target: LOG_TARGET, "log_file={}", path.display()),
        Err(error) => eprintln!("{PRODUCT_NAME}: logging disabled: {error}"),
    }
    log::info!(
        target: LOG_TARGET,
        "starting {PRODUCT_NAME} v{} build_timestamp={}",
        app_version(),
        build_timestamp()
    );

    if let Err(error) = run() {
        log::error!(target: LOG_TARGET, "startup failed: {error}");
        eprintln!("{PRODUCT_NAME}: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = ShellConfig::from_env()?;
    log::info!(
        target: LOG_TARGET,
        "config dashboard={} update_endpoint={} disposal={:?}",
        config.dashboard_url,
        config
            .update_endpoint
            .as_ref()
            .map_or_else(|| "<bundled>".to_string(), ToString::to_string),
        config.print_window_disposal
    );

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_updater::Builder::new().build())
        .invoke_handler(tauri::generate_handler![
            bridge_print,
            bridge_print_html_content,
            bridge_print_bytes
        ])
        .menu(build_menu)
        .on_menu_event(|app, event| handle_menu(app, event.id().as_ref()))
        .setup(move |app| {
            let handle = app.handle().clone();
            let shell = start_services(&handle, config)?;
            app.manage(shell);
            let shell = app.state::<Shell>();

            grant_bridge(&handle, &shell.config)?;
            open_primary_window(&handle, &shell.config)?;
            schedule_startup_check(&shell);
            Ok(())
        })
        .build(tauri::generate_context!())?;

    app.run(handle_run_event);
    Ok(())
}

fn start_services(app: &AppHandle, config: ShellConfig) -> Result<Shell, AppError> {
    let host = Arc::new(TauriHost::new(app.clone()));

    let dispatcher = PrintDispatcher::new(
        host.clone(),
        host.clone(),
        SpoolDirectory::in_temp_dir(),
        config.print_window_disposal,
    );
    // The worker thread runs until the bridge's sender is dropped at exit.
    let worker = DispatchWorker::spawn(dispatcher)?;
    app.manage(PrintBridge::new(Arc::new(worker.sender())));

    let client = Arc::new(TauriUpdateClient::new(
        app.clone(),
        config.update_endpoint.clone(),
    ));
    let updates = UpdateController::new(config.update_policy, client, host.clone(), host.clone());

    Ok(Shell {
        config,
        host,
        updates,
    })
}

fn grant_bridge(app: &AppHandle, config: &ShellConfig) -> tauri::Result<()> {
    let mut capability = CapabilityBuilder::new(BRIDGE_CAPABILITY_ID)
        .remote(bridge_origin_pattern(&config.dashboard_url))
        .window(MAIN_WINDOW_LABEL);
    for bridge_capability in BridgeCapability::ALL {
        capability = capability.permission(bridge_capability.permission());
    }
    app.add_capability(capability)
}

fn open_primary_window(app: &AppHandle, config: &ShellConfig) -> tauri::Result<WebviewWindow> {
    let script = initialization_script(BRIDGE_GLOBAL);
    let window = WebviewWindowBuilder::new(
        app,
        MAIN_WINDOW_LABEL,
        WebviewUrl::External(config.dashboard_url.clone()),
    )
    .title(PRODUCT_NAME)
    .inner_size(WINDOW_WIDTH, WINDOW_HEIGHT)
    .initialization_script(&script)
    .build()?;

    log::info!(target: LOG_TARGET, "primary window loading {}", config.dashboard_url);
    Ok(window)
}

fn schedule_startup_check(shell: &Shell) {
    let updates = Arc::clone(&shell.updates);
    let delay = shell.config.update_policy.startup_delay;
    let spawned = thread::Builder::new()
        .name("dashprint-update-delay".to_string())
        .spawn(move || {
            thread::sleep(delay);
            updates.check(UpdateTrigger::Automatic);
        });
    if let Err(error) = spawned {
        log::error!(target: LOG_TARGET, "startup update check not scheduled: {error}");
    }
}

fn build_menu<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<Menu<R>> {
    let menu = Menu::new(app)?;
    for template in menu_template() {
        let submenu = Submenu::new(app, template.label, true)?;
        for entry in &template.entries {
            let item = MenuItem::with_id(
                app,
                entry.action.id(),
                entry.label,
                true,
                entry.accelerator,
            )?;
            submenu.append(&item)?;
        }
        menu.append(&submenu)?;
    }
    Ok(menu)
}

fn handle_menu(app: &AppHandle, id: &str) {
    let Some(action) = MenuAction::from_id(id) else {
        log::debug!(target: LOG_TARGET, "unknown menu id {id}");
        return;
    };
    let Some(shell) = app.try_state::<Shell>() else {
        return;
    };

    match action {
        MenuAction::Exit => app.exit(0),
        MenuAction::CheckForUpdates => shell.updates.check(UpdateTrigger::Manual),
        MenuAction::About => {
            let parent = shell.host.primary_window();
            shell.host.show(parent.as_ref(), about_info().dialog());
        }
    }
}

fn handle_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        RunEvent::ExitRequested { api, code, .. } => {
            let Some(shell) = app.try_state::<Shell>() else {
                return;
            };
            let installing = matches!(shell.updates.snapshot().phase(), UpdatePhase::Installing(_));
            if code.is_none()
                && (installing || keep_running_without_windows(cfg!(target_os = "macos")))
            {
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen {
            has_visible_windows,
            ..
        } => {
            let Some(shell) = app.try_state::<Shell>() else {
                return;
            };
            let primary_alive = shell.host.primary_window().is_some();
            if dashprint_app::should_recreate_primary(has_visible_windows, primary_alive)
                && let Err(error) = open_primary_window(app, &shell.config)
            {
                log::error!(target: LOG_TARGET, "primary window not re-created: {error}");
            }
        }
        RunEvent::Exit => {
            let Some(shell) = app.try_state::<Shell>() else {
                return;
            };
            log::info!(target: LOG_TARGET, "exiting");
            shell.updates.finish_on_quit();
        }
        _ => {}
    }
}
