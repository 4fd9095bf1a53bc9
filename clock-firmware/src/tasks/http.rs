// HTTP Server Task - Konfigurations-Portal
use alloc::string::String;

use clock_core::ConfigCommand;
use clock_core::portal::{BrightnessForm, FormError, TimezoneForm, WifiForm};
use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::extract::Form;
use picoserve::response::{IntoResponse, Response, StatusCode};
use picoserve::routing::{get, post};

use crate::config::*;
use crate::web::{
    INDEX_HTML,
    protocol::{StatusMessage, form_error_text},
};
use crate::{ConfigSender, StatusCell};

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// Routen:
/// - `GET /` Portal-Seite
/// - `GET /status` Zustand als JSON
/// - `POST /updateWiFi` Felder `ssid`, `psk`
/// - `POST /updateBrightness` Felder `minBrightnessSlider`, `maxBrightnessSlider`
/// - `POST /setTZ` Feld `timezone` (IANA-Name)
///
/// Gültige Formulare werden als `ConfigCommand` an die Render Loop
/// geschickt (200), ungültige mit 400 abgelehnt.
///
/// **Task Pool:** `HTTP_TASKS_PER_STACK` Instanzen pro Interface
/// (Station und Access Point).
#[embassy_executor::task(pool_size = 4)]
pub async fn http_server_task(
    task_id: usize,
    interface: &'static str,
    stack: Stack<'static>,
    config_sender: ConfigSender,
    status: &'static StatusCell,
) {
    info!(
        "HTTP: Server task {} starting on {} port {}...",
        task_id, interface, HTTP_PORT
    );

    let app = picoserve::Router::new()
        .route("/", get(serve_html))
        .route("/status", get(move || serve_status(status)))
        .route(
            "/updateWiFi",
            post(move |Form(form): Form<WifiForm>| {
                submit(config_sender, "updateWiFi", form.to_command())
            }),
        )
        .route(
            "/updateBrightness",
            post(move |Form(form): Form<BrightnessForm>| {
                submit(config_sender, "updateBrightness", form.to_command())
            }),
        )
        .route(
            "/setTZ",
            post(move |Form(form): Form<TimezoneForm>| {
                submit(config_sender, "setTZ", form.to_command())
            }),
        );

    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Serviert die HTML-Hauptseite
async fn serve_html() -> impl IntoResponse {
    Response::new(StatusCode::OK, INDEX_HTML)
        .with_header("Content-Type", "text/html; charset=utf-8")
}

/// Serviert den letzten Status-Snapshot der Render Loop
async fn serve_status(status: &'static StatusCell) -> impl IntoResponse {
    let message = StatusMessage::from(status.lock(|cell| cell.get()));

    let mut buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
    let json = serde_json_core::to_slice(&message, &mut buffer)
        .ok()
        .and_then(|n| core::str::from_utf8(&buffer[..n]).ok())
        .map(String::from);

    let (code, body) = match json {
        Some(body) => (StatusCode::OK, body),
        None => (StatusCode::new(500), String::from("{}")),
    };
    Response::new(code, body).with_header("Content-Type", "application/json")
}

/// Reicht ein validiertes Kommando an die Render Loop weiter
async fn submit(
    config_sender: ConfigSender,
    route: &'static str,
    command: Result<ConfigCommand, FormError>,
) -> impl IntoResponse {
    let (code, body) = match command {
        Ok(command) => {
            info!("HTTP: {} accepted: {}", route, command);
            config_sender.send(command).await;
            (StatusCode::OK, "OK")
        }
        Err(e) => {
            warn!("HTTP: {} rejected: {}", route, e);
            (StatusCode::new(400), form_error_text(e))
        }
    };
    Response::new(code, body)
}
