//! Pinwire - Remote GPIO Firmware
//!
//! Joins a Wi-Fi network and serves a tiny HTTP-like protocol on one TCP
//! port. Clients configure, drive and read sixteen digital pins, talk to a
//! serial passthrough and read an in-band debug log. Pin configuration
//! survives power cycles in a few bytes of flash.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_net::tcp::TcpSocket;
use embassy_time::{Duration, Timer};
use esp_hal::timer::timg::TimerGroup;
use pinwire_core::config::{parse_config, DeviceConfig};
use pinwire_core::net::KnownNetwork;
use heapless::Vec;
use pinwire_core::pins::{BootOutcome, PinIndex, PIN_COUNT};
use pinwire_core::server::{serve_connection, ServeError, ServeOutcome};
use pinwire_core::{Device, PinManager, PinStore};
use pinwire_hal::uart::UartConfig;
use pinwire_hal_esp32::nvm::DEFAULT_OFFSET;
use pinwire_hal_esp32::{FlashEeprom, TcpTransport};
use {esp_backtrace as _, esp_println as _};

use crate::board::Board;
use crate::log::EchoLog;

mod board;
mod log;
mod wifi;

esp_bootloader_esp_idf::esp_app_desc!();

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const DEVICE_CONFIG: &str = include_str!("../device.toml");

/// Build-time network that outranks everything in device.toml
const WIFI_SSID: Option<&str> = option_env!("PINWIRE_WIFI_SSID");
const WIFI_PSK: Option<&str> = option_env!("PINWIRE_WIFI_PSK");

const RX_BUFFER_SIZE: usize = 1024;
const TX_BUFFER_SIZE: usize = 2048;

/// Socket-level inactivity limit, above the server's own client timeout
const SOCKET_TIMEOUT: Duration = Duration::from_secs(30);

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 64 * 1024);

    let board = Board::split(peripherals);
    let timg0 = TimerGroup::new(board.timg0);
    esp_rtos::start(timg0.timer0);

    info!("pinwire firmware starting...");

    let config = load_config();
    info!(
        "node \"{}\", port {}, persistence={}, {} known networks",
        config.node_name.as_str(),
        config.port,
        config.persistence,
        config.networks.len()
    );

    let serial_config = UartConfig {
        baudrate: config.serial_baudrate,
        ..UartConfig::default()
    };
    let serial = match board.serial.open(&serial_config) {
        Ok(serial) => serial,
        Err(e) => {
            error!("serial port rejected {} baud: {:?}", config.serial_baudrate, e);
            park().await
        }
    };

    let media = FlashEeprom::new(board.flash, DEFAULT_OFFSET);
    let store = PinStore::new(media, config.persistence);
    let mut pins = PinManager::new(board.gpio, store, config.pin_map());

    let locked: Vec<PinIndex, PIN_COUNT> = config.locked().collect();
    info!("{} pins locked by device.toml", locked.len());
    match pins.boot_with_locks(&locked) {
        BootOutcome::Fresh => info!("pin store blank, starting fresh"),
        BootOutcome::Restored(report) => info!(
            "restored {} pins ({} locked skipped, {} failed)",
            report.restored, report.skipped_locked, report.failed
        ),
        BootOutcome::StorageUnavailable(e) => {
            warn!("pin store unavailable ({:?}), persistence disabled", e)
        }
    }

    let log = EchoLog::new(config.debug);
    let mut device = Device::new(pins, serial, log, &config.node_name);

    let stack = match wifi::join(&spawner, board.wifi, &config.networks).await {
        Ok(stack) => stack,
        Err(e) => {
            error!("cannot join a network: {:?}; server not started", e);
            park().await
        }
    };

    let settings = config.server_settings();
    let mut led = board.led;
    let mut rx_buffer = [0u8; RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TX_BUFFER_SIZE];

    info!("listening on port {}", config.port);
    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        if let Err(e) = socket.accept(config.port).await {
            warn!("accept failed: {:?}", e);
            continue;
        }
        if let Some(remote) = socket.remote_endpoint() {
            info!("client {}", remote);
        }

        let mut transport = TcpTransport::new(&mut socket);
        match serve_connection(&mut transport, &mut led, &mut device, &settings).await {
            Ok(ServeOutcome::Responded(status)) => info!("responded {}", status.code()),
            Ok(ServeOutcome::TimedOut) => info!("client timed out"),
            Ok(ServeOutcome::Dropped) => info!("client sent nothing"),
            Err(ServeError::Transport(e)) => warn!("connection failed: {:?}", e),
            Err(ServeError::Encode(e)) => error!("response encode failed: {:?}", e),
        }

        socket.close();
        socket.abort();
    }
}

/// Parse the embedded configuration and add the build-time network
fn load_config() -> DeviceConfig {
    let mut config = match parse_config(DEVICE_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            // build.rs validates the file, so this only trips on parser drift
            error!("device.toml rejected ({:?}), using defaults", e);
            DeviceConfig::default()
        }
    };

    if let Some(ssid) = WIFI_SSID {
        match KnownNetwork::new(ssid, WIFI_PSK.unwrap_or(""), u8::MAX) {
            Some(network) => config.add_network(network),
            None => warn!("PINWIRE_WIFI_SSID/PSK too long, ignored"),
        }
    }
    config
}

/// Stop here for good without panicking
async fn park() -> ! {
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
