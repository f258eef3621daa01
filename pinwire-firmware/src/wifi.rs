//! Wi-Fi station join and network stack bring-up
//!
//! Scans once, picks the best visible known network and connects. If the
//! scan itself fails every known network is tried blind, best priority
//! first. There are no retries after that: a device that cannot join is
//! of no use and the caller parks.

use alloc::string::String;

use defmt::{info, warn, Format};
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, DhcpConfig, Stack, StackResources};
use embassy_time::{with_timeout, Duration};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::wifi::{self, ClientConfig, ModeConfig, ScanConfig, WifiController, WifiDevice};
use esp_radio::{init as radio_init, Controller as RadioController};
use heapless::Vec;
use pinwire_core::net::{by_priority, select_network, KnownNetwork, ScannedNetwork};
use static_cell::StaticCell;

/// Access points considered from one scan
const MAX_SCANNED: usize = 24;

/// How long DHCP may take after association
const DHCP_TIMEOUT: Duration = Duration::from_secs(30);

static RADIO: StaticCell<RadioController<'static>> = StaticCell::new();
static CONTROLLER: StaticCell<WifiController<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

/// Why the device could not get onto a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum JoinError {
    /// Radio or Wi-Fi driver failed to start
    Radio,
    /// No configured network at all
    NoNetworks,
    /// None of the known networks is visible
    NoKnownNetworkVisible,
    /// Every connection attempt failed
    Connect,
    /// Associated but no IPv4 configuration arrived
    Dhcp,
    /// The network runner task could not be spawned
    Spawn,
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Join a known network and return the configured IP stack
pub async fn join(
    spawner: &Spawner,
    wifi_peripheral: WIFI<'static>,
    networks: &[KnownNetwork],
) -> Result<Stack<'static>, JoinError> {
    if networks.is_empty() {
        return Err(JoinError::NoNetworks);
    }

    let radio = radio_init().map_err(|e| {
        warn!("radio init failed: {:?}", e);
        JoinError::Radio
    })?;
    let radio = RADIO.init(radio);

    let (controller, interfaces) =
        wifi::new(radio, wifi_peripheral, Default::default()).map_err(|e| {
            warn!("Wi-Fi driver init failed: {:?}", e);
            JoinError::Radio
        })?;
    let controller = CONTROLLER.init(controller);

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let resources = NET_RESOURCES.init(StackResources::new());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(DhcpConfig::default()),
        resources,
        seed,
    );
    spawner.spawn(net_task(runner)).map_err(|_| JoinError::Spawn)?;

    controller
        .set_config(&ModeConfig::Client(ClientConfig::default()))
        .map_err(|e| {
            warn!("Wi-Fi set_config failed: {:?}", e);
            JoinError::Radio
        })?;
    controller.start_async().await.map_err(|e| {
        warn!("Wi-Fi start failed: {:?}", e);
        JoinError::Radio
    })?;

    let mut joined = false;
    match controller.scan_with_config_async(ScanConfig::default()).await {
        Ok(found) => {
            let scanned: Vec<ScannedNetwork<'_>, MAX_SCANNED> = found
                .iter()
                .take(MAX_SCANNED)
                .map(|ap| ScannedNetwork {
                    ssid: ap.ssid.as_str(),
                    rssi: ap.signal_strength,
                })
                .collect();
            info!("scan found {} access points", found.len());

            let network = select_network(networks, &scanned).ok_or(JoinError::NoKnownNetworkVisible)?;
            joined = connect(controller, network).await;
        }
        Err(e) => {
            warn!("scan failed ({:?}), trying known networks blind", e);
            for network in by_priority(networks) {
                if connect(controller, network).await {
                    joined = true;
                    break;
                }
            }
        }
    }
    if !joined {
        return Err(JoinError::Connect);
    }

    with_timeout(DHCP_TIMEOUT, stack.wait_config_up())
        .await
        .map_err(|_| JoinError::Dhcp)?;
    if let Some(config) = stack.config_v4() {
        info!("network up: ip={}", config.address);
    }
    Ok(stack)
}

async fn connect(controller: &mut WifiController<'static>, network: &KnownNetwork) -> bool {
    info!("connecting to \"{}\" (priority {})", network.ssid.as_str(), network.priority);

    let config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(String::from(network.ssid.as_str()))
            .with_password(String::from(network.password.as_str())),
    );
    if let Err(e) = controller.set_config(&config) {
        warn!("Wi-Fi set_config failed: {:?}", e);
        return false;
    }

    match controller.connect_async().await {
        Ok(()) => true,
        Err(e) => {
            warn!("connect to \"{}\" failed: {:?}", network.ssid.as_str(), e);
            false
        }
    }
}
