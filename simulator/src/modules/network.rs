/// ----- NETWORK MODULE -----
/// Text commands arrive as UDP datagrams on the command port. The last
/// sender becomes the bound client: rejections are answered to it and every
/// event is sent to it. Snapshots are broadcast as JSON on the telemetry
/// port.

use std::net::{SocketAddr, UdpSocket};
use std::process;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver};
use log::{debug, error, info, warn};
use network_rust::udpnet;
use network_rust::udpnet::text::Datagram;
use parking_lot::Mutex;

use shared_resources::config::NetworkConfig;
use shared_resources::elevator_message::{CarSnapshot, Event};

use crate::modules::port::Port;

type Client = Arc<Mutex<Option<SocketAddr>>>;

pub fn init(
    network_config: &NetworkConfig,
    port: Port,
    event_rx: Receiver<Event>,
    snapshot_rx: Receiver<Vec<CarSnapshot>>,
) -> std::io::Result<()> {
    let socket = udpnet::text::bind(network_config.command_port, true)?;
    info!("Listening for commands on {}", socket.local_addr()?);
    let client: Client = Arc::new(Mutex::new(None));

    // INITIALIZE THREAD FOR INCOMING DATAGRAMS
    let (datagram_tx, datagram_rx) = unbounded::<Datagram>();
    {
        let socket = socket.try_clone()?;
        thread::Builder::new().name("command_udp_receiver".to_string()).spawn(move || {
            if let Err(e) = udpnet::text::rx(&socket, datagram_tx) {
                error!("Command receiver stopped: {}", e);
                process::exit(1);
            }
        })?;
    }

    // INITIALIZE THREAD FOR COMMAND HANDLING
    {
        let socket = socket.try_clone()?;
        let client = client.clone();
        thread::Builder::new()
            .name("command_port".to_string())
            .spawn(move || handle_commands(&socket, &port, &client, datagram_rx))?;
    }

    // INITIALIZE THREAD FOR OUTGOING EVENTS
    {
        let client = client.clone();
        thread::Builder::new()
            .name("event_sender".to_string())
            .spawn(move || send_events(&socket, &client, event_rx))?;
    }

    // INITIALIZE THREAD FOR TELEMETRY
    if network_config.telemetry {
        let telemetry_port = network_config.telemetry_port;
        thread::Builder::new().name("telemetry_udp_sender".to_string()).spawn(move || {
            if let Err(e) = udpnet::bcast::tx(telemetry_port, snapshot_rx, true) {
                warn!("Telemetry on port {} unavailable: {}", telemetry_port, e);
            }
        })?;
    }

    Ok(())
}

fn handle_commands(socket: &UdpSocket, port: &Port, client: &Client, datagram_rx: Receiver<Datagram>) {
    for datagram in datagram_rx.iter() {
        {
            let mut bound = client.lock();
            if *bound != Some(datagram.from) {
                info!("Client {} bound", datagram.from);
                *bound = Some(datagram.from);
            }
        }
        if let Some(reply) = port.submit_for_reply(&datagram.text) {
            warn!("Rejected {:?} from {}: {}", datagram.text, datagram.from, reply);
            if let Err(e) = udpnet::text::send(socket, datagram.from, &reply) {
                warn!("Unable to reply to {}: {}", datagram.from, e);
            }
        }
    }
}

fn send_events(socket: &UdpSocket, client: &Client, event_rx: Receiver<Event>) {
    for event in event_rx.iter() {
        let bound = *client.lock();
        match bound {
            Some(addr) => {
                if let Err(e) = udpnet::text::send(socket, addr, &event.to_string()) {
                    warn!("Unable to send {} to {}: {}", event, addr, e);
                }
            }
            None => debug!("No client bound, dropping {}", event),
        }
    }
}
