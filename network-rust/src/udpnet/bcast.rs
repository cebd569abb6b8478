use crossbeam_channel as cbc;
use log::{debug, warn};

use super::sock;

/// Serializes every value received on `ch` to JSON and sends it as one
/// datagram to `port`. Returns once every sender of `ch` is gone.
pub fn tx<T: serde::Serialize>(port: u16, ch: cbc::Receiver<T>, localhost: bool) -> std::io::Result<()> {
    let (s, addr) = sock::new_tx(port, localhost)?;
    for data in ch.iter() {
        let serialized = match serde_json::to_string(&data) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Unable to serialize packet, {}", e);
                continue;
            }
        };
        if let Err(e) = s.send_to(serialized.as_bytes(), &addr) {
            warn!("Unable to send packet, {}", e);
        }
    }
    debug!("Broadcast channel on port {} closed", port);
    Ok(())
}
