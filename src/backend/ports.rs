//! Serial port discovery and selection
//!
//! Enumeration is a read-only query of the host's device table and never
//! fails fatally: an enumeration error logs a warning and yields an empty
//! list, which the selection policy routes to "no device available".
//!
//! Selection policy:
//! - zero ports: no device, resolved immediately without blocking
//! - one port: auto-selected
//! - several ports: the operator must choose (the UI shows a picker)
//!
//! A configured port name short-circuits the policy when that port is
//! present in the discovery results.

use crate::types::PortDescriptor;

/// Outcome of applying the selection policy to discovered ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelection {
    /// Exactly one candidate, or a matching configured override
    Selected(PortDescriptor),
    /// Several candidates; the operator has to pick one
    NeedsOperator(Vec<PortDescriptor>),
    /// Nothing to acquire from
    None,
}

/// Enumerate available serial ports with human-friendly labels
pub fn discover() -> Vec<PortDescriptor> {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            tracing::warn!("serial port enumeration failed: {}", e);
            return Vec::new();
        }
    };

    let mut out: Vec<PortDescriptor> = ports.into_iter().map(describe_port).collect();
    out.sort_by(|a, b| a.label.cmp(&b.label));
    out
}

fn describe_port(info: serialport::SerialPortInfo) -> PortDescriptor {
    let label = match info.port_type {
        serialport::SerialPortType::UsbPort(usb) => {
            let mut parts = Vec::new();
            if let Some(manufacturer) = usb.manufacturer {
                parts.push(manufacturer);
            }
            if let Some(product) = usb.product {
                parts.push(product);
            }
            if parts.is_empty() {
                format!("{}: USB Serial", info.port_name)
            } else {
                format!("{}: {}", info.port_name, parts.join(" "))
            }
        }
        serialport::SerialPortType::BluetoothPort => format!("{}: Bluetooth", info.port_name),
        serialport::SerialPortType::PciPort => format!("{}: PCI", info.port_name),
        serialport::SerialPortType::Unknown => info.port_name.clone(),
    };

    PortDescriptor::with_label(info.port_name, label)
}

/// Apply the selection policy to discovered ports
///
/// `configured` is an optional port-name override from the config file; it
/// wins when it names a discovered port and is ignored (with a warning)
/// otherwise.
pub fn choose(ports: &[PortDescriptor], configured: Option<&str>) -> PortSelection {
    if let Some(name) = configured {
        if let Some(port) = ports.iter().find(|p| p.name.eq_ignore_ascii_case(name)) {
            return PortSelection::Selected(port.clone());
        }
        if !ports.is_empty() {
            tracing::warn!("configured port {} not found, falling back to discovery", name);
        }
    }

    match ports.len() {
        0 => PortSelection::None,
        1 => PortSelection::Selected(ports[0].clone()),
        _ => PortSelection::NeedsOperator(ports.to_vec()),
    }
}
