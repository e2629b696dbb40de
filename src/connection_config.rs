//! Connection settings per analyzer: form validation, persistence, and the
//! field-availability rules the settings view follows.

use std::fmt::Display;
use std::str::FromStr;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::enums::{Parity, SocketRole, TransportKind};
use crate::models::{
    Analyzer, ConnectionSettings, ConnectionSettingsInput, SerialSettings, TcpSettings, Transport,
};
use crate::registry;

/// Which settings fields the view should enable for a transport and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAvailability {
    pub tcp_visible: bool,
    pub serial_visible: bool,
    pub analyzer_address: bool,
    pub analyzer_port: bool,
    pub lis_address: bool,
    pub lis_port: bool,
}

pub fn field_availability(transport: &Transport) -> FieldAvailability {
    match transport {
        Transport::Tcp(tcp) => {
            let server = tcp.role == SocketRole::Server;
            FieldAvailability {
                tcp_visible: true,
                serial_visible: false,
                analyzer_address: true,
                analyzer_port: server,
                lis_address: true,
                lis_port: !server,
            }
        }
        Transport::Serial(_) => FieldAvailability {
            tcp_visible: false,
            serial_visible: true,
            analyzer_address: false,
            analyzer_port: false,
            lis_address: false,
            lis_port: false,
        },
    }
}

// ═══════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════

/// Turn the raw settings form into typed settings.
pub fn validate(
    analyzer_id: i64,
    input: &ConnectionSettingsInput,
) -> Result<ConnectionSettings, CoreError> {
    let transport = match parse_transport_kind(&input.transport)? {
        TransportKind::Tcp => Transport::Tcp(TcpSettings {
            role: parse_role(input.role.as_deref())?,
            analyzer_address: required_text("Analyzer address", &input.analyzer_address)?,
            analyzer_port: parse_port("Analyzer port", &input.analyzer_port)?,
            lis_address: required_text("LIS address", &input.lis_address)?,
            lis_port: parse_port("LIS port", &input.lis_port)?,
        }),
        TransportKind::Serial => Transport::Serial(SerialSettings {
            port: required_text("Serial port", &input.serial_port)?,
            baud_rate: parse_bounded("Baud rate", &input.baud_rate, 1, u32::MAX)?,
            data_bits: parse_bounded("Data bits", &input.data_bits, 5, 8)?,
            stop_bits: parse_bounded("Stop bits", &input.stop_bits, 1, 2)?,
            parity: parse_parity(&input.parity)?,
        }),
    };

    Ok(ConnectionSettings {
        analyzer_id,
        transport,
        auto_send: input.auto_send,
        request_sample_info: input.request_sample_info,
        sample_delay_ms: parse_delay("Sample ID delay", &input.sample_delay_ms)?,
        result_delay_ms: parse_delay("Result sending delay", &input.result_delay_ms)?,
    })
}

fn parse_transport_kind(raw: &str) -> Result<TransportKind, CoreError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("tcp/ip") || raw.eq_ignore_ascii_case("tcp") {
        Ok(TransportKind::Tcp)
    } else if raw.eq_ignore_ascii_case("serial") {
        Ok(TransportKind::Serial)
    } else {
        Err(CoreError::validation(format!(
            "Connection type must be TCP/IP or Serial, got '{raw}'"
        )))
    }
}

fn parse_role(raw: Option<&str>) -> Result<SocketRole, CoreError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(CoreError::validation(
            "TCP/IP connections require a socket role (Server or Client)",
        ));
    }
    if raw.eq_ignore_ascii_case("server") {
        Ok(SocketRole::Server)
    } else if raw.eq_ignore_ascii_case("client") {
        Ok(SocketRole::Client)
    } else {
        Err(CoreError::validation(format!(
            "Socket role must be Server or Client, got '{raw}'"
        )))
    }
}

fn parse_parity(raw: &str) -> Result<Parity, CoreError> {
    Parity::from_str(raw.trim()).map_err(|_| {
        let options: Vec<&str> = Parity::ALL.iter().map(|p| p.as_str()).collect();
        CoreError::validation(format!(
            "Parity must be one of {}, got '{}'",
            options.join(", "),
            raw.trim()
        ))
    })
}

fn required_text(field: &str, raw: &str) -> Result<String, CoreError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn parse_port(field: &str, raw: &str) -> Result<u16, CoreError> {
    parse_bounded(field, raw, 1, u16::MAX)
}

fn parse_bounded<T>(field: &str, raw: &str, min: T, max: T) -> Result<T, CoreError>
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let value: T = raw.trim().parse().map_err(|_| {
        CoreError::validation(format!(
            "{field} must be a whole number, got '{}'",
            raw.trim()
        ))
    })?;
    if value < min || value > max {
        return Err(CoreError::validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(value)
}

/// Delays in milliseconds; an empty field means no delay.
fn parse_delay(field: &str, raw: &str) -> Result<u32, CoreError> {
    if raw.trim().is_empty() {
        return Ok(0);
    }
    parse_bounded(field, raw, 0, u32::MAX)
}

// ═══════════════════════════════════════════════════════════
// Persistence
// ═══════════════════════════════════════════════════════════

pub fn get(conn: &Connection, analyzer_id: i64) -> Result<Option<ConnectionSettings>, CoreError> {
    Ok(repository::get_connection_settings(conn, analyzer_id)?)
}

/// Stored settings, or the form defaults for an analyzer never saved.
pub fn effective(conn: &Connection, analyzer_id: i64) -> Result<ConnectionSettings, CoreError> {
    Ok(get(conn, analyzer_id)?.unwrap_or_else(|| ConnectionSettings::defaults_for(analyzer_id)))
}

pub fn save(
    conn: &Connection,
    analyzer_id: i64,
    input: &ConnectionSettingsInput,
) -> Result<ConnectionSettings, CoreError> {
    let analyzer = registry::get_analyzer(conn, analyzer_id)?;
    let settings = validate(analyzer_id, input)?;
    repository::upsert_connection_settings(conn, &settings)?;

    tracing::info!(
        analyzer = %analyzer.name,
        transport = %settings.transport.kind(),
        auto_send = settings.auto_send,
        "Connection settings saved"
    );
    Ok(settings)
}

// ═══════════════════════════════════════════════════════════
// LIS link (simulated)
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatus {
    pub analyzer: String,
    pub transport: TransportKind,
    pub role: Option<SocketRole>,
    /// Address, port or serial line the link would use.
    pub endpoint: String,
    pub connected: bool,
}

fn describe_endpoint(transport: &Transport) -> String {
    match transport {
        // A server listens on its own endpoint; a client dials the LIS.
        Transport::Tcp(tcp) => match tcp.role {
            SocketRole::Server => format!("{}:{}", tcp.analyzer_address, tcp.analyzer_port),
            SocketRole::Client => format!("{}:{}", tcp.lis_address, tcp.lis_port),
        },
        Transport::Serial(serial) => {
            let parity = serial.parity.as_str().chars().next().unwrap_or('N');
            format!(
                "{} {} {}{}{}",
                serial.port, serial.baud_rate, serial.data_bits, parity, serial.stop_bits
            )
        }
    }
}

/// Pretend to open the LIS link. No socket or serial port is touched.
pub fn connect_to_lis(conn: &Connection, analyzer: &Analyzer) -> Result<LinkStatus, CoreError> {
    let settings = effective(conn, analyzer.id)?;
    let endpoint = describe_endpoint(&settings.transport);

    tracing::info!(analyzer = %analyzer.name, %endpoint, "Connecting to LIS...");
    tracing::info!(analyzer = %analyzer.name, "Connected");

    Ok(LinkStatus {
        analyzer: analyzer.name.clone(),
        transport: settings.transport.kind(),
        role: settings.transport.role(),
        endpoint,
        connected: true,
    })
}
