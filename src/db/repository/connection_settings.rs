use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::{Parity, SocketRole, TransportKind};
use crate::models::{ConnectionSettings, SerialSettings, TcpSettings, Transport};

// Internal row type for ConnectionSettings mapping
struct SettingsRow {
    analyzer_id: i64,
    connection_type: String,
    socket_type: Option<String>,
    analyzer_address: Option<String>,
    analyzer_port: Option<u16>,
    lis_address: Option<String>,
    lis_port: Option<u16>,
    serial_port: Option<String>,
    baud_rate: Option<u32>,
    data_bits: Option<u8>,
    stop_bits: Option<u8>,
    parity: Option<String>,
    auto_result_sending: bool,
    request_sample_info: bool,
    sample_id_delay: u32,
    result_sending_delay: u32,
}

fn settings_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<SettingsRow, rusqlite::Error> {
    Ok(SettingsRow {
        analyzer_id: row.get(0)?,
        connection_type: row.get(1)?,
        socket_type: row.get(2)?,
        analyzer_address: row.get(3)?,
        analyzer_port: row.get(4)?,
        lis_address: row.get(5)?,
        lis_port: row.get(6)?,
        serial_port: row.get(7)?,
        baud_rate: row.get(8)?,
        data_bits: row.get(9)?,
        stop_bits: row.get(10)?,
        parity: row.get(11)?,
        auto_result_sending: row.get(12)?,
        request_sample_info: row.get(13)?,
        sample_id_delay: row.get(14)?,
        result_sending_delay: row.get(15)?,
    })
}

/// Missing columns of the active transport fall back to the form defaults.
fn settings_from_row(row: SettingsRow) -> Result<ConnectionSettings, DatabaseError> {
    let transport = match TransportKind::from_str(&row.connection_type)? {
        TransportKind::Tcp => {
            let defaults = TcpSettings::default();
            let role = match row.socket_type.as_deref() {
                Some(s) => SocketRole::from_str(s)?,
                None => defaults.role,
            };
            Transport::Tcp(TcpSettings {
                role,
                analyzer_address: row.analyzer_address.unwrap_or(defaults.analyzer_address),
                analyzer_port: row.analyzer_port.unwrap_or(defaults.analyzer_port),
                lis_address: row.lis_address.unwrap_or(defaults.lis_address),
                lis_port: row.lis_port.unwrap_or(defaults.lis_port),
            })
        }
        TransportKind::Serial => {
            let defaults = SerialSettings::default();
            let parity = match row.parity.as_deref() {
                Some(s) => Parity::from_str(s)?,
                None => defaults.parity,
            };
            Transport::Serial(SerialSettings {
                port: row.serial_port.unwrap_or(defaults.port),
                baud_rate: row.baud_rate.unwrap_or(defaults.baud_rate),
                data_bits: row.data_bits.unwrap_or(defaults.data_bits),
                stop_bits: row.stop_bits.unwrap_or(defaults.stop_bits),
                parity,
            })
        }
    };

    Ok(ConnectionSettings {
        analyzer_id: row.analyzer_id,
        transport,
        auto_send: row.auto_result_sending,
        request_sample_info: row.request_sample_info,
        sample_delay_ms: row.sample_id_delay,
        result_delay_ms: row.result_sending_delay,
    })
}

pub fn get_connection_settings(
    conn: &Connection,
    analyzer_id: i64,
) -> Result<Option<ConnectionSettings>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT analyzer_id, connection_type, socket_type, analyzer_address, analyzer_port,
                    lis_address, lis_port, serial_port, baud_rate, data_bits, stop_bits, parity,
                    auto_result_sending, request_sample_info, sample_id_delay, result_sending_delay
             FROM connection_settings WHERE analyzer_id = ?1",
            params![analyzer_id],
            settings_row_from_rusqlite,
        )
        .optional()?;

    row.map(settings_from_row).transpose()
}

/// Insert or replace the single settings row of an analyzer. Columns of the
/// inactive transport are written as NULL.
pub fn upsert_connection_settings(
    conn: &Connection,
    settings: &ConnectionSettings,
) -> Result<(), DatabaseError> {
    let (tcp, serial) = match &settings.transport {
        Transport::Tcp(tcp) => (Some(tcp), None),
        Transport::Serial(serial) => (None, Some(serial)),
    };

    conn.execute(
        "INSERT INTO connection_settings
         (analyzer_id, connection_type, socket_type, analyzer_address, analyzer_port,
          lis_address, lis_port, serial_port, baud_rate, data_bits, stop_bits, parity,
          auto_result_sending, request_sample_info, sample_id_delay, result_sending_delay)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT (analyzer_id) DO UPDATE SET
            connection_type = excluded.connection_type,
            socket_type = excluded.socket_type,
            analyzer_address = excluded.analyzer_address,
            analyzer_port = excluded.analyzer_port,
            lis_address = excluded.lis_address,
            lis_port = excluded.lis_port,
            serial_port = excluded.serial_port,
            baud_rate = excluded.baud_rate,
            data_bits = excluded.data_bits,
            stop_bits = excluded.stop_bits,
            parity = excluded.parity,
            auto_result_sending = excluded.auto_result_sending,
            request_sample_info = excluded.request_sample_info,
            sample_id_delay = excluded.sample_id_delay,
            result_sending_delay = excluded.result_sending_delay",
        params![
            settings.analyzer_id,
            settings.transport.kind().as_str(),
            tcp.map(|t| t.role.as_str()),
            tcp.map(|t| t.analyzer_address.as_str()),
            tcp.map(|t| t.analyzer_port),
            tcp.map(|t| t.lis_address.as_str()),
            tcp.map(|t| t.lis_port),
            serial.map(|s| s.port.as_str()),
            serial.map(|s| s.baud_rate),
            serial.map(|s| s.data_bits),
            serial.map(|s| s.stop_bits),
            serial.map(|s| s.parity.as_str()),
            settings.auto_send,
            settings.request_sample_info,
            settings.sample_delay_ms,
            settings.result_delay_ms,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}
