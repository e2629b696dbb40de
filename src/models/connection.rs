use serde::{Deserialize, Serialize};

use super::enums::{Parity, SocketRole, TransportKind};

pub const DEFAULT_ANALYZER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_ANALYZER_PORT: u16 = 12000;
pub const DEFAULT_LIS_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_LIS_PORT: u16 = 13000;
pub const DEFAULT_SERIAL_PORT: &str = "COM1";
pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_DATA_BITS: u8 = 8;
pub const DEFAULT_STOP_BITS: u8 = 1;

/// Serial ports offered by the settings form.
pub const SERIAL_PORTS: &[&str] = &["COM1", "COM2", "COM3"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpSettings {
    pub role: SocketRole,
    pub analyzer_address: String,
    pub analyzer_port: u16,
    pub lis_address: String,
    pub lis_port: u16,
}

impl Default for TcpSettings {
    fn default() -> Self {
        Self {
            role: SocketRole::Server,
            analyzer_address: DEFAULT_ANALYZER_ADDRESS.into(),
            analyzer_port: DEFAULT_ANALYZER_PORT,
            lis_address: DEFAULT_LIS_ADDRESS.into(),
            lis_port: DEFAULT_LIS_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: Parity,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            stop_bits: DEFAULT_STOP_BITS,
            parity: Parity::No,
        }
    }
}

/// Exactly one transport is active per analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transport {
    Tcp(TcpSettings),
    Serial(SerialSettings),
}

impl Transport {
    pub fn kind(&self) -> TransportKind {
        match self {
            Transport::Tcp(_) => TransportKind::Tcp,
            Transport::Serial(_) => TransportKind::Serial,
        }
    }

    /// Socket role; serial links have none.
    pub fn role(&self) -> Option<SocketRole> {
        match self {
            Transport::Tcp(tcp) => Some(tcp.role),
            Transport::Serial(_) => None,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Tcp(TcpSettings::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub analyzer_id: i64,
    pub transport: Transport,
    /// Mark results sent as soon as a run produces them.
    pub auto_send: bool,
    pub request_sample_info: bool,
    pub sample_delay_ms: u32,
    pub result_delay_ms: u32,
}

impl ConnectionSettings {
    /// Settings shown for an analyzer that has never been saved.
    pub fn defaults_for(analyzer_id: i64) -> Self {
        Self {
            analyzer_id,
            transport: Transport::default(),
            auto_send: false,
            request_sample_info: false,
            sample_delay_ms: 0,
            result_delay_ms: 0,
        }
    }
}

/// Settings form as submitted: every field is raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettingsInput {
    pub transport: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub analyzer_address: String,
    #[serde(default)]
    pub analyzer_port: String,
    #[serde(default)]
    pub lis_address: String,
    #[serde(default)]
    pub lis_port: String,
    #[serde(default)]
    pub serial_port: String,
    #[serde(default)]
    pub baud_rate: String,
    #[serde(default)]
    pub data_bits: String,
    #[serde(default)]
    pub stop_bits: String,
    #[serde(default)]
    pub parity: String,
    #[serde(default)]
    pub auto_send: bool,
    #[serde(default)]
    pub request_sample_info: bool,
    #[serde(default)]
    pub sample_delay_ms: String,
    #[serde(default)]
    pub result_delay_ms: String,
}

impl Default for ConnectionSettingsInput {
    /// The form as first displayed: TCP server with the stock endpoints.
    fn default() -> Self {
        let tcp = TcpSettings::default();
        let serial = SerialSettings::default();
        Self {
            transport: TransportKind::Tcp.as_str().into(),
            role: Some(tcp.role.as_str().into()),
            analyzer_address: tcp.analyzer_address,
            analyzer_port: tcp.analyzer_port.to_string(),
            lis_address: tcp.lis_address,
            lis_port: tcp.lis_port.to_string(),
            serial_port: serial.port,
            baud_rate: serial.baud_rate.to_string(),
            data_bits: serial.data_bits.to_string(),
            stop_bits: serial.stop_bits.to_string(),
            parity: serial.parity.as_str().into(),
            auto_send: false,
            request_sample_info: false,
            sample_delay_ms: "0".into(),
            result_delay_ms: "0".into(),
        }
    }
}
