use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Stored in connection_settings.connection_type
str_enum!(TransportKind {
    Tcp => "TCP/IP",
    Serial => "Serial",
});

str_enum!(SocketRole {
    Server => "Server",
    Client => "Client",
});

str_enum!(Parity {
    Even => "Even",
    Odd => "Odd",
    No => "No",
    Space => "Space",
    Mark => "Mark",
});

str_enum!(TemplateType {
    SampleInfo => "sample_info",
    ResultSend => "result_send",
});

str_enum!(AbnormalFlag {
    Normal => "normal",
    Low => "low",
    High => "high",
});

// What happens to stored results when the tests they reference are
// removed from a catalog.
str_enum!(OrphanPolicy {
    Retain => "retain",
    Purge => "purge",
    Reject => "reject",
});

// Direction column of an ASTM template line.
str_enum!(MessageDirection {
    Send => "Send",
    Read => "Read",
});

// Control characters and record types offered by the template editor.
str_enum!(TemplateField {
    Enq => "ENQ",
    Ack => "ACK",
    Stx => "STX",
    Etx => "ETX",
    Eot => "EOT",
    Header => "H",
    Patient => "P",
    Order => "O",
    Query => "Q",
    Result => "R",
});

impl TemplateField {
    /// Control characters render as `<ENQ>`; record types carry text.
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            Self::Enq | Self::Ack | Self::Stx | Self::Etx | Self::Eot
        )
    }
}

impl Default for OrphanPolicy {
    fn default() -> Self {
        Self::Retain
    }
}

impl TemplateType {
    pub const ALL: [TemplateType; 2] = [TemplateType::SampleInfo, TemplateType::ResultSend];
}

impl Parity {
    pub const ALL: [Parity; 5] = [
        Parity::Even,
        Parity::Odd,
        Parity::No,
        Parity::Space,
        Parity::Mark,
    ];
}
