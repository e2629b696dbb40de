//! Connection settings and the simulated LIS link.

use crate::connection_config::{self, FieldAvailability, LinkStatus};
use crate::core_state::{CoreError, CoreState};
use crate::models::{ConnectionSettings, ConnectionSettingsInput, Transport};

pub fn get_connection_settings(
    analyzer_id: i64,
    state: &CoreState,
) -> Result<Option<ConnectionSettings>, CoreError> {
    let conn = state.open_db()?;
    connection_config::get(&conn, analyzer_id)
}

pub fn save_connection_settings(
    analyzer_id: i64,
    input: ConnectionSettingsInput,
    state: &CoreState,
) -> Result<ConnectionSettings, CoreError> {
    let conn = state.open_db()?;
    connection_config::save(&conn, analyzer_id, &input)
}

/// Field states for the settings form while the user toggles transport or role.
pub fn get_field_availability(transport: Transport) -> FieldAvailability {
    connection_config::field_availability(&transport)
}

/// Simulated connect for the selected analyzer.
pub fn connect_to_lis(state: &CoreState) -> Result<LinkStatus, CoreError> {
    let analyzer = state.require_selected_analyzer()?;
    let conn = state.open_db()?;
    connection_config::connect_to_lis(&conn, &analyzer)
}
