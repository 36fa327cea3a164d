use log::error;

use super::reading::Reading;
use super::traits::Device;
use crate::modbus::client::ModbusClientTrait;
use crate::registry::Profile;
use crate::services::accounting::ErrorCounters;

/// Read every parameter of `profile` once, in profile order.
///
/// A failed parameter yields a failed [`Reading`] and one read error; the
/// remaining parameters are still read. Nothing is retried.
pub async fn read_profile(
    device: &dyn Device,
    client: &dyn ModbusClientTrait,
    profile: &Profile,
    counters: &mut ErrorCounters,
) -> Vec<Reading> {
    let mut readings = Vec::with_capacity(profile.len());

    for (name, spec) in profile.iter() {
        match device.read_parameter(client, spec).await {
            Ok(value) => readings.push(Reading::valid(name, value, spec.decimals)),
            Err(e) => {
                error!("❌ Error reading {} from device {} ({}): {}", name, device.address(), device.name(), e);
                counters.record_read_error();
                readings.push(Reading::failed(name, e.to_string(), spec.decimals));
            }
        }
    }

    readings
}
