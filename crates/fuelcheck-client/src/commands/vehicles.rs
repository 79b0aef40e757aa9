use std::path::Path;

use crate::access::Permission;
use crate::anomalies::ThresholdPolicy;
use crate::commands::common::{authorize, load_setup};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{VehicleListData, VehicleRemoveData, VehicleSetData};
use crate::ledger::VehicleThreshold;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct VehiclesListOptions<'a> {
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Default)]
pub struct VehiclesSetOptions<'a> {
    pub vehicle_id: String,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub min_efficiency: Option<f64>,
    pub max_efficiency: Option<f64>,
    pub notes: Option<String>,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct VehiclesRemoveOptions<'a> {
    pub vehicle_id: String,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(VehiclesListOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: VehiclesListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Read)?;

    let table = setup.engine().thresholds()?;
    let defaults = ThresholdPolicy::new(&table, &setup.settings).defaults();
    success(
        "vehicles list",
        VehicleListData {
            defaults,
            vehicles: table.iter().cloned().collect(),
        },
    )
}

pub fn set(options: VehiclesSetOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let vehicle_id = options.vehicle_id.trim().to_string();
    if vehicle_id.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "A vehicle id is required.",
            Some("vehicles set"),
        ));
    }
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::ManageVehicles)?;

    let mut engine = setup.engine();
    let mut vehicle = engine
        .thresholds()?
        .get(&vehicle_id)
        .cloned()
        .unwrap_or_else(|| VehicleThreshold::new(&vehicle_id));
    if let Some(owner_name) = options.owner_name {
        vehicle.owner_name = owner_name.trim().to_string();
    }
    if let Some(owner_email) = options.owner_email {
        vehicle.owner_email = owner_email.trim().to_string();
    }
    if options.min_efficiency.is_some() {
        vehicle.min_efficiency = options.min_efficiency;
    }
    if options.max_efficiency.is_some() {
        vehicle.max_efficiency = options.max_efficiency;
    }
    if let Some(notes) = options.notes {
        vehicle.notes = notes;
    }

    let created = engine.set_threshold(vehicle.clone())?;
    success("vehicles set", VehicleSetData { created, vehicle })
}

pub fn remove(options: VehiclesRemoveOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::ManageVehicles)?;

    let vehicle_id = options.vehicle_id.trim().to_string();
    let removed = setup.engine().remove_threshold(&vehicle_id)?;
    success(
        "vehicles remove",
        VehicleRemoveData {
            vehicle_id,
            removed,
        },
    )
}
