use std::path::Path;

use crate::ClientResult;
use crate::access::Permission;
use crate::commands::common::{authorize, load_setup, parse_optional_date_arg};
use crate::consumption::StatsFilter;
use crate::contracts::envelope::{SuccessEnvelope, success};

#[derive(Debug, Default)]
pub struct StatsRunOptions<'a> {
    pub vehicle_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(
    vehicle_id: Option<String>,
    from: Option<&str>,
    to: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    run_with_options(StatsRunOptions {
        vehicle_id,
        from: from.map(std::string::ToString::to_string),
        to: to.map(std::string::ToString::to_string),
        ..StatsRunOptions::default()
    })
}

#[doc(hidden)]
pub fn run_with_options(options: StatsRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let filter = StatsFilter {
        vehicle_id: options.vehicle_id,
        from: parse_optional_date_arg(options.from.as_deref(), "from", "stats")?,
        to: parse_optional_date_arg(options.to.as_deref(), "to", "stats")?,
    };
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Read)?;

    let data = setup.engine().statistics(&filter)?;
    success("stats", data)
}
