use std::path::Path;

use crate::ClientResult;
use crate::access::Permission;
use crate::commands::common::{authorize, load_setup, local_now};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{NotifyPreviewData, NotifySendData};
use crate::notify::{OutboxNotifier, RenderedMessage, RoutingPlan, deliver_all, load_template};
use crate::setup::SetupContext;

#[derive(Debug, Default)]
pub struct NotifyOptions<'a> {
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn preview() -> ClientResult<SuccessEnvelope> {
    preview_with_options(NotifyOptions::default())
}

#[doc(hidden)]
pub fn preview_with_options(options: NotifyOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Read)?;

    let (plan, messages) = plan_messages(&setup)?;
    success("notify preview", NotifyPreviewData { plan, messages })
}

pub fn send() -> ClientResult<SuccessEnvelope> {
    send_with_options(NotifyOptions::default())
}

#[doc(hidden)]
pub fn send_with_options(options: NotifyOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::SendNotifications)?;

    let (plan, messages) = plan_messages(&setup)?;
    let mut notifier = OutboxNotifier::new(&setup.outbox_dir());
    let reports = deliver_all(&mut notifier, &messages);
    let delivered = reports.iter().filter(|report| report.delivered).count();

    success(
        "notify send",
        NotifySendData {
            outbox: notifier.directory().display().to_string(),
            delivered,
            failed: reports.len() - delivered,
            reports,
            unreachable: plan.unreachable,
        },
    )
}

fn plan_messages(setup: &SetupContext) -> ClientResult<(RoutingPlan, Vec<RenderedMessage>)> {
    let plan = setup.engine().routing_plan(local_now().date())?;
    let template = load_template(&setup.home)?;
    let messages = plan
        .payloads()
        .map(|payload| template.render(payload))
        .collect();
    Ok((plan, messages))
}
