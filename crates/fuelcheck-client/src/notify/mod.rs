pub mod deliver;
pub mod route;
pub mod template;

pub use deliver::{DeliveryReport, Notifier, OutboxNotifier, deliver_all};
pub use route::{NotificationPayload, RoutingPlan, UnreachableVehicle, route};
pub use template::{MessageTemplate, RenderedMessage, load_template, save_template};
