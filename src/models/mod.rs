pub mod alert;
pub mod market;
pub mod watch;
pub mod notification;
pub mod calculation;

pub use alert::{AlertRule, PriceType};
pub use market::{MarketSnapshot, PriceRow};
pub use watch::WatchEntry;
pub use notification::{NotificationRecord, NotificationType};
pub use calculation::{CalculationRecord, CalculationResult, CostSummary, FormFields};
