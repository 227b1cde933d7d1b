use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[default]
    System,
    Alert,
    Message,
    Promotion,
}

impl NotificationType {
    /// Lenient parse used for delivered payloads; unknown kinds fall back to `System`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "alert" => NotificationType::Alert,
            "message" => NotificationType::Message,
            "promotion" => NotificationType::Promotion,
            _ => NotificationType::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub body: String,

    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
    #[serde(default)]
    pub screen: Option<String>,

    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub notification_type: NotificationType,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn new(title: impl Into<String>, body: impl Into<String>, params: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            body: body.into(),
            image_url: None,
            button_text: None,
            button_link: None,
            screen: None,
            params,
            notification_type: NotificationType::System,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// `(commodity, priceType, targetValue)` when this record was raised by an alert rule.
    fn trigger(&self) -> Option<(&Value, &Value, &Value)> {
        let commodity = self.params.get("commodity").filter(|v| !v.is_null())?;
        let price_type = self.params.get("priceType").filter(|v| !v.is_null())?;
        let target = self.params.get("targetValue").filter(|v| !v.is_null())?;
        Some((commodity, price_type, target))
    }

    pub fn is_rule_triggered(&self) -> bool {
        self.trigger().is_some()
    }

    /// True when both records carry the same rule trigger triple.
    pub fn same_trigger(&self, other: &NotificationRecord) -> bool {
        match (self.trigger(), other.trigger()) {
            (Some((c1, p1, t1)), Some((c2, p2, t2))) => {
                param_eq(c1, c2) && param_eq(p1, p2) && param_eq(t1, t2)
            }
            _ => false,
        }
    }
}

fn param_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn param_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// 100, 100.0 and "100" are the same target.
fn param_eq(a: &Value, b: &Value) -> bool {
    match (param_number(a), param_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => param_text(a) == param_text(b),
    }
}
