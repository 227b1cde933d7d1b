use handlebars::{Handlebars, TemplateError};
use serde_json::Value;
use std::sync::Arc;

use super::preferences::Language;

pub type Messages = Arc<Handlebars<'static>>;

const EN: &[(&str, &str)] = &[
    ("alert_title", "Alert"),
    ("alert_body", "Your alert for {{commodity}} at {{lastPrice}} has been triggered!"),
    ("feed_timeout", "Request timed out. Please try again."),
    (
        "feed_unavailable",
        "Unable to load market data. Please check your connection or try again later.",
    ),
];

const AF: &[(&str, &str)] = &[
    ("alert_title", "Waarskuwing"),
    ("alert_body", "Jou waarskuwing vir {{commodity}} teen {{lastPrice}} is geaktiveer!"),
    ("feed_timeout", "Versoek het te lank geneem. Probeer asseblief weer."),
    (
        "feed_unavailable",
        "Kon nie markdata laai nie. Kontroleer jou verbinding of probeer weer later.",
    ),
];

pub fn build_messages() -> Result<Messages, TemplateError> {
    let mut hb = Handlebars::new();
    // notification text is plain text, never HTML
    hb.register_escape_fn(handlebars::no_escape);

    for (lang, table) in [(Language::En, EN), (Language::Af, AF)] {
        for (key, tpl) in table {
            hb.register_template_string(&format!("{}/{}", lang.code(), key), *tpl)?;
        }
    }

    Ok(Arc::new(hb))
}

/// Renders `key` in `lang`, falling back to English and then to the key itself.
pub fn render(hb: &Handlebars<'static>, lang: Language, key: &str, ctx: &Value) -> String {
    for code in [lang.code(), Language::En.code()] {
        let name = format!("{code}/{key}");
        if !hb.has_template(&name) {
            continue;
        }
        match hb.render(&name, ctx) {
            Ok(s) => return s,
            Err(e) => tracing::warn!("message {} failed to render: {}", name, e),
        }
    }
    key.to_string()
}
