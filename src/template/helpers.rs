// ABOUTME: Handlebars helper functions available in every mail rendering context
// ABOUTME: Implements snippet invocation, link and rule markup, and German date formatting

use chrono::{DateTime, Local, TimeZone, Utc};
use handlebars::{html_escape, Context, Handlebars, Helper, Output, RenderContext, RenderError};
use serde_json::Value as JsonValue;
use std::fmt::Display;
use std::sync::Arc;

use super::context::{Layer, Overlay};
use super::snippet::{SnippetHelper, SnippetRenderer};
use super::store::TemplateStore;

/// Names of all helper functions, in registration order
pub const HELPER_NAMES: &[&str] = &[
    "header",
    "footer",
    "monitoringFooter",
    "snippet",
    "link",
    "hr",
    "formatDateTime",
    "formatFromNow",
];

const HR_MARKUP: &str = "<hr style=\"border-top: 1px solid #333333; border-left: 0; border-right: 0; border-bottom: 0;\" />";

const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// The fixed helper set, built once at startup and installed into every registry
#[derive(Debug, Clone)]
pub struct HelperFunctions {
    snippets: SnippetRenderer,
}

impl HelperFunctions {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self {
            snippets: SnippetRenderer::new(store),
        }
    }

    pub fn snippet_renderer(&self) -> &SnippetRenderer {
        &self.snippets
    }

    /// Overlay exposing only the helper functions
    pub fn overlay(&self) -> Overlay {
        Overlay::functions(HELPER_NAMES)
    }

    /// Overlay exposing `values` with the helper functions on top
    pub fn overlay_with(&self, values: Arc<Layer>) -> Overlay {
        Overlay::with_values(values, HELPER_NAMES)
    }

    /// Register all helpers with a Handlebars instance
    pub fn register(&self, handlebars: &mut Handlebars) {
        let snippets = &self.snippets;

        handlebars.register_helper(
            "header",
            Box::new(SnippetHelper::bound(snippets.clone(), "header")),
        );
        handlebars.register_helper(
            "footer",
            Box::new(SnippetHelper::bound(snippets.clone(), "footer")),
        );
        handlebars.register_helper(
            "monitoringFooter",
            Box::new(SnippetHelper::bound(snippets.clone(), "monitoring-footer")),
        );
        handlebars.register_helper("snippet", Box::new(SnippetHelper::generic(snippets.clone())));

        handlebars.register_helper("link", Box::new(link_helper));
        handlebars.register_helper("hr", Box::new(hr_helper));
        handlebars.register_helper("formatDateTime", Box::new(format_date_time_helper));
        handlebars.register_helper("formatFromNow", Box::new(format_from_now_helper));
    }
}

/// Anchor markup for `href`; the visible text defaults to the href
pub fn render_link(href: &str, text: Option<&str>) -> String {
    let text = text.filter(|t| !t.is_empty()).unwrap_or(href);
    format!(
        "<a href=\"{}#\" style=\"color: #E5287A;\">{}</a>",
        html_escape(href),
        html_escape(text)
    )
}

pub fn render_hr() -> &'static str {
    HR_MARKUP
}

/// `DD.MM.YYYY HH:mm` for a Unix timestamp in the given time zone
pub fn format_date_time_in<Tz>(unix: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(unix, 0)
        .single()
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
}

/// `DD.MM.YYYY HH:mm` for a Unix timestamp in the process-local time zone
pub fn format_date_time(unix: i64) -> Option<String> {
    format_date_time_in(unix, &Local)
}

/// German relative time of `unix` as seen from `now`, e.g. "vor 3 Tagen".
///
/// Thresholds and rounding follow moment.js: up to 44 seconds is "ein paar Sekunden",
/// then minutes below 45, hours below 22, days below 26, months below 11, then years.
pub fn format_from_now_at(unix: i64, now: DateTime<Utc>) -> String {
    let diff_ms = unix as f64 * 1000.0 - now.timestamp_millis() as f64;
    let abs_ms = diff_ms.abs();

    let seconds = (abs_ms / 1_000.0).round();
    let minutes = (abs_ms / 60_000.0).round();
    let hours = (abs_ms / 3_600_000.0).round();
    let days_exact = abs_ms / 86_400_000.0;
    let days = days_exact.round();
    let months_exact = days_exact * 4800.0 / 146_097.0;
    let months = months_exact.round();
    let years = (months_exact / 12.0).round();

    let phrase = if seconds <= 44.0 {
        "ein paar Sekunden".to_string()
    } else if minutes <= 1.0 {
        "einer Minute".to_string()
    } else if minutes < 45.0 {
        format!("{} Minuten", minutes as i64)
    } else if hours <= 1.0 {
        "einer Stunde".to_string()
    } else if hours < 22.0 {
        format!("{} Stunden", hours as i64)
    } else if days <= 1.0 {
        "einem Tag".to_string()
    } else if days < 26.0 {
        format!("{} Tagen", days as i64)
    } else if months <= 1.0 {
        "einem Monat".to_string()
    } else if months < 11.0 {
        format!("{} Monaten", months as i64)
    } else if years <= 1.0 {
        "einem Jahr".to_string()
    } else {
        format!("{} Jahren", years as i64)
    };

    if diff_ms > 0.0 {
        format!("in {}", phrase)
    } else {
        format!("vor {}", phrase)
    }
}

pub fn format_from_now(unix: i64) -> String {
    format_from_now_at(unix, Utc::now())
}

/// Link helper - `{{link href}}` or `{{link href "text"}}`
pub fn link_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let href = h
        .param(0)
        .and_then(|v| scalar_to_string(v.value()))
        .ok_or_else(|| RenderError::new("link helper requires href parameter"))?;

    let text = h.param(1).and_then(|v| scalar_to_string(v.value()));

    out.write(&render_link(&href, text.as_deref()))?;
    Ok(())
}

/// Horizontal rule helper
pub fn hr_helper(
    _h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    out.write(render_hr())?;
    Ok(())
}

/// Date time helper - formats a Unix timestamp as German local date and time
pub fn format_date_time_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let unix = unix_param(h, "formatDateTime")?;
    let formatted = format_date_time(unix)
        .ok_or_else(|| RenderError::new(format!("Timestamp out of range: {}", unix)))?;

    out.write(&formatted)?;
    Ok(())
}

/// Relative time helper - formats a Unix timestamp relative to now, in German
pub fn format_from_now_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let unix = unix_param(h, "formatFromNow")?;
    out.write(&format_from_now(unix))?;
    Ok(())
}

fn unix_param(h: &Helper, helper: &str) -> std::result::Result<i64, RenderError> {
    let value = h
        .param(0)
        .map(|v| v.value())
        .ok_or_else(|| RenderError::new(format!("{} helper requires timestamp parameter", helper)))?;

    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        RenderError::new(format!(
            "{} helper expects a Unix timestamp, got {}",
            helper, value
        ))
    })
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
