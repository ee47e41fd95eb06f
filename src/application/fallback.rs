// Fallback insight generator - templated HTML built from the snapshot alone
use crate::application::template::{fill_template, html_escape};
use crate::domain::snapshot::{
    format_number, DashboardSnapshot, MetricValue, RevenueTrend, SnapshotError,
};
use serde_json::Value;
use std::collections::HashMap;

/// Disclosure that the content was produced without the AI service.
pub const OFFLINE_NOTICE: &str = "Offline mode: these insights were generated locally from \
your dashboard data because the AI service is unavailable. They are not live AI analysis.";

const REVENUE_BLOCK: &str = r#"<div class="mb-6">
<h3 class="text-lg font-semibold mb-2">Revenue Analysis</h3>
<p class="text-gray-700 dark:text-gray-300 mb-2">Current revenue stands at <span class="font-semibold text-green-600">${revenue}</span> with <span class="font-semibold">${growth}</span> growth.</p>
<p class="text-gray-700 dark:text-gray-300 mb-2">${trend}</p>
</div>"#;

const ENGAGEMENT_BLOCK: &str = r#"<div class="mb-6">
<h3 class="text-lg font-semibold mb-2">User Engagement Insights</h3>
<p class="text-gray-700 dark:text-gray-300 mb-2">The platform has <span class="font-semibold">${users}</span> active users converting at <span class="font-semibold">${conversion}</span>.</p>
${channel}${role}</div>"#;

const CHANNEL_LINE: &str = r#"<p class="text-gray-700 dark:text-gray-300 mb-2"><span class="font-semibold text-green-600">${name}</span> is the best performing channel with ${conversions} conversions.</p>
"#;

const ROLE_LINE: &str = r#"<p class="text-gray-700 dark:text-gray-300 mb-2">${role} is the largest user segment with ${count} users.</p>
"#;

const RECOMMENDATIONS_BLOCK: &str = r#"<div class="mb-6">
<h3 class="text-lg font-semibold mb-2">Strategic Recommendations</h3>
<ul class="list-disc pl-5 space-y-1">
${items}</ul>
</div>"#;

const NOTICE_BLOCK: &str = r#"<div class="mt-4 p-3 rounded-lg bg-yellow-50 dark:bg-yellow-900/20 border border-yellow-200">
<p class="text-sm text-yellow-800 dark:text-yellow-200">${notice}</p>
</div>"#;

/// Build fallback insights straight from request JSON.
pub fn fallback_from_value(value: &Value) -> Result<String, SnapshotError> {
    let snapshot = DashboardSnapshot::from_value(value.clone())?;
    Ok(generate_fallback_insights(&snapshot))
}

/// Deterministic: the same snapshot always yields the same HTML.
pub fn generate_fallback_insights(snapshot: &DashboardSnapshot) -> String {
    let revenue = currency(&snapshot.metric("Revenue"));
    let growth_metric = snapshot.metric("Growth %");
    let growth = percent(&growth_metric);
    let users = html_escape(&snapshot.metric("Users").to_string());
    let conversion = percent(&snapshot.metric("Conversion Rate"));
    let trend = snapshot.revenue_trend();
    let best_channel = snapshot.best_channel();

    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert("revenue", revenue);
    vars.insert("growth", growth);
    vars.insert("trend", trend_sentence(trend).to_string());
    vars.insert("users", users);
    vars.insert("conversion", conversion.clone());
    vars.insert(
        "channel",
        best_channel
            .as_ref()
            .map(|c| {
                let mut line = HashMap::new();
                line.insert("name", html_escape(&c.name));
                line.insert("conversions", format_number(c.conversions));
                fill_template(CHANNEL_LINE, &line)
            })
            .unwrap_or_default(),
    );
    vars.insert(
        "role",
        snapshot
            .leading_role()
            .map(|r| {
                let mut line = HashMap::new();
                line.insert("role", html_escape(&r.role));
                line.insert("count", format_number(r.value));
                fill_template(ROLE_LINE, &line)
            })
            .unwrap_or_default(),
    );

    let mut items = String::new();
    if let Some(channel) = &best_channel {
        items.push_str(&list_item(&format!(
            "Shift acquisition budget toward {}, your highest-converting channel.",
            html_escape(&channel.name)
        )));
    }
    items.push_str(&list_item(trend_recommendation(trend)));
    if growth_metric.as_f64() < 0.0 {
        items.push_str(&list_item(
            "Investigate the drivers behind negative growth before increasing spend.",
        ));
    }
    items.push_str(&list_item(&format!(
        "Test landing page and checkout improvements to lift the {} conversion rate.",
        conversion
    )));

    let mut recommendations = HashMap::new();
    recommendations.insert("items", items);

    let mut notice = HashMap::new();
    notice.insert("notice", OFFLINE_NOTICE.to_string());

    [
        fill_template(REVENUE_BLOCK, &vars),
        fill_template(ENGAGEMENT_BLOCK, &vars),
        fill_template(RECOMMENDATIONS_BLOCK, &recommendations),
        fill_template(NOTICE_BLOCK, &notice),
    ]
    .iter()
    .fold(String::from("<div class=\"space-y-4\">\n"), |mut html, block| {
        html.push_str(block);
        html.push('\n');
        html
    }) + "</div>"
}

fn currency(metric: &MetricValue) -> String {
    match metric {
        MetricValue::Number(n) => format!("${}", format_number(*n)),
        MetricValue::Text(s) if s.starts_with('$') => html_escape(s),
        MetricValue::Text(s) => format!("${}", html_escape(s)),
        MetricValue::Missing => "$0".to_string(),
    }
}

fn percent(metric: &MetricValue) -> String {
    match metric {
        MetricValue::Text(s) if s.ends_with('%') => html_escape(s),
        other => format!("{}%", html_escape(&other.to_string())),
    }
}

fn trend_sentence(trend: RevenueTrend) -> &'static str {
    match trend {
        RevenueTrend::Up => {
            "Revenue is trending upward over the most recent periods, a positive sign for the current strategy."
        }
        RevenueTrend::NeedsAttention => {
            "Revenue needs attention: the latest period does not exceed the start of the recent window."
        }
        RevenueTrend::Indeterminate => {
            "There is not enough recent revenue history to determine a trend."
        }
    }
}

fn trend_recommendation(trend: RevenueTrend) -> &'static str {
    match trend {
        RevenueTrend::Up => "Keep investing in the initiatives behind recent revenue growth.",
        RevenueTrend::NeedsAttention => {
            "Review pricing, retention and churn for the periods where revenue stalled."
        }
        RevenueTrend::Indeterminate => "Track at least two periods of revenue to measure momentum.",
    }
}

fn list_item(text: &str) -> String {
    format!("<li class=\"text-gray-700 dark:text-gray-300\">{}</li>\n", text)
}
