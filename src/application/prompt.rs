// Prompt construction for the remote model
use serde_json::Value;

/// Section headings the model is asked to produce, in order.
pub const SECTION_TITLES: [&str; 5] = [
    "Executive Summary",
    "Revenue Analysis",
    "User Engagement Insights",
    "Channel Performance",
    "Strategic Recommendations",
];

const PREAMBLE: &str = "You are an expert business analyst. Analyze the following \
analytics dashboard data and provide actionable insights.";

const FORMAT_RULES: &str = "Format the response as HTML suitable for direct injection \
into a web page. Do not wrap it in markdown code fences and do not include <html>, \
<head> or <body> tags.
- Wrap each section in <div class=\"mb-6\">.
- Use <h3 class=\"text-lg font-semibold mb-2\"> for section headings.
- Use <p class=\"text-gray-700 dark:text-gray-300 mb-2\"> for paragraphs.
- Use <ul class=\"list-disc pl-5 space-y-1\"> and <li> for lists.
- Use <span class=\"font-semibold text-green-600\"> for positive figures and \
<span class=\"font-semibold text-red-600\"> for figures that need attention.
Keep the tone concise and professional and reference concrete numbers from the data.";

/// Embeds the pretty-printed dashboard data and the fixed formatting rules.
pub fn build_prompt(data: &Value) -> String {
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());

    let mut prompt = String::with_capacity(pretty.len() + 1024);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nDashboard Data:\n");
    prompt.push_str(&pretty);
    prompt.push_str("\n\nProvide the following sections:\n");
    for (i, title) in SECTION_TITLES.iter().enumerate() {
        prompt.push_str(&format!("{}. <h3>{}</h3>: {}\n", i + 1, title, section_brief(title)));
    }
    prompt.push('\n');
    prompt.push_str(FORMAT_RULES);
    prompt
}

fn section_brief(title: &str) -> &'static str {
    match title {
        "Executive Summary" => "two or three sentences on overall performance",
        "Revenue Analysis" => "revenue level, growth and the recent trend",
        "User Engagement Insights" => "user counts, conversion and role mix",
        "Channel Performance" => "which channels convert best and which lag",
        _ => "three to five specific, prioritised actions",
    }
}
