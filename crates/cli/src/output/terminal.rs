//! Terminal output formatting

use colored::Colorize;
use keyward_core::record::mask_key;
use keyward_core::{EndpointResponse, EntitlementRecord};
use serde_json::Value;

/// Plain text of an HTML notice: tags dropped, common entities decoded.
pub fn notice_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// One-line outcome of an activate or deactivate call.
pub fn print_outcome(resp: &EndpointResponse) {
    let message = resp.message().unwrap_or("No message returned.");
    if resp.is_success() {
        eprintln!("  {} {}", "\u{2713}".green(), message);
    } else {
        eprintln!("  {} {}", "Error:".red().bold(), message);
    }
}

pub fn status_label(status: &str) -> String {
    match status {
        "valid" | "active" => status.green().to_string(),
        "expired" => status.yellow().to_string(),
        "unregistered" => status.dimmed().to_string(),
        _ => status.red().to_string(),
    }
}

/// Fields of a status body (`remote_data` or a cached record view).
pub fn print_status_fields(data: &Value) {
    let text = |name: &str| data.get(name).and_then(Value::as_str).unwrap_or("");

    eprintln!("  {}: {}", "Status".bold(), status_label(text("status")));
    if !text("variation_title").is_empty() {
        eprintln!("  {}: {}", "Plan".bold(), text("variation_title").cyan());
    }
    match text("expires") {
        "" => {}
        EntitlementRecord::NEVER_EXPIRES => eprintln!("  {}: never", "Expires".bold()),
        expires => eprintln!("  {}: {}", "Expires".bold(), expires),
    }
    if !text("renew_url").is_empty() {
        eprintln!("  {}: {}", "Renew".bold(), text("renew_url").dimmed());
    }
}

pub fn print_record(record: &EntitlementRecord) {
    if !record.license_key.is_empty() {
        eprintln!("  {}: {}", "Key".bold(), mask_key(&record.license_key));
    }
    print_status_fields(&keyward_core::endpoint::public_view(record));
}

pub fn print_notice(notice: &str) {
    let text = notice_text(notice);
    if !text.is_empty() {
        eprintln!("  {} {}", "\u{26a1}".yellow(), text);
    }
}
