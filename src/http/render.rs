//! Report rendering.
//!
//! Turns a report snapshot into plain text, HTML or JSON. Error details are
//! never rendered.

use serde::Serialize;
use std::fmt::Write;

use crate::health::state::{EndpointStatus, State};

/// Output formats of the status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Html,
    Json,
}

impl ReportFormat {
    /// Parse the `format` query parameter.
    pub fn from_query(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "plain" => Some(ReportFormat::Text),
            "html" => Some(ReportFormat::Html),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// Pick a format from an `Accept` header, plain text when nothing matches.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return ReportFormat::Text;
        };
        let accept = accept.to_ascii_lowercase();
        if accept.contains("text/html") {
            ReportFormat::Html
        } else if accept.contains("application/json") {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

/// JSON view of one endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusView<'a> {
    pub endpoint: &'a str,
    pub state: State,
    pub streak: u64,
}

fn describe(status: &EndpointStatus) -> String {
    format!(
        "{}: {} for the past {} checks",
        status.endpoint, status.state, status.streak
    )
}

/// One line per endpoint.
pub fn render_text(statuses: &[EndpointStatus]) -> String {
    statuses.iter().fold(String::new(), |mut out, status| {
        out.push_str(&describe(status));
        out.push('\n');
        out
    })
}

/// HTML list, color coded by state.
pub fn render_html(statuses: &[EndpointStatus]) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>simplcheck</title>\n</head>\n<body>\n<ul>\n",
    );
    for status in statuses {
        let color = match status.state {
            State::Passing => "green",
            State::Failing => "red",
            State::Unknown => "grey",
        };
        let _ = writeln!(
            out,
            "<li style=\"color: {}\">{}</li>",
            color,
            escape_html(&describe(status))
        );
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}

pub fn render_json(statuses: &[EndpointStatus]) -> Vec<StatusView<'_>> {
    statuses
        .iter()
        .map(|s| StatusView {
            endpoint: &s.endpoint,
            state: s.state,
            streak: s.streak,
        })
        .collect()
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<EndpointStatus> {
        vec![
            EndpointStatus::unknown("http://a.test").advance(State::Passing, None),
            EndpointStatus {
                endpoint: "http://b.test/?q=<x>".into(),
                state: State::Failing,
                streak: 4,
                last_error: Some("connection refused".into()),
            },
            EndpointStatus::unknown("http://c.test"),
        ]
    }

    #[test]
    fn text_is_line_per_endpoint() {
        assert_eq!(
            render_text(&sample()),
            "http://a.test: passing for the past 1 checks\n\
             http://b.test/?q=<x>: failing for the past 4 checks\n\
             http://c.test: unknown for the past 0 checks\n"
        );
    }

    #[test]
    fn text_of_empty_report_is_empty() {
        assert_eq!(render_text(&[]), "");
    }

    #[test]
    fn html_is_escaped_and_colored() {
        let html = render_html(&sample());
        assert!(html.contains("<li style=\"color: green\">http://a.test: passing for the past 1 checks</li>"));
        assert!(html.contains("<li style=\"color: red\">http://b.test/?q=&lt;x&gt;: failing"));
        assert!(html.contains("<li style=\"color: grey\">http://c.test: unknown"));
    }

    #[test]
    fn errors_are_never_rendered() {
        let statuses = sample();
        assert!(!render_text(&statuses).contains("connection refused"));
        assert!(!render_html(&statuses).contains("connection refused"));
        let json = serde_json::to_string(&render_json(&statuses)).unwrap();
        assert!(!json.contains("connection refused"));
    }

    #[test]
    fn json_view() {
        let statuses = sample();
        let json = serde_json::to_value(render_json(&statuses[..1])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "endpoint": "http://a.test", "state": "passing", "streak": 1 }])
        );
    }

    #[test]
    fn negotiation() {
        assert_eq!(ReportFormat::negotiate(None), ReportFormat::Text);
        assert_eq!(
            ReportFormat::negotiate(Some("text/html,application/xhtml+xml,*/*;q=0.8")),
            ReportFormat::Html
        );
        assert_eq!(ReportFormat::negotiate(Some("application/json")), ReportFormat::Json);
        assert_eq!(ReportFormat::negotiate(Some("*/*")), ReportFormat::Text);
        assert_eq!(ReportFormat::from_query("HTML"), Some(ReportFormat::Html));
        assert_eq!(ReportFormat::from_query("xml"), None);
    }
}
