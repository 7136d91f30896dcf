//! HTML pages.
//!
//! Pages are small and fixed, so they are assembled with `format!`. Every
//! piece of visitor-supplied or stored text goes through [`escape`].

use crate::capacity::CapacitySnapshot;
use crate::options::{ProblemOption, MAX_REGISTRANTS_PER_OPTION};
use crate::registration::{MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PHONE_LEN};
use crate::session::Flash;
use std::fmt::Write;

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto}\
.flash{padding:.5rem 1rem;margin:.5rem 0;border-radius:4px}\
.success{background:#e6f4ea}.error{background:#fce8e6}.info{background:#e8f0fe}\
.full{color:#888}label{display:block;margin:.5rem 0}";

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

fn flash_list(flashes: &[Flash]) -> String {
    flashes.iter().fold(String::new(), |mut html, flash| {
        let _ = writeln!(
            html,
            "<div class=\"flash {}\">{}</div>",
            flash.level.css_class(),
            escape(&flash.message)
        );
        html
    })
}

/// Start page: every option with its remaining places.
#[must_use]
pub fn render_index(snapshot: &CapacitySnapshot, flashes: &[Flash]) -> String {
    let mut options = String::new();
    for (option, count) in snapshot.iter() {
        let label = escape(option.label());
        if snapshot.is_full(option) {
            let _ = writeln!(
                options,
                "<label class=\"full\"><input type=\"radio\" name=\"problem\" \
                 value=\"{label}\" disabled> \
                 {label} ({count}/{MAX_REGISTRANTS_PER_OPTION}, full)</label>"
            );
        } else {
            let _ = writeln!(
                options,
                "<label><input type=\"radio\" name=\"problem\" value=\"{label}\"> \
                 {label} ({remaining} of {MAX_REGISTRANTS_PER_OPTION} places left)</label>",
                remaining = snapshot.remaining(option),
            );
        }
    }

    let body = format!(
        "<h1>Choose a problem statement</h1>\n{flashes}\
         <form method=\"post\" action=\"/form2\">\n{options}\
         <button type=\"submit\">Next</button>\n</form>\n",
        flashes = flash_list(flashes),
    );
    page("Choose a problem statement", &body)
}

/// Details page for the chosen option, with an optional notice above the form.
#[must_use]
pub fn render_details(option: ProblemOption, notice: Option<&Flash>) -> String {
    let body = format!(
        "<h1>Your details</h1>\n<p>Selected: <strong>{label}</strong></p>\n{notice}\
         <form method=\"post\" action=\"/submit\">\n\
         <label>Name <input type=\"text\" name=\"name\" \
         maxlength=\"{MAX_NAME_LEN}\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" \
         maxlength=\"{MAX_EMAIL_LEN}\" required></label>\n\
         <label>Phone <input type=\"tel\" name=\"phone\" maxlength=\"{MAX_PHONE_LEN}\"></label>\n\
         <button type=\"submit\">Submit</button>\n</form>\n\
         <p><a href=\"/\">Choose a different problem</a></p>\n",
        label = escape(option.label()),
        notice = flash_list(notice.map(std::slice::from_ref).unwrap_or_default()),
    );
    page("Your details", &body)
}

/// Error page for failures outside the workflow.
#[must_use]
pub fn render_error(message: &str) -> String {
    let body = format!(
        "<h1>Something went wrong</h1>\n<div class=\"flash error\">{}</div>\n\
         <p><a href=\"/\">Back to the start</a></p>\n",
        escape(message)
    );
    page("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn index_lists_every_option_with_remaining_places() {
        let snapshot = CapacitySnapshot::from_rows(vec![("Option 1", 5)]);
        let html = render_index(&snapshot, &[]);

        for option in ProblemOption::ALL {
            assert!(html.contains(&format!("value=\"{}\"", option.label())));
        }
        assert!(html.contains("Option 1 (15 of 20 places left)"));
        assert!(html.contains("Option 2 (20 of 20 places left)"));
        assert!(html.contains("action=\"/form2\""));
    }

    #[test]
    fn full_options_are_disabled() {
        let snapshot = CapacitySnapshot::from_rows(vec![("Option 2", 20)]);
        let html = render_index(&snapshot, &[]);

        assert!(html.contains("value=\"Option 2\" disabled"));
        assert!(html.contains("Option 2 (20/20, full)"));
        assert!(!html.contains("value=\"Option 1\" disabled"));
    }

    #[test]
    fn flashes_are_escaped() {
        let html = render_index(&CapacitySnapshot::empty(), &[Flash::error("<script>")]);

        assert!(html.contains("<div class=\"flash error\">&lt;script&gt;</div>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn details_page_names_the_option_and_posts_to_submit() {
        let html = render_details(ProblemOption::Three, None);

        assert!(html.contains("<strong>Option 3</strong>"));
        assert!(html.contains("action=\"/submit\""));
        assert!(html.contains("name=\"phone\" maxlength=\"20\""));
        assert!(!html.contains("class=\"flash"));
    }

    #[test]
    fn details_page_shows_notice() {
        let notice = Flash::error("Name and email are required.");
        let html = render_details(ProblemOption::One, Some(&notice));

        assert!(html.contains("<div class=\"flash error\">Name and email are required.</div>"));
    }
}
