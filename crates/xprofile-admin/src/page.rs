//! HTML rendering of the tools page.
//!
//! Markup is built with `format!`; every dynamic value goes through
//! [`escape_html`].

use std::fmt::Write;

use xprofile_db::FieldGroup;

use crate::form::{ADD_OPTIONS_ACTION, NONCE_FIELD};
use crate::notice::{post_path, NoticePayload};

/// Page title and heading.
pub const PAGE_TITLE: &str = "Bulk Add XProfile Field Options";

/// Shown instead of the page when the user lacks the required capability.
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to access this page.";

/// Everything the tools page shows.
#[derive(Debug, Clone)]
pub struct BulkAddPage<'a> {
    /// Admin URL prefix, used for the form target.
    pub admin_prefix: &'a str,
    /// Field groups to list; non-choice fields are skipped when rendering.
    pub groups: &'a [FieldGroup],
    /// Fresh form nonce for the current user.
    pub form_nonce: &'a str,
    /// Notice from a previous submission, already verified.
    pub notice: Option<&'a NoticePayload>,
}

impl BulkAddPage<'_> {
    /// Renders the full HTML document.
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(2048);
        let _ = writeln!(
            html,
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{PAGE_TITLE}</title></head>\n<body>\n<div class=\"wrap\">\n<h1>{PAGE_TITLE}</h1>"
        );

        if let Some(notice) = self.notice {
            let _ = writeln!(
                html,
                "<div class=\"{}\"><p>{}</p></div>",
                notice.status.css_class(),
                escape_html(&notice.message)
            );
        }

        let _ = write!(
            html,
            "<form method=\"post\" action=\"{action}\">\n\
             <input type=\"hidden\" name=\"{NONCE_FIELD}\" value=\"{nonce}\">\n\
             <input type=\"hidden\" name=\"action\" value=\"{ADD_OPTIONS_ACTION}\">\n\
             <table class=\"form-table\">\n\
             <tr><th scope=\"row\"><label for=\"xprofile_field\">XProfile Field</label></th>\n<td>",
            action = escape_html(&post_path(self.admin_prefix)),
            nonce = escape_html(self.form_nonce),
        );
        html.push_str(&self.render_select());
        html.push_str(
            "</td></tr>\n\
             <tr><th scope=\"row\"><label for=\"xprofile_field_options\">Options</label></th>\n\
             <td><textarea name=\"xprofile_field_options\" id=\"xprofile_field_options\" rows=\"10\" cols=\"50\"></textarea>\n\
             <p class=\"description\">Enter your list of options, one per line. These will be appended after any existing options.</p></td></tr>\n\
             </table>\n\
             <p class=\"submit\"><input type=\"submit\" class=\"button button-primary\" value=\"Add Options\"></p>\n\
             </form>\n</div>\n</body>\n</html>\n",
        );
        html
    }

    fn render_select(&self) -> String {
        let mut select = String::from(
            "<select name=\"xprofile_field\" id=\"xprofile_field\">\n<option value=\"0\">Select an XProfile field</option>\n",
        );
        for group in self.groups {
            let choices: Vec<_> = group
                .fields
                .iter()
                .filter(|f| f.field_type.accepts_options())
                .collect();
            if choices.is_empty() {
                continue;
            }
            let _ = writeln!(select, "<optgroup label=\"{}\">", escape_html(&group.name));
            for field in choices {
                let _ = writeln!(
                    select,
                    "<option value=\"{}\">{}</option>",
                    field.id,
                    escape_html(&field.name)
                );
            }
            select.push_str("</optgroup>\n");
        }
        select.push_str("</select>");
        select
    }
}

/// Renders the blocking page shown to users without the capability.
pub fn render_permission_denied() -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{PAGE_TITLE}</title></head>\n<body>\n<div class=\"wrap\"><p>{PERMISSION_DENIED_MESSAGE}</p></div>\n</body>\n</html>\n"
    )
}

/// Escapes HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
