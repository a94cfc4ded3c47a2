//! Server-rendered pages. Plain HTML strings; every interpolated value goes
//! through [`escape`].

use crate::db::{DigitalDisplay, Model};
use crate::types::AddModelPrefill;
use axum::response::Html;
use std::fmt::Write;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Path segment encoding for links built from row keys.
fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(title),
        body
    ))
}

const MENU_LINK: &str = r#"<p><a href="/main">Back to main menu</a></p>"#;

pub fn login_page(error: Option<&str>) -> Html<String> {
    let mut body = String::new();
    if let Some(msg) = error {
        let _ = write!(body, "<p class=\"error\">{}</p>", escape(msg));
    }
    body.push_str(
        r#"<form method="post" action="/login">
<label>Host <input name="host" required></label>
<label>Database <input name="database" required></label>
<label>Username <input name="username"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Log in</button>
</form>"#,
    );
    layout("Database login", &body)
}

pub fn main_menu() -> Html<String> {
    layout(
        "Main menu",
        r#"<ul>
<li><a href="/display">Digital displays</a></li>
<li><a href="/search">Search by scheduler system</a></li>
<li><a href="/insert">Insert digital display</a></li>
<li><a href="/addModel">Add model</a></li>
</ul>
<form method="post" action="/logout"><button type="submit">Log out</button></form>"#,
    )
}

fn display_table(displays: &[DigitalDisplay], with_actions: bool) -> String {
    let mut out = String::from(
        "<table>\n<tr><th>Serial No</th><th>Scheduler System</th><th>Model No</th>",
    );
    if with_actions {
        out.push_str("<th></th><th></th>");
    }
    out.push_str("</tr>\n");

    for d in displays {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td><a href=\"/model/{}\">{}</a></td>",
            escape(&d.serial_no),
            escape(&d.scheduler_system),
            segment(&d.model_no),
            escape(&d.model_no),
        );
        if with_actions {
            let _ = write!(
                out,
                "<td><a href=\"/update/{seg}\">Update</a></td>\
                 <td><form method=\"post\" action=\"/display/{seg}/delete\">\
                 <button type=\"submit\">Delete</button></form></td>",
                seg = segment(&d.serial_no),
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>");
    out
}

pub fn display_list(displays: &[DigitalDisplay]) -> Html<String> {
    let body = format!("{}\n{MENU_LINK}", display_table(displays, true));
    layout("Digital displays", &body)
}

pub fn model_detail(model: &Model) -> Html<String> {
    let body = format!(
        "<dl>\n<dt>Model No</dt><dd>{}</dd>\n<dt>Width</dt><dd>{}</dd>\n<dt>Height</dt><dd>{}</dd>\n\
         <dt>Weight</dt><dd>{}</dd>\n<dt>Depth</dt><dd>{}</dd>\n<dt>Screen Size</dt><dd>{}</dd>\n</dl>\n\
         <p><a href=\"/display\">Back to displays</a></p>",
        escape(&model.model_no),
        model.width,
        model.height,
        model.weight,
        model.depth,
        model.screen_size,
    );
    layout("Model details", &body)
}

pub fn search_form() -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/search/results">
<label>Scheduler System <input name="schedulerSystem" required></label>
<button type="submit">Search</button>
</form>
{MENU_LINK}"#
    );
    layout("Search digital displays", &body)
}

pub fn search_results(scheduler_system: &str, results: &[DigitalDisplay]) -> Html<String> {
    let body = format!(
        "<p>{} result(s) for scheduler system \"{}\"</p>\n{}\n{MENU_LINK}",
        results.len(),
        escape(scheduler_system),
        display_table(results, false),
    );
    layout("Search results", &body)
}

pub fn insert_form() -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/insert">
<label>Serial No <input name="serialNo" required></label>
<label>Scheduler System <input name="schedulerSystem" required></label>
<label>Model No <input name="modelNo" required></label>
<button type="submit">Insert</button>
</form>
{MENU_LINK}"#
    );
    layout("Insert digital display", &body)
}

pub fn add_model_form(prefill: &AddModelPrefill) -> Html<String> {
    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or_default());
    let body = format!(
        r#"<form method="post" action="/addModel">
<label>Model No <input name="modelNo" value="{}" required></label>
<label>Width <input name="width" type="number" step="any" required></label>
<label>Height <input name="height" type="number" step="any" required></label>
<label>Weight <input name="weight" type="number" step="any" required></label>
<label>Depth <input name="depth" type="number" step="any" required></label>
<label>Screen Size <input name="screenSize" type="number" step="any" required></label>
<label>Serial No <input name="serialNo" value="{}" required></label>
<label>Scheduler System <input name="schedulerSystem" value="{}" required></label>
<button type="submit">Add model</button>
</form>
{MENU_LINK}"#,
        value(&prefill.model_no),
        value(&prefill.serial_no),
        value(&prefill.scheduler_system),
    );
    layout("Add model", &body)
}

pub fn update_form(display: &DigitalDisplay) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/update/{}">
<label>Serial No <input name="serialNo" value="{}" required></label>
<label>Scheduler System <input name="schedulerSystem" value="{}" required></label>
<label>Model No <input name="modelNo" value="{}" required></label>
<button type="submit">Update</button>
</form>
{MENU_LINK}"#,
        segment(&display.serial_no),
        escape(&display.serial_no),
        escape(&display.scheduler_system),
        escape(&display.model_no),
    );
    layout("Update digital display", &body)
}

/// Plain message page used for every failure the user sees.
pub fn message_page(message: &str) -> Html<String> {
    let body = format!("<p>{}</p>\n{MENU_LINK}", escape(message));
    layout("Display inventory", &body)
}
