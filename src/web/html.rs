//! Small HTML builders shared by the pages and fragments.

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn render_empty_state(icon: &str, title: &str, description: &str) -> String {
    format!(
        "<div class=\"empty-state\">\
            <div class=\"empty-icon\">{}</div>\
            <h3>{}</h3>\
            <p>{}</p>\
        </div>",
        icon, title, description
    )
}

pub fn input_field(label: &str, name: &str, input_type: &str, value: &str, required: bool) -> String {
    format!(
        "<label class=\"field\">\
            <span>{label}</span>\
            <input type=\"{input_type}\" name=\"{name}\" value=\"{value}\"{required}>\
        </label>",
        label = html_escape(label),
        name = name,
        input_type = input_type,
        value = html_escape(value),
        required = if required { " required" } else { "" },
    )
}

pub fn textarea_field(label: &str, name: &str, value: &str, required: bool) -> String {
    format!(
        "<label class=\"field\">\
            <span>{label}</span>\
            <textarea name=\"{name}\" rows=\"3\"{required}>{value}</textarea>\
        </label>",
        label = html_escape(label),
        name = name,
        value = html_escape(value),
        required = if required { " required" } else { "" },
    )
}

/// `<select>` with a leading blank option labelled `placeholder`.
pub fn select_field(
    label: &str,
    name: &str,
    options: &[(String, String)],
    selected: &str,
    placeholder: &str,
    required: bool,
) -> String {
    let mut html = format!(
        "<label class=\"field\">\
            <span>{label}</span>\
            <select name=\"{name}\"{required}>\
            <option value=\"\">{placeholder}</option>",
        label = html_escape(label),
        name = name,
        placeholder = html_escape(placeholder),
        required = if required { " required" } else { "" },
    );

    for (value, text) in options {
        let marker = if value == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            html_escape(value),
            marker,
            html_escape(text)
        ));
    }

    html.push_str("</select></label>");
    html
}

pub fn hidden_field(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
        name,
        html_escape(value)
    )
}
