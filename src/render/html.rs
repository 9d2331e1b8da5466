use crate::render::element::Element;
use serde_json::Value;

/// Elements that never get a closing tag.
const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta"];

/// Render one element tree as an HTML fragment.
pub fn render_element(el: &Element) -> String {
    let mut out = String::new();
    write_element(el, 0, &mut out);
    out
}

fn write_element(el: &Element, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&el.tag.as_str()) {
        out.push('\n');
        return;
    }

    if let Some(text) = &el.text {
        out.push_str(&escape_html(text));
    }

    if !el.children.is_empty() {
        out.push('\n');
        for child in &el.children {
            write_element(child, depth + 1, out);
        }
        out.push_str(&indent);
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push_str(">\n");
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render a self-contained page: every component's description plus the
/// store snapshot embedded as JSON.
///
/// Placeholders are substituted with `replace` rather than `format!()` so the
/// CSS braces in the template stay literal.
pub fn render_page(title: &str, components: &[Element], store: &Value) -> anyhow::Result<String> {
    // `</` inside a script block would end it early
    let json = serde_json::to_string_pretty(store)?.replace("</", "<\\/");

    let body: String = components.iter().map(render_element).collect();

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; padding: 16px; }
  .crud-component { border: 1px solid #ddd; border-radius: 6px; padding: 12px; margin-bottom: 16px; }
  .form-field { display: flex; flex-direction: column; gap: 4px; margin-bottom: 8px; }
  .form-input { padding: 6px 8px; border: 1px solid #ddd; border-radius: 4px; }
  .form-input:disabled { background: #f6f6f6; color: #555; }
  .error-messages { color: #a00; }
  .delete-warning { color: #a60; font-weight: bold; }
  .no-data { color: #777; }
  .btn { padding: 6px 10px; margin-right: 8px; }
  .btn-danger { color: white; background: #c33; border: 1px solid #a22; }
  pre { background: #fafafa; border: 1px solid #eee; padding: 8px; }
</style>
</head>
<body>
<h1>__TITLE__</h1>
__BODY__
<h2>Store</h2>
<script type="application/json" id="store-snapshot">
__STORE__
</script>
</body>
</html>
"#;

    Ok(TEMPLATE
        .replace("__TITLE__", &escape_html(title))
        .replace("__BODY__", &body)
        .replace("__STORE__", &json))
}
