//! Server-rendered HTML for the browser flow: upload form, polling status
//! page, results table.

use std::fmt::Write;

use serde_json::Value;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;max-width:72rem}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:.3rem .5rem;text-align:left;vertical-align:top}\
th{background:#f3f3f3}label{display:block;margin:.6rem 0}";

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Entropy Search</title>
<style>body{font-family:sans-serif;margin:2rem;max-width:72rem}label{display:block;margin:.6rem 0}</style>
</head>
<body>
<h1>Spectral Entropy Search</h1>
<form action="/search" method="post" enctype="multipart/form-data">
  <label>Query spectra (.mgf / .msp) <input type="file" name="file_query" required></label>
  <label>Reference library (.mgf / .msp) <input type="file" name="file_library" required></label>
  <label>MS1 tolerance (Da) <input type="number" name="ms1_tolerance" value="0.01" step="any" min="0"></label>
  <label>MS2 tolerance (Da) <input type="number" name="ms2_tolerance" value="0.02" step="any" min="0"></label>
  <label>Top N hits <input type="number" name="top_n" value="100" min="1"></label>
  <button type="submit">Search</button>
</form>
</body>
</html>
"#;

/// Page that polls `/api/status/{id}` and moves on to the results when done.
pub fn status_page(id: &str) -> String {
    let id_literal = js_string(id);
    let id = html_escape(id);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Search status</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Search job <code>{id}</code></h1>
<p>Status: <strong id="status">queued</strong></p>
<p id="message">Waiting to start...</p>
<script>
const jobId = {id_literal};
async function poll() {{
  try {{
    const res = await fetch(`/api/status/${{encodeURIComponent(jobId)}}`);
    const body = await res.json();
    document.getElementById("status").textContent = body.status;
    document.getElementById("message").textContent = body.message;
    if (body.status === "finished") {{
      window.location.href = `/results/${{encodeURIComponent(jobId)}}`;
      return;
    }}
    if (body.status === "error" || body.status === "not_found") {{
      return;
    }}
  }} catch (e) {{
    document.getElementById("message").textContent = "Lost contact with server, retrying...";
  }}
  setTimeout(poll, 2000);
}}
poll();
</script>
</body>
</html>
"#
    )
}

/// Results table for a finished job's projected report.
pub fn results_page(id: &str, results: &Value) -> String {
    let entries = results.as_array().map(Vec::as_slice).unwrap_or_default();

    let mut rows = String::new();
    for entry in entries {
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            cell(&entry["scan_number"]),
            cell(&entry["title"]),
            cell(&entry["precursor_mz"]),
            cell(&entry["peak_count"]),
            matches_cell(&entry["identity_matches"]),
            matches_cell(&entry["open_matches"]),
        );
    }
    if entries.is_empty() {
        rows.push_str("<tr><td colspan=\"6\">No query spectra with a scan number.</td></tr>\n");
    }

    let id = html_escape(id);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Search results</title>
<style>{STYLE}</style>
</head>
<body>
<h1>Results for <code>{id}</code></h1>
<p>{count} query spectra. <a href="/api/results/{id}">JSON</a> | <a href="/">New search</a></p>
<table>
<thead><tr><th>Scan</th><th>Title</th><th>Precursor m/z</th><th>Peaks</th><th>Identity matches</th><th>Open matches</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        count = entries.len(),
    )
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => html_escape(s),
        other => html_escape(&other.to_string()),
    }
}

fn matches_cell(value: &Value) -> String {
    let hits = value.as_array().map(Vec::as_slice).unwrap_or_default();
    if hits.is_empty() {
        return "-".to_string();
    }
    let items: Vec<String> = hits
        .iter()
        .map(|hit| {
            let title = match &hit["library_title"] {
                Value::Null => "(untitled)".to_string(),
                other => cell(other),
            };
            format!("<li>{title} ({})</li>", cell(&hit["similarity"]))
        })
        .collect();
    format!("<ol>{}</ol>", items.concat())
}

/// JSON-encode text as a JavaScript string literal that cannot close the
/// surrounding `<script>` element.
fn js_string(text: &str) -> String {
    Value::String(text.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

/// Escape text for safe inclusion in HTML bodies and attribute values.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
